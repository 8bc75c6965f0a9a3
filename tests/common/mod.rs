//! Shared test utilities

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tbm_horaires::config::{DEFAULT_DIRECTION_ID, DEFAULT_LINE_ID, DEFAULT_STOP_ID};
use tbm_horaires::{
    Catalog, DefaultStop, DepartureQuery, DepartureRecord, DepartureSource, IntentHandler,
    MemoryStore, PreferenceStore, Resolver, ResolverConfig, SkillRequest, StoreError,
    TransitError, UserPreference,
};

pub const USER_ID: &str = "amzn1.ask.account.TEST";

pub const QUINCONCES: &str = "bordeaux:StopPoint:BP:3639:LOC";
pub const GAMBETTA: &str = "bordeaux:StopPoint:BP:3552:LOC";
pub const TRAM_B: &str = "bordeaux:Line:60:LOC";
pub const TRAM_C: &str = "bordeaux:Line:61:LOC";
pub const TRAM_B_TO_BERGES: &str = "bordeaux:Line:60:LOC-0";

/// What a [`FakeDepartures`] answers
#[derive(Debug, Clone)]
pub enum FakeOutcome {
    Departures(Vec<DepartureRecord>),
    Empty,
    Unavailable,
}

/// Departure source answering from a script and recording queries
pub struct FakeDepartures {
    outcome: FakeOutcome,
    pub queries: Mutex<Vec<DepartureQuery>>,
}

impl FakeDepartures {
    #[must_use]
    pub fn new(outcome: FakeOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            queries: Mutex::new(Vec::new()),
        })
    }

    /// Departures of the queried line, 4, 11 and 19 minutes away
    #[must_use]
    pub fn regular() -> Arc<Self> {
        Self::new(FakeOutcome::Departures(vec![
            departure(TRAM_C, "1", "Villenave Pyrénées", 4),
            departure(TRAM_C, "1", "Villenave Pyrénées", 11),
            departure(TRAM_C, "1", "Villenave Pyrénées", 19),
        ]))
    }

    pub fn last_query(&self) -> Option<DepartureQuery> {
        self.queries.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl DepartureSource for FakeDepartures {
    async fn fetch_departures(
        &self,
        query: &DepartureQuery,
    ) -> Result<Vec<DepartureRecord>, TransitError> {
        self.queries.lock().unwrap().push(query.clone());
        match &self.outcome {
            FakeOutcome::Departures(records) => Ok(records.clone()),
            FakeOutcome::Empty => Err(TransitError::EmptyResult(query.stop_id.clone())),
            FakeOutcome::Unavailable => Err(TransitError::UpstreamUnavailable(
                "connection refused".to_string(),
            )),
        }
    }
}

/// Store whose backend is always down
pub struct FailingStore;

#[async_trait]
impl PreferenceStore for FailingStore {
    async fn get(&self, _user_id: &str) -> Result<Option<UserPreference>, StoreError> {
        Err(StoreError::Unavailable("table not found".to_string()))
    }

    async fn put(&self, _preference: &UserPreference) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("table not found".to_string()))
    }
}

#[must_use]
pub fn departure(line: &str, direction: &str, destination: &str, eta: i64) -> DepartureRecord {
    DepartureRecord {
        line: line.to_string(),
        direction: direction.to_string(),
        destination: destination.to_string(),
        eta_minutes: eta,
    }
}

#[must_use]
pub fn default_stop() -> DefaultStop {
    DefaultStop {
        stop_id: DEFAULT_STOP_ID.to_string(),
        line_id: DEFAULT_LINE_ID.to_string(),
        direction_id: DEFAULT_DIRECTION_ID.to_string(),
    }
}

/// Handler over the embedded catalog
pub fn build_handler(
    store: Arc<dyn PreferenceStore>,
    transit: Arc<dyn DepartureSource>,
) -> IntentHandler {
    let catalog = Arc::new(Catalog::embedded().expect("embedded catalog"));
    let resolver = Arc::new(Resolver::new(catalog, ResolverConfig::default()));
    IntentHandler::new(resolver, store, transit, default_stop())
}

#[must_use]
pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// Intent request from the test user
pub fn intent_request(name: &str, slots: serde_json::Value) -> SkillRequest {
    intent_request_with(name, slots, serde_json::json!({}))
}

/// Intent request carrying session attributes from a previous turn
pub fn intent_request_with(
    name: &str,
    slots: serde_json::Value,
    attributes: serde_json::Value,
) -> SkillRequest {
    serde_json::from_value(serde_json::json!({
        "version": "1.0",
        "session": {
            "sessionId": "amzn1.echo-api.session.TEST",
            "user": {"userId": USER_ID},
            "attributes": attributes
        },
        "request": {
            "type": "IntentRequest",
            "requestId": "amzn1.echo-api.request.TEST",
            "locale": "fr-FR",
            "intent": {"name": name, "slots": slots}
        }
    }))
    .expect("valid skill request")
}

/// Slot map entry with a spoken value
#[must_use]
pub fn slot(name: &str, value: &str) -> (String, serde_json::Value) {
    (
        name.to_string(),
        serde_json::json!({"name": name, "value": value}),
    )
}

/// Build a slot map from entries
#[must_use]
pub fn slots<const N: usize>(entries: [(String, serde_json::Value); N]) -> serde_json::Value {
    serde_json::Value::Object(entries.into_iter().collect())
}
