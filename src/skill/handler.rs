//! Intent dispatch: one voice turn in, one spoken reply out

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::intents::{DIRECTION_SLOT, Intent, LINE_SLOT, STOP_SLOT};
use super::request::{SessionAttributes, SkillRequest};
use super::response::{ResponseBuilder, SkillResponse};
use super::speech::{self, SpokenDeparture};
use crate::catalog::{Catalog, CatalogEntry, Category, Resolver};
use crate::store::{PreferenceStore, UserPreference};
use crate::transit::{DepartureQuery, DepartureRecord, DepartureSource, TransitError};

/// Session attribute holding a partially filled favorite
const PENDING_KEY: &str = "pendingPreference";

/// Departures read out after the first one
const EXTRA_DEPARTURES: usize = 2;

/// Stop, line and direction used when a user has no usable preference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultStop {
    pub stop_id: String,
    pub line_id: String,
    pub direction_id: String,
}

/// Slots collected over several turns of a save
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PendingPreference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stop_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    line_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    direction_id: Option<String>,
}

impl PendingPreference {
    fn from_attributes(attributes: &SessionAttributes) -> Self {
        attributes
            .get(PENDING_KEY)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    fn store_in(&self, attributes: &mut SessionAttributes) {
        match serde_json::to_value(self) {
            Ok(value) => {
                attributes.insert(PENDING_KEY.to_string(), value);
            }
            Err(e) => tracing::warn!(error = %e, "failed to encode pending preference"),
        }
    }
}

/// What a turn is about
#[derive(Debug, Clone, Copy)]
struct Selection<'a> {
    stop: &'a CatalogEntry,
    line: Option<&'a CatalogEntry>,
    direction: Option<&'a CatalogEntry>,
}

/// A slot value that matched no catalog entry
#[derive(Debug, Clone)]
struct SlotUnresolved {
    category: Category,
    fragment: String,
}

/// Answers voice turns
///
/// Holds no per-user state: preferences live in the store and a save in
/// progress lives in the session attributes.
pub struct IntentHandler {
    resolver: Arc<Resolver>,
    store: Arc<dyn PreferenceStore>,
    transit: Arc<dyn DepartureSource>,
    defaults: DefaultStop,
}

impl IntentHandler {
    #[must_use]
    pub fn new(
        resolver: Arc<Resolver>,
        store: Arc<dyn PreferenceStore>,
        transit: Arc<dyn DepartureSource>,
        defaults: DefaultStop,
    ) -> Self {
        Self {
            resolver,
            store,
            transit,
            defaults,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        self.resolver.catalog()
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn PreferenceStore> {
        &self.store
    }

    /// Answer one turn. Failures become spoken messages.
    pub async fn handle(&self, request: &SkillRequest) -> SkillResponse {
        let intent = Intent::of(&request.request);
        tracing::info!(
            intent = intent.label(),
            request_id = request.request.request_id.as_deref().unwrap_or(""),
            "handling voice turn"
        );

        match intent {
            Intent::Launch => self.launch(request).await,
            Intent::NextDepartures => self.next_departures(request).await,
            Intent::SetFavorite => self.set_favorite(request).await,
            Intent::GetFavorite => self.get_favorite(request).await,
            Intent::ListLines => self.list_lines(),
            Intent::Help => ResponseBuilder::new()
                .speak(speech::HELP)
                .ask(speech::WHAT_NEXT)
                .build(),
            Intent::Stop => ResponseBuilder::new()
                .speak(speech::GOODBYE)
                .end_session(true)
                .build(),
            Intent::SessionEnded => {
                tracing::debug!(reason = ?request.request.reason, "session ended");
                SkillResponse::empty()
            }
            Intent::Unknown(name) => {
                tracing::warn!(intent = %name, "unrecognized intent");
                Self::fallback()
            }
            Intent::Fallback => Self::fallback(),
        }
    }

    fn fallback() -> SkillResponse {
        ResponseBuilder::new()
            .speak(speech::FALLBACK)
            .ask(speech::WHAT_NEXT)
            .build()
    }

    async fn launch(&self, request: &SkillRequest) -> SkillResponse {
        let favorite = self.favorite(request.user_id()).await;
        let summary = favorite.map(|s| Self::summary(&s));
        ResponseBuilder::new()
            .speak(speech::welcome(summary.as_deref()))
            .ask(speech::WHAT_NEXT)
            .attributes(request.attributes())
            .build()
    }

    async fn next_departures(&self, request: &SkillRequest) -> SkillResponse {
        let favorite = self.favorite(request.user_id()).await;
        let Some(mut selection) = favorite.or_else(|| self.default_selection()) else {
            tracing::error!(stop = %self.defaults.stop_id, "default stop missing from catalog");
            return ResponseBuilder::new().speak(speech::NOT_CONFIGURED).build();
        };

        if let Err(unresolved) = self.apply_overrides(request, &mut selection) {
            return Self::reprompt(&unresolved, request.attributes());
        }

        let mut query = DepartureQuery::new(selection.stop.id.as_str());
        if let Some(line) = selection.line {
            query = query.line(line.id.as_str());
        }
        if let Some(direction_ref) = selection.direction.and_then(CatalogEntry::direction_ref) {
            query = query.direction(direction_ref);
        }

        let stop_name = selection.stop.canonical_name.as_str();
        let text = match self.transit.fetch_departures(&query).await {
            Ok(records) => self.departures_text(&selection, &records),
            Err(TransitError::EmptyResult(_)) => speech::no_schedule(stop_name),
            Err(e @ TransitError::UpstreamUnavailable(_)) => {
                tracing::warn!(error = %e, stop = %selection.stop.id, "departures unavailable");
                speech::UPSTREAM_APOLOGY.to_string()
            }
        };

        ResponseBuilder::new()
            .card(format!("Prochains passages à {stop_name}"), text.clone())
            .speak(text)
            .build()
    }

    #[allow(clippy::too_many_lines)]
    async fn set_favorite(&self, request: &SkillRequest) -> SkillResponse {
        let Some(user_id) = request.user_id() else {
            return ResponseBuilder::new().speak(speech::NO_USER).build();
        };

        let catalog = self.catalog();
        let mut attributes = request.attributes();
        let pending = PendingPreference::from_attributes(&attributes);

        let mut stop = pending
            .stop_id
            .as_deref()
            .and_then(|id| catalog.get(Category::Stop, id));
        let mut line = pending
            .line_id
            .as_deref()
            .and_then(|id| catalog.get(Category::Line, id));
        let mut direction = pending
            .direction_id
            .as_deref()
            .and_then(|id| catalog.get(Category::Direction, id));
        let mut unresolved: Option<SlotUnresolved> = None;

        match self.resolve_slot(request, LINE_SLOT, Category::Line, None) {
            Ok(Some(resolved)) => {
                direction = direction.filter(|d| d.serves_line(&resolved.id));
                line = Some(resolved);
            }
            Ok(None) => {}
            Err(e) => {
                line = None;
                unresolved.get_or_insert(e);
            }
        }

        let scope = line.map(|l| l.id.as_str());
        // A stop off the line is still picked up so the mismatch can be explained
        let stop_slot = self
            .resolve_slot(request, STOP_SLOT, Category::Stop, scope)
            .or_else(|e| match scope {
                Some(_) => self.resolve_slot(request, STOP_SLOT, Category::Stop, None),
                None => Err(e),
            });
        match stop_slot {
            Ok(Some(resolved)) => stop = Some(resolved),
            Ok(None) => {}
            Err(e) => {
                stop = None;
                unresolved.get_or_insert(e);
            }
        }

        if line.is_none() && unresolved.is_none() {
            line = stop.and_then(|s| match s.lines.as_slice() {
                [only] => catalog.get(Category::Line, only),
                _ => None,
            });
        }

        if let (Some(s), Some(l)) = (stop, line)
            && !s.serves_line(&l.id)
        {
            let pending = PendingPreference {
                stop_id: Some(s.id.clone()),
                ..PendingPreference::default()
            };
            pending.store_in(&mut attributes);
            return Self::ask(
                speech::not_served(&s.canonical_name, &l.spoken()),
                speech::question(Category::Line),
                attributes,
            );
        }

        let scope = line.map(|l| l.id.as_str());
        match self.resolve_slot(request, DIRECTION_SLOT, Category::Direction, scope) {
            Ok(Some(resolved)) => {
                if line.is_none() && unresolved.is_none() {
                    line = resolved
                        .lines
                        .first()
                        .and_then(|id| catalog.get(Category::Line, id))
                        .filter(|l| stop.is_none_or(|s| s.serves_line(&l.id)));
                }
                direction = Some(resolved);
            }
            Ok(None) => {}
            Err(e) => {
                direction = None;
                unresolved.get_or_insert(e);
            }
        }
        if let (Some(d), Some(l)) = (direction, line)
            && !d.serves_line(&l.id)
        {
            direction = None;
        }

        let pending = PendingPreference {
            stop_id: stop.map(|s| s.id.clone()),
            line_id: line.map(|l| l.id.clone()),
            direction_id: direction.map(|d| d.id.clone()),
        };

        if let Some(unresolved) = unresolved {
            pending.store_in(&mut attributes);
            return Self::reprompt(&unresolved, attributes);
        }

        let (Some(stop), Some(line), Some(direction)) = (stop, line, direction) else {
            let missing = if stop.is_none() {
                Category::Stop
            } else if line.is_none() {
                Category::Line
            } else {
                Category::Direction
            };
            pending.store_in(&mut attributes);
            let question = speech::question(missing);
            return Self::ask(question.to_string(), question, attributes);
        };

        let preference = UserPreference {
            user_id: user_id.to_string(),
            stop_id: stop.id.clone(),
            line_id: line.id.clone(),
            direction: direction.id.clone(),
        };

        match self.store.put(&preference).await {
            Ok(()) => {
                tracing::info!(
                    stop = %preference.stop_id,
                    line = %preference.line_id,
                    direction = %preference.direction,
                    "favorite saved"
                );
                attributes.remove(PENDING_KEY);
                let selection = Selection {
                    stop,
                    line: Some(line),
                    direction: Some(direction),
                };
                ResponseBuilder::new()
                    .speak(speech::saved(&Self::summary(&selection)))
                    .attributes(attributes)
                    .build()
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to save favorite");
                ResponseBuilder::new().speak(speech::SAVE_APOLOGY).build()
            }
        }
    }

    async fn get_favorite(&self, request: &SkillRequest) -> SkillResponse {
        match self.favorite(request.user_id()).await {
            Some(selection) => ResponseBuilder::new()
                .speak(speech::favorite(&Self::summary(&selection)))
                .build(),
            None => ResponseBuilder::new()
                .speak(speech::NO_FAVORITE)
                .ask(speech::OFFER_FAVORITE)
                .attributes(request.attributes())
                .build(),
        }
    }

    fn list_lines(&self) -> SkillResponse {
        let names: Vec<String> = self
            .catalog()
            .entries(Category::Line)
            .map(|l| l.canonical_name.clone())
            .collect();
        ResponseBuilder::new()
            .speak(speech::lines(&names))
            .ask("Quelle ligne vous intéresse ?")
            .build()
    }

    /// Saved preference as catalog entries
    ///
    /// Store failures and preferences naming entries that are no longer in
    /// the catalog count as no preference.
    async fn favorite(&self, user_id: Option<&str>) -> Option<Selection<'_>> {
        let user_id = user_id?;
        let preference = match self.store.get(user_id).await {
            Ok(preference) => preference?,
            Err(e) => {
                tracing::warn!(error = %e, "preference read failed, using default stop");
                return None;
            }
        };

        let selection = self.selection(
            &preference.stop_id,
            &preference.line_id,
            &preference.direction,
        );
        if selection.is_none() {
            tracing::warn!(stop = %preference.stop_id, "saved preference not in catalog");
        }
        selection
    }

    fn default_selection(&self) -> Option<Selection<'_>> {
        self.selection(
            &self.defaults.stop_id,
            &self.defaults.line_id,
            &self.defaults.direction_id,
        )
    }

    fn selection(&self, stop_id: &str, line_id: &str, direction_id: &str) -> Option<Selection<'_>> {
        let catalog = self.catalog();
        Some(Selection {
            stop: catalog.get(Category::Stop, stop_id)?,
            line: catalog.get(Category::Line, line_id),
            direction: catalog.get(Category::Direction, direction_id),
        })
    }

    /// Replace parts of the selection with what the user said this turn
    fn apply_overrides<'a>(
        &'a self,
        request: &SkillRequest,
        selection: &mut Selection<'a>,
    ) -> Result<(), SlotUnresolved> {
        let line = self.resolve_slot(request, LINE_SLOT, Category::Line, None)?;
        let stop = self.resolve_slot(request, STOP_SLOT, Category::Stop, None)?;

        if let Some(line) = line {
            selection.line = Some(line);
        }
        if let Some(stop) = stop {
            selection.stop = stop;
        }

        if let (Some(line), Some(direction)) = (selection.line, selection.direction)
            && !direction.serves_line(&line.id)
        {
            selection.direction = None;
        }
        if let Some(line) = selection.line
            && !selection.stop.serves_line(&line.id)
        {
            tracing::debug!(stop = %selection.stop.id, line = %line.id, "line does not serve stop");
            selection.line = None;
            selection.direction = None;
        }

        let scope = selection.line.map(|l| l.id.as_str());
        if let Some(direction) =
            self.resolve_slot(request, DIRECTION_SLOT, Category::Direction, scope)?
        {
            if selection.line.is_none() {
                selection.line = direction
                    .lines
                    .first()
                    .and_then(|id| self.catalog().get(Category::Line, id))
                    .filter(|l| selection.stop.serves_line(&l.id));
            }
            // A direction ref means nothing without its line
            if selection.line.is_some() {
                selection.direction = Some(direction);
            }
        }

        Ok(())
    }

    /// Resolve a slot to a catalog entry
    ///
    /// `Ok(None)` when the slot is absent or blank. A platform-resolved id
    /// naming a usable entry wins over the spoken value.
    fn resolve_slot(
        &self,
        request: &SkillRequest,
        slot_name: &str,
        category: Category,
        scope: Option<&str>,
    ) -> Result<Option<&CatalogEntry>, SlotUnresolved> {
        let Some(slot) = request.slot(slot_name) else {
            return Ok(None);
        };

        if let Some(entry) = slot
            .resolved_id()
            .and_then(|id| self.catalog().get(category, id))
            .filter(|e| scope.is_none_or(|line| e.serves_line(line)))
        {
            return Ok(Some(entry));
        }

        let Some(text) = slot.text() else {
            return Ok(None);
        };
        match self.resolver.resolve_scoped(category, text, scope) {
            Some(found) => Ok(Some(found.entry)),
            None => {
                tracing::debug!(%category, fragment = %text, "slot value unresolved");
                Err(SlotUnresolved {
                    category,
                    fragment: text.to_string(),
                })
            }
        }
    }

    /// "Quarante Journaux pour le tram C direction Villenave Pyrénées"
    fn summary(selection: &Selection<'_>) -> String {
        match selection.line {
            Some(line) => speech::favorite_summary(
                &selection.stop.canonical_name,
                &line.spoken(),
                selection
                    .direction
                    .map_or("", |d| d.canonical_name.as_str()),
            ),
            None => selection.stop.canonical_name.clone(),
        }
    }

    fn departures_text(&self, selection: &Selection<'_>, records: &[DepartureRecord]) -> String {
        let spoken: Vec<SpokenDeparture> = records
            .iter()
            .map(|record| SpokenDeparture {
                line: self.line_label(selection, record),
                destination: Self::destination_label(selection, record),
                eta_minutes: record.eta_minutes,
            })
            .collect();

        speech::departures(&spoken, EXTRA_DEPARTURES).unwrap_or_else(|| {
            let line = selection.line.map(CatalogEntry::spoken);
            speech::no_departures(line.as_deref(), &selection.stop.canonical_name)
        })
    }

    fn line_label(&self, selection: &Selection<'_>, record: &DepartureRecord) -> String {
        if let Some(line) = self.catalog().get(Category::Line, &record.line) {
            return line.spoken();
        }
        match selection.line {
            Some(line) if record.line.is_empty() || record.line == line.id => line.spoken(),
            _ if record.line.is_empty() => "un véhicule".to_string(),
            _ => format!("la ligne {}", record.line),
        }
    }

    fn destination_label(selection: &Selection<'_>, record: &DepartureRecord) -> String {
        if !record.destination.is_empty() {
            return record.destination.clone();
        }
        selection
            .direction
            .filter(|d| {
                d.direction_ref()
                    .is_some_and(|r| r.to_string() == record.direction)
            })
            .map(|d| d.canonical_name.clone())
            .unwrap_or_default()
    }

    fn reprompt(unresolved: &SlotUnresolved, attributes: SessionAttributes) -> SkillResponse {
        Self::ask(
            speech::not_found(unresolved.category, &unresolved.fragment),
            speech::question(unresolved.category),
            attributes,
        )
    }

    fn ask(text: String, reprompt: &str, attributes: SessionAttributes) -> SkillResponse {
        ResponseBuilder::new()
            .speak(text)
            .ask(reprompt)
            .attributes(attributes)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::catalog::ResolverConfig;
    use crate::store::MemoryStore;

    const QUARANTE_JOURNAUX: &str = "bordeaux:StopPoint:BP:3727:LOC";
    const QUINCONCES: &str = "bordeaux:StopPoint:BP:3639:LOC";
    const TRAM_B: &str = "bordeaux:Line:60:LOC";
    const TRAM_C: &str = "bordeaux:Line:61:LOC";
    const TO_VILLENAVE: &str = "bordeaux:Line:61:LOC-1";

    #[derive(Default)]
    struct RecordingSource {
        queries: Mutex<Vec<DepartureQuery>>,
    }

    #[async_trait]
    impl DepartureSource for RecordingSource {
        async fn fetch_departures(
            &self,
            query: &DepartureQuery,
        ) -> Result<Vec<DepartureRecord>, TransitError> {
            self.queries.lock().unwrap().push(query.clone());
            Ok(vec![DepartureRecord {
                line: query.line_id.clone().unwrap_or_default(),
                direction: "1".to_string(),
                destination: String::new(),
                eta_minutes: 4,
            }])
        }
    }

    fn handler(transit: Arc<RecordingSource>) -> IntentHandler {
        let catalog = Arc::new(Catalog::embedded().unwrap());
        IntentHandler::new(
            Arc::new(Resolver::new(catalog, ResolverConfig::default())),
            Arc::new(MemoryStore::new()),
            transit,
            DefaultStop {
                stop_id: QUARANTE_JOURNAUX.to_string(),
                line_id: TRAM_C.to_string(),
                direction_id: TO_VILLENAVE.to_string(),
            },
        )
    }

    fn intent(name: &str, slots: serde_json::Value) -> SkillRequest {
        serde_json::from_value(serde_json::json!({
            "session": {"user": {"userId": "amzn1.ask.account.TEST"}},
            "request": {"type": "IntentRequest", "intent": {"name": name, "slots": slots}}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_default_stop_query() {
        let transit = Arc::new(RecordingSource::default());
        let handler = handler(Arc::clone(&transit));

        let response = handler
            .handle(&intent("GetNextDeparturesIntent", serde_json::json!({})))
            .await;
        assert_eq!(
            response.speech(),
            Some("Le tram C passe dans 4 minutes direction Villenave Pyrénées.")
        );

        let queries = transit.queries.lock().unwrap();
        assert_eq!(
            queries[0],
            DepartureQuery::new(QUARANTE_JOURNAUX).line(TRAM_C).direction(1)
        );
    }

    #[tokio::test]
    async fn test_line_override_drops_foreign_direction() {
        let transit = Arc::new(RecordingSource::default());
        let handler = handler(Arc::clone(&transit));

        let request = intent(
            "GetNextDeparturesIntent",
            serde_json::json!({
                "stopName": {"name": "stopName", "value": "quinconces"},
                "lineName": {"name": "lineName", "value": "tram b"}
            }),
        );
        handler.handle(&request).await;

        let queries = transit.queries.lock().unwrap();
        assert_eq!(queries[0], DepartureQuery::new(QUINCONCES).line(TRAM_B));
    }

    #[tokio::test]
    async fn test_line_not_serving_stop_is_dropped() {
        let transit = Arc::new(RecordingSource::default());
        let handler = handler(Arc::clone(&transit));

        // Tram B does not stop at Quarante Journaux
        let request = intent(
            "GetNextDeparturesIntent",
            serde_json::json!({"lineName": {"name": "lineName", "value": "B"}}),
        );
        handler.handle(&request).await;

        let queries = transit.queries.lock().unwrap();
        assert_eq!(queries[0], DepartureQuery::new(QUARANTE_JOURNAUX));
    }

    #[tokio::test]
    async fn test_unresolved_override_reprompts() {
        let transit = Arc::new(RecordingSource::default());
        let handler = handler(Arc::clone(&transit));

        let request = intent(
            "GetNextDeparturesIntent",
            serde_json::json!({"stopName": {"name": "stopName", "value": "xyzzy plugh"}}),
        );
        let response = handler.handle(&request).await;

        assert!(response.expects_answer());
        assert!(response.speech().unwrap().contains("xyzzy plugh"));
        assert!(transit.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolved_id_wins() {
        let transit = Arc::new(RecordingSource::default());
        let handler = handler(Arc::clone(&transit));

        let request = intent(
            "GetNextDeparturesIntent",
            serde_json::json!({
                "stopName": {
                    "name": "stopName",
                    "value": "le centre",
                    "resolutions": {"resolutionsPerAuthority": [{
                        "status": {"code": "ER_SUCCESS_MATCH"},
                        "values": [{"value": {"name": "Quinconces", "id": QUINCONCES}}]
                    }]}
                }
            }),
        );
        handler.handle(&request).await;

        let queries = transit.queries.lock().unwrap();
        assert_eq!(queries[0].stop_id, QUINCONCES);
        assert_eq!(queries[0].line_id.as_deref(), Some(TRAM_C));
    }

    #[tokio::test]
    async fn test_save_then_read_back() {
        let handler = handler(Arc::new(RecordingSource::default()));

        let request = intent(
            "SetFavoriteStopIntent",
            serde_json::json!({
                "stopName": {"name": "stopName", "value": "quinconces"},
                "lineName": {"name": "lineName", "value": "c"},
                "destinationName": {"name": "destinationName", "value": "pyrénées"}
            }),
        );
        let response = handler.handle(&request).await;
        assert!(response.speech().unwrap().starts_with("C'est noté"));

        let saved = handler
            .store()
            .get("amzn1.ask.account.TEST")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.stop_id, QUINCONCES);
        assert_eq!(saved.line_id, TRAM_C);
        assert_eq!(saved.direction, TO_VILLENAVE);

        let response = handler
            .handle(&intent("GetFavoriteIntent", serde_json::json!({})))
            .await;
        assert_eq!(
            response.speech(),
            Some("Votre arrêt favori est Quinconces pour le tram C direction Villenave Pyrénées.")
        );
    }

    #[tokio::test]
    async fn test_save_stop_not_on_line() {
        let handler = handler(Arc::new(RecordingSource::default()));

        let request = intent(
            "SetFavoriteStopIntent",
            serde_json::json!({
                "stopName": {"name": "stopName", "value": "quarante journaux"},
                "lineName": {"name": "lineName", "value": "tram b"}
            }),
        );
        let response = handler.handle(&request).await;

        assert!(response.expects_answer());
        assert!(response.speech().unwrap().contains("n'est pas desservi par le tram B"));
        assert_eq!(
            response.session_attributes[PENDING_KEY]["stopId"],
            QUARANTE_JOURNAUX
        );
        assert!(
            handler
                .store()
                .get("amzn1.ask.account.TEST")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_save_without_user_id() {
        let handler = handler(Arc::new(RecordingSource::default()));
        let request: SkillRequest = serde_json::from_value(serde_json::json!({
            "request": {"type": "IntentRequest", "intent": {"name": "SetFavoriteStopIntent"}}
        }))
        .unwrap();

        let response = handler.handle(&request).await;
        assert_eq!(response.speech(), Some(speech::NO_USER));
    }

    #[tokio::test]
    async fn test_simple_intents() {
        let handler = handler(Arc::new(RecordingSource::default()));

        let stop = handler
            .handle(&intent("AMAZON.StopIntent", serde_json::json!({})))
            .await;
        assert_eq!(stop.speech(), Some(speech::GOODBYE));
        assert!(!stop.expects_answer());

        let unknown = handler
            .handle(&intent("OrderPizzaIntent", serde_json::json!({})))
            .await;
        assert_eq!(unknown.speech(), Some(speech::FALLBACK));
        assert!(unknown.expects_answer());

        let lines = handler
            .handle(&intent("ListLinesIntent", serde_json::json!({})))
            .await;
        assert!(lines.speech().unwrap().contains("Tram A, Tram B"));
    }
}
