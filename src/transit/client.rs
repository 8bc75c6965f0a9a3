//! HTTP client for the TBM SIRI-Lite endpoints

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use super::siri::{self, SiriEnvelope, StopMonitoringSiri};
use super::{DepartureQuery, DepartureRecord, DepartureSource, TransitError};
use crate::Result;

/// Public SIRI-Lite endpoint for Bordeaux Métropole
pub const DEFAULT_API_BASE: &str = "https://bdx.mecatran.com/utw/ws/siri/2.0/bordeaux";

/// Open-data account key published by Bordeaux Métropole
pub const DEFAULT_ACCOUNT_KEY: &str = "opendata-bordeaux-metropole-flux-gtfs-rt";

/// How far ahead departures are requested
pub const DEFAULT_PREVIEW_INTERVAL: &str = "PT90M";

/// Transit API configuration
#[derive(Debug, Clone)]
pub struct TransitConfig {
    pub base_url: String,
    pub account_key: String,
    /// ISO 8601 duration (`PreviewInterval`)
    pub preview_interval: String,
    /// `MaximumStopVisits`
    pub max_visits: u32,
    pub timeout: Duration,
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            account_key: DEFAULT_ACCOUNT_KEY.to_string(),
            preview_interval: DEFAULT_PREVIEW_INTERVAL.to_string(),
            max_visits: 4,
            timeout: Duration::from_secs(20),
        }
    }
}

/// Client for the SIRI-Lite API
///
/// One request per call, no retries.
#[derive(Debug, Clone)]
pub struct SiriClient {
    client: Client,
    base_url: String,
    account_key: String,
    preview_interval: String,
    max_visits: u32,
}

impl SiriClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: &TransitConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            account_key: config.account_key.clone(),
            preview_interval: config.preview_interval.clone(),
            max_visits: config.max_visits,
        })
    }

    /// GET a SIRI-Lite endpoint and decode its JSON body
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> std::result::Result<T, TransitError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("AccountKey", self.account_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| TransitError::UpstreamUnavailable(format!("{endpoint}: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TransitError::UpstreamUnavailable(format!(
                "{endpoint}: {status} - {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| TransitError::UpstreamUnavailable(format!("{endpoint}: invalid body: {e}")))
    }
}

#[async_trait]
impl DepartureSource for SiriClient {
    async fn fetch_departures(
        &self,
        query: &DepartureQuery,
    ) -> std::result::Result<Vec<DepartureRecord>, TransitError> {
        let mut params = vec![
            ("MonitoringRef", query.stop_id.clone()),
            ("PreviewInterval", self.preview_interval.clone()),
            ("MaximumStopVisits", self.max_visits.to_string()),
        ];
        if let Some(line) = &query.line_id {
            params.push(("LineRef", line.clone()));
        }
        if let Some(direction) = query.direction_ref {
            params.push(("DirectionRef", direction.to_string()));
        }

        let envelope: SiriEnvelope<StopMonitoringSiri> =
            self.get("stop-monitoring.json", &params).await?;
        let mut departures = siri::departures_from(&query.stop_id, envelope.siri, Utc::now())?;
        // The upstream does not always honour the filters
        departures.retain(|d| query.matches(d));

        tracing::debug!(
            stop = %query.stop_id,
            line = ?query.line_id,
            direction = ?query.direction_ref,
            count = departures.len(),
            "fetched departures"
        );
        Ok(departures)
    }
}
