//! SIRI-Lite JSON response types
//!
//! Only the fields the skill reads are modelled. Text values come as a
//! plain string, a `{"value": ..}` object or a list of those depending on
//! the field, so they all go through [`SiriText`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use super::{DepartureRecord, TransitError};

/// A SIRI text value flattened to a string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiriText(pub String);

impl SiriText {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for SiriText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self(text_of(&value)))
    }
}

fn text_of(value: &serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.first().map(text_of).unwrap_or_default(),
        Value::Object(map) => map
            .get("value")
            .or_else(|| map.get("Value"))
            .map(text_of)
            .unwrap_or_default(),
        Value::Null | Value::Bool(_) => String::new(),
    }
}

/// A SIRI list that may also be sent as `null`
fn list_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Top-level envelope shared by every endpoint
#[derive(Debug, Deserialize)]
pub struct SiriEnvelope<T> {
    #[serde(rename = "Siri")]
    pub siri: T,
}

// stop-monitoring.json

#[derive(Debug, Deserialize)]
pub struct StopMonitoringSiri {
    #[serde(rename = "ServiceDelivery", default)]
    pub service_delivery: Option<ServiceDelivery>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceDelivery {
    #[serde(rename = "StopMonitoringDelivery", default, deserialize_with = "list_or_null")]
    pub stop_monitoring_delivery: Vec<StopMonitoringDelivery>,
}

#[derive(Debug, Deserialize)]
pub struct StopMonitoringDelivery {
    #[serde(rename = "MonitoredStopVisit", default, deserialize_with = "list_or_null")]
    pub monitored_stop_visit: Vec<MonitoredStopVisit>,
    #[serde(rename = "ErrorCondition", default)]
    pub error_condition: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct MonitoredStopVisit {
    #[serde(rename = "MonitoredVehicleJourney", default)]
    pub journey: Option<VehicleJourney>,
}

#[derive(Debug, Deserialize)]
pub struct VehicleJourney {
    #[serde(rename = "LineRef", default)]
    pub line_ref: SiriText,
    #[serde(rename = "DirectionRef", default)]
    pub direction_ref: SiriText,
    #[serde(rename = "DestinationName", default)]
    pub destination_name: SiriText,
    #[serde(rename = "DirectionName", default)]
    pub direction_name: SiriText,
    #[serde(rename = "MonitoredCall", default)]
    pub monitored_call: Option<MonitoredCall>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonitoredCall {
    #[serde(rename = "ExpectedDepartureTime", default)]
    pub expected_departure: Option<String>,
    #[serde(rename = "ExpectedArrivalTime", default)]
    pub expected_arrival: Option<String>,
    #[serde(rename = "AimedDepartureTime", default)]
    pub aimed_departure: Option<String>,
    #[serde(rename = "AimedArrivalTime", default)]
    pub aimed_arrival: Option<String>,
}

impl MonitoredCall {
    /// Best known passage time: expected before aimed, departure before arrival
    #[must_use]
    pub fn best_time(&self) -> Option<DateTime<Utc>> {
        [
            &self.expected_departure,
            &self.expected_arrival,
            &self.aimed_departure,
            &self.aimed_arrival,
        ]
        .into_iter()
        .flatten()
        .find_map(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|t| t.with_timezone(&Utc))
    }
}

/// Turn a stop-monitoring response into departures sorted by ETA
///
/// # Errors
///
/// Returns [`TransitError::EmptyResult`] when the response carries no
/// usable delivery for the stop. A delivery without visits is an empty list.
pub fn departures_from(
    stop_id: &str,
    response: StopMonitoringSiri,
    now: DateTime<Utc>,
) -> Result<Vec<DepartureRecord>, TransitError> {
    let deliveries = response
        .service_delivery
        .map(|d| d.stop_monitoring_delivery)
        .unwrap_or_default();

    if deliveries.iter().all(|d| d.error_condition.is_some()) {
        return Err(TransitError::EmptyResult(stop_id.to_string()));
    }

    let mut departures: Vec<DepartureRecord> = deliveries
        .into_iter()
        .flat_map(|d| d.monitored_stop_visit)
        .filter_map(|visit| {
            let journey = visit.journey?;
            let when = journey.monitored_call.as_ref()?.best_time()?;
            let destination = if journey.destination_name.as_str().is_empty() {
                journey.direction_name.0
            } else {
                journey.destination_name.0
            };
            Some(DepartureRecord {
                line: journey.line_ref.0,
                direction: journey.direction_ref.0,
                destination,
                eta_minutes: ((when - now).num_seconds() / 60).max(0),
            })
        })
        .collect();

    departures.sort_by_key(|d| d.eta_minutes);
    Ok(departures)
}

// lines-discovery.json

#[derive(Debug, Deserialize)]
pub struct LinesDiscoverySiri {
    #[serde(rename = "LinesDelivery", default)]
    pub lines_delivery: Option<LinesDelivery>,
}

#[derive(Debug, Deserialize)]
pub struct LinesDelivery {
    #[serde(rename = "AnnotatedLineRef", default, deserialize_with = "list_or_null")]
    pub lines: Vec<AnnotatedLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnotatedLine {
    #[serde(rename = "LineRef", default)]
    pub line_ref: SiriText,
    #[serde(rename = "LineName", default)]
    pub line_name: SiriText,
    #[serde(rename = "LineCode", default)]
    pub line_code: SiriText,
    #[serde(rename = "Destinations", default, deserialize_with = "list_or_null")]
    pub destinations: Vec<LineDestination>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineDestination {
    #[serde(rename = "DirectionRef", default)]
    pub direction_ref: SiriText,
    #[serde(rename = "PlaceName", default)]
    pub place_name: SiriText,
}

// stoppoints-discovery.json

#[derive(Debug, Deserialize)]
pub struct StopPointsDiscoverySiri {
    #[serde(rename = "StopPointsDelivery", default)]
    pub stop_points_delivery: Option<StopPointsDelivery>,
}

#[derive(Debug, Deserialize)]
pub struct StopPointsDelivery {
    #[serde(rename = "AnnotatedStopPointRef", default, deserialize_with = "list_or_null")]
    pub stop_points: Vec<AnnotatedStopPoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnotatedStopPoint {
    #[serde(rename = "StopPointRef", default)]
    pub stop_point_ref: SiriText,
    #[serde(rename = "StopName", default)]
    pub stop_name: SiriText,
    #[serde(rename = "Lines", default, deserialize_with = "list_or_null")]
    pub lines: Vec<SiriText>,
}
