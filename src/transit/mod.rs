//! Real-time departures from the TBM SIRI-Lite API

pub mod client;
pub mod discovery;
pub mod siri;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use client::{SiriClient, TransitConfig};

/// Errors from the transit API
#[derive(Debug, Error)]
pub enum TransitError {
    /// Network failure, non-success status or unreadable body
    #[error("transit API unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The upstream has no schedule at all for the stop
    #[error("no scheduled departures for stop {0}")]
    EmptyResult(String),
}

/// One upcoming departure, built per request and never stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartureRecord {
    /// SIRI `LineRef`
    pub line: String,
    /// SIRI `DirectionRef`
    pub direction: String,
    pub destination: String,
    pub eta_minutes: i64,
}

/// What to ask the departures endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureQuery {
    pub stop_id: String,
    pub line_id: Option<String>,
    pub direction_ref: Option<i64>,
}

impl DepartureQuery {
    #[must_use]
    pub fn new(stop_id: impl Into<String>) -> Self {
        Self {
            stop_id: stop_id.into(),
            line_id: None,
            direction_ref: None,
        }
    }

    /// Only departures of this line
    #[must_use]
    pub fn line(mut self, line_id: impl Into<String>) -> Self {
        self.line_id = Some(line_id.into());
        self
    }

    /// Only departures in this direction
    #[must_use]
    pub const fn direction(mut self, direction_ref: i64) -> Self {
        self.direction_ref = Some(direction_ref);
        self
    }

    /// Whether a departure fits the line and direction filters
    ///
    /// Departures that do not say their line or direction are kept.
    #[must_use]
    pub fn matches(&self, departure: &DepartureRecord) -> bool {
        let line_ok = self
            .line_id
            .as_deref()
            .is_none_or(|line| departure.line.is_empty() || departure.line == line);
        let direction_ok = self.direction_ref.is_none_or(|direction| {
            departure
                .direction
                .trim()
                .parse::<i64>()
                .ok()
                .is_none_or(|d| d == direction)
        });
        line_ok && direction_ok
    }
}

/// Source of live departures
#[async_trait]
pub trait DepartureSource: Send + Sync {
    /// Departures at a stop, soonest first
    ///
    /// A stop with nothing coming up yields an empty list.
    async fn fetch_departures(
        &self,
        query: &DepartureQuery,
    ) -> Result<Vec<DepartureRecord>, TransitError>;
}
