//! TBM Horaires - next-departure voice skill for the Bordeaux TBM network
//!
//! This library provides the core functionality of the skill:
//! - Fuzzy resolution of spoken line, stop and direction names
//! - A SIRI-Lite client for real-time departures
//! - Per-user favorite stop persistence
//! - Intent handling for the voice platform webhook
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              Voice platform (POST /skill)           │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Intent handler                     │
//! │   Resolver  │  Catalog  │  Speech  │  Session bag   │
//! └──────────┬─────────────────────────────┬────────────┘
//!            │                             │
//! ┌──────────▼──────────┐       ┌──────────▼────────────┐
//! │  SIRI-Lite client   │       │   Preference store    │
//! │  (stop-monitoring)  │       │  (SQLite / memory)    │
//! └─────────────────────┘       └───────────────────────┘
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod skill;
pub mod store;
pub mod transit;

pub use catalog::{AliasPolicy, Catalog, CatalogEntry, Category, Resolver, ResolverConfig};
pub use config::Config;
pub use error::{Error, Result};
pub use skill::{DefaultStop, IntentHandler, SkillRequest, SkillResponse};
pub use store::{MemoryStore, PreferenceStore, SqliteStore, StoreConfig, StoreError, UserPreference};
pub use transit::{
    DepartureQuery, DepartureRecord, DepartureSource, SiriClient, TransitConfig, TransitError,
};
