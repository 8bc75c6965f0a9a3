//! Voice skill: request envelope, intent dispatch and French replies

pub mod handler;
pub mod intents;
pub mod request;
pub mod response;
pub mod speech;

pub use handler::{DefaultStop, IntentHandler};
pub use intents::Intent;
pub use request::{SessionAttributes, SkillRequest, Slot};
pub use response::{ResponseBuilder, SkillResponse};
