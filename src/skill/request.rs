//! Inbound voice platform request envelope

use std::collections::HashMap;

use serde::Deserialize;

/// Session attribute bag, owned by the voice platform between turns
pub type SessionAttributes = serde_json::Map<String, serde_json::Value>;

/// Entity resolution status meaning the platform matched a slot value
const RESOLUTION_MATCH: &str = "ER_SUCCESS_MATCH";

/// A voice turn as sent by the platform
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRequest {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub context: Option<Context>,
    #[serde(default)]
    pub request: RequestBody,
}

impl SkillRequest {
    /// Platform user id, from the session or the device context
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        let from_session = self
            .session
            .as_ref()
            .and_then(|s| s.user.as_ref())
            .map(|u| u.user_id.as_str());
        let from_context = self
            .context
            .as_ref()
            .and_then(|c| c.system.as_ref())
            .and_then(|s| s.user.as_ref())
            .map(|u| u.user_id.as_str());

        from_session
            .or(from_context)
            .filter(|id| !id.trim().is_empty())
    }

    /// Session attributes carried over from the previous turn
    #[must_use]
    pub fn attributes(&self) -> SessionAttributes {
        self.session
            .as_ref()
            .map(|s| s.attributes.clone())
            .unwrap_or_default()
    }

    /// A slot of the current intent, if present
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.request.intent.as_ref()?.slots.get(name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub attributes: SessionAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Context {
    #[serde(rename = "System", default)]
    pub system: Option<SystemContext>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemContext {
    #[serde(default)]
    pub user: Option<User>,
}

/// The request itself (`LaunchRequest`, `IntentRequest`, `SessionEndedRequest`, ...)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub intent: Option<IntentRequest>,
    /// Why the session ended, for `SessionEndedRequest`
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntentRequest {
    pub name: String,
    #[serde(default)]
    pub slots: HashMap<String, Slot>,
}

/// A named value extracted from the utterance
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Slot {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub resolutions: Option<Resolutions>,
}

impl Slot {
    /// Raw spoken value, if non-blank
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Id the platform resolved the value to, if it found a match
    #[must_use]
    pub fn resolved_id(&self) -> Option<&str> {
        self.resolutions
            .as_ref()?
            .resolutions_per_authority
            .iter()
            .filter(|a| {
                a.status
                    .as_ref()
                    .is_none_or(|s| s.code == RESOLUTION_MATCH)
            })
            .find_map(|a| a.values.first())
            .and_then(|v| v.value.id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolutions {
    #[serde(default)]
    pub resolutions_per_authority: Vec<Authority>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Authority {
    #[serde(default)]
    pub status: Option<ResolutionStatus>,
    #[serde(default)]
    pub values: Vec<ResolutionValueWrapper>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolutionStatus {
    pub code: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolutionValueWrapper {
    pub value: ResolutionValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolutionValue {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTENT_REQUEST: &str = r#"{
        "version": "1.0",
        "session": {
            "new": false,
            "sessionId": "amzn1.echo-api.session.1",
            "user": {"userId": "amzn1.ask.account.ABC"},
            "attributes": {"pendingPreference": {"stopId": "S1"}}
        },
        "request": {
            "type": "IntentRequest",
            "requestId": "req-1",
            "locale": "fr-FR",
            "intent": {
                "name": "SetFavoriteStopIntent",
                "slots": {
                    "stopName": {"name": "stopName", "value": "  quarante journaux "},
                    "lineName": {
                        "name": "lineName",
                        "value": "c",
                        "resolutions": {"resolutionsPerAuthority": [
                            {"status": {"code": "ER_SUCCESS_NO_MATCH"}, "values": []},
                            {"status": {"code": "ER_SUCCESS_MATCH"},
                             "values": [{"value": {"name": "Tram C", "id": "bordeaux:Line:61:LOC"}}]}
                        ]}
                    },
                    "destinationName": {"name": "destinationName"}
                }
            }
        }
    }"#;

    #[test]
    fn test_parse_intent_request() {
        let request: SkillRequest = serde_json::from_str(INTENT_REQUEST).unwrap();
        assert_eq!(request.user_id(), Some("amzn1.ask.account.ABC"));
        assert_eq!(request.request.kind, "IntentRequest");
        assert!(request.attributes().contains_key("pendingPreference"));

        let stop = request.slot("stopName").unwrap();
        assert_eq!(stop.text(), Some("quarante journaux"));
        assert_eq!(stop.resolved_id(), None);

        let line = request.slot("lineName").unwrap();
        assert_eq!(line.resolved_id(), Some("bordeaux:Line:61:LOC"));

        assert_eq!(request.slot("destinationName").unwrap().text(), None);
        assert!(request.slot("missing").is_none());
    }

    #[test]
    fn test_user_id_from_context() {
        let request: SkillRequest = serde_json::from_str(
            r#"{
                "context": {"System": {"user": {"userId": "amzn1.ask.account.CTX"}}},
                "request": {"type": "LaunchRequest"}
            }"#,
        )
        .unwrap();
        assert_eq!(request.user_id(), Some("amzn1.ask.account.CTX"));
        assert!(request.attributes().is_empty());
    }

    #[test]
    fn test_minimal_request() {
        let request: SkillRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.user_id(), None);
        assert!(request.request.intent.is_none());
    }
}
