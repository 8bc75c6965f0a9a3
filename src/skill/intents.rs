//! Mapping of platform request and intent names

use super::request::RequestBody;

/// Slot carrying a spoken stop name
pub const STOP_SLOT: &str = "stopName";
/// Slot carrying a spoken line name
pub const LINE_SLOT: &str = "lineName";
/// Slot carrying a spoken direction or terminus
pub const DIRECTION_SLOT: &str = "destinationName";

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Launch,
    NextDepartures,
    SetFavorite,
    GetFavorite,
    ListLines,
    Help,
    /// Cancel or stop
    Stop,
    Fallback,
    SessionEnded,
    /// An intent or request type this skill does not know
    Unknown(String),
}

impl Intent {
    #[must_use]
    pub fn of(request: &RequestBody) -> Self {
        match request.kind.as_str() {
            "LaunchRequest" => Self::Launch,
            "SessionEndedRequest" => Self::SessionEnded,
            "IntentRequest" => request
                .intent
                .as_ref()
                .map_or_else(|| Self::Unknown(String::new()), |i| Self::from_name(&i.name)),
            other => Self::Unknown(other.to_string()),
        }
    }

    fn from_name(name: &str) -> Self {
        match name {
            "GetNextDeparturesIntent" | "NextPassageIntent" => Self::NextDepartures,
            "SetFavoriteStopIntent" | "SavePreferenceIntent" => Self::SetFavorite,
            "GetFavoriteIntent" => Self::GetFavorite,
            "ListLinesIntent" => Self::ListLines,
            "AMAZON.HelpIntent" => Self::Help,
            "AMAZON.CancelIntent" | "AMAZON.StopIntent" => Self::Stop,
            "AMAZON.FallbackIntent" => Self::Fallback,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Name used in logs
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Launch => "launch",
            Self::NextDepartures => "next_departures",
            Self::SetFavorite => "set_favorite",
            Self::GetFavorite => "get_favorite",
            Self::ListLines => "list_lines",
            Self::Help => "help",
            Self::Stop => "stop",
            Self::Fallback => "fallback",
            Self::SessionEnded => "session_ended",
            Self::Unknown(_) => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::request::IntentRequest;

    fn intent_request(name: &str) -> RequestBody {
        RequestBody {
            kind: "IntentRequest".to_string(),
            intent: Some(IntentRequest {
                name: name.to_string(),
                slots: Default::default(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_intent_names() {
        assert_eq!(
            Intent::of(&intent_request("GetNextDeparturesIntent")),
            Intent::NextDepartures
        );
        assert_eq!(
            Intent::of(&intent_request("SetFavoriteStopIntent")),
            Intent::SetFavorite
        );
        assert_eq!(Intent::of(&intent_request("AMAZON.StopIntent")), Intent::Stop);
        assert_eq!(Intent::of(&intent_request("AMAZON.CancelIntent")), Intent::Stop);
        assert_eq!(
            Intent::of(&intent_request("OrderPizzaIntent")),
            Intent::Unknown("OrderPizzaIntent".to_string())
        );
    }

    #[test]
    fn test_request_types() {
        let launch = RequestBody {
            kind: "LaunchRequest".to_string(),
            ..Default::default()
        };
        assert_eq!(Intent::of(&launch), Intent::Launch);

        let ended = RequestBody {
            kind: "SessionEndedRequest".to_string(),
            ..Default::default()
        };
        assert_eq!(Intent::of(&ended), Intent::SessionEnded);

        let no_intent = RequestBody {
            kind: "IntentRequest".to_string(),
            ..Default::default()
        };
        assert!(matches!(Intent::of(&no_intent), Intent::Unknown(_)));
    }
}
