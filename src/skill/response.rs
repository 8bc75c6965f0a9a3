//! Outbound voice platform response envelope

use serde::Serialize;

use super::request::SessionAttributes;

const RESPONSE_VERSION: &str = "1.0";

/// Reply to one voice turn
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillResponse {
    pub version: String,
    #[serde(skip_serializing_if = "SessionAttributes::is_empty")]
    pub session_attributes: SessionAttributes,
    pub response: ResponseBody,
}

impl SkillResponse {
    /// Response with no speech, used for `SessionEndedRequest`
    #[must_use]
    pub fn empty() -> Self {
        Self {
            version: RESPONSE_VERSION.to_string(),
            session_attributes: SessionAttributes::new(),
            response: ResponseBody::default(),
        }
    }

    /// Text that will be spoken
    #[must_use]
    pub fn speech(&self) -> Option<&str> {
        self.response.output_speech.as_ref().map(|s| s.text.as_str())
    }

    /// Whether the platform keeps the microphone open
    #[must_use]
    pub fn expects_answer(&self) -> bool {
        self.response.should_end_session == Some(false)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_end_session: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputSpeech {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl OutputSpeech {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: "PlainText",
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

/// Simple companion-app card
#[derive(Debug, Clone, Serialize)]
pub struct Card {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: String,
    pub content: String,
}

/// Builder for [`SkillResponse`]
///
/// Without a reprompt the session ends after the reply.
#[derive(Debug, Default)]
pub struct ResponseBuilder {
    speech: Option<String>,
    reprompt: Option<String>,
    card: Option<Card>,
    attributes: SessionAttributes,
    end_session: Option<bool>,
}

impl ResponseBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn speak(mut self, text: impl Into<String>) -> Self {
        self.speech = Some(text.into());
        self
    }

    /// Keep the session open and repeat `text` if the user stays silent
    #[must_use]
    pub fn ask(mut self, text: impl Into<String>) -> Self {
        self.reprompt = Some(text.into());
        self
    }

    #[must_use]
    pub fn card(mut self, title: impl Into<String>, content: impl Into<String>) -> Self {
        self.card = Some(Card {
            kind: "Simple",
            title: title.into(),
            content: content.into(),
        });
        self
    }

    #[must_use]
    pub fn attributes(mut self, attributes: SessionAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    #[must_use]
    pub const fn end_session(mut self, end: bool) -> Self {
        self.end_session = Some(end);
        self
    }

    #[must_use]
    pub fn build(self) -> SkillResponse {
        let should_end_session = self.end_session.or(Some(self.reprompt.is_none()));
        SkillResponse {
            version: RESPONSE_VERSION.to_string(),
            session_attributes: self.attributes,
            response: ResponseBody {
                output_speech: self.speech.map(OutputSpeech::plain),
                card: self.card,
                reprompt: self.reprompt.map(|text| Reprompt {
                    output_speech: OutputSpeech::plain(text),
                }),
                should_end_session,
            },
        }
    }
}
