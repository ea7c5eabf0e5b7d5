//! Inbound avatar directives (one spoken line each).
//!
//! Messages arrive as conversation records; the core reads `animation`,
//! `facialExpression` and `lipSync`, the rest rides along for hosts.

use serde::{Deserialize, Serialize};

use crate::error::MouthpieceError;

/// One timed mouth shape, as produced by the offline cue generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MouthCue {
    pub start: f32,
    pub end: f32,
    /// Single-letter phoneme code (A-H, X).
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LipSync {
    #[serde(default)]
    pub duration: f32,
    #[serde(default)]
    pub mouth_cues: Vec<MouthCue>,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Role {
    #[default]
    #[serde(rename = "ASSISTANT")]
    Assistant,
    #[serde(rename = "USER")]
    User,
    #[serde(rename = "system")]
    System,
}

/// Where the host should fetch the utterance audio from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioSource {
    Url(String),
    /// `data:audio/mp3;base64,...`
    DataUri(String),
}

impl AudioSource {
    pub fn as_str(&self) -> &str {
        match self {
            AudioSource::Url(s) | AudioSource::DataUri(s) => s,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub animation: Option<String>,
    #[serde(default)]
    pub facial_expression: Option<String>,
    #[serde(default)]
    pub lip_sync: Option<LipSync>,
    /// Base64-encoded mp3.
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub rephrased_text: Option<String>,
    #[serde(default)]
    pub rephrased: Option<bool>,
}

impl Message {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, MouthpieceError> {
        serde_json::from_str(s).map_err(|e| MouthpieceError::InvalidMessage {
            reason: e.to_string(),
        })
    }

    pub fn with_animation(mut self, name: impl Into<String>) -> Self {
        self.animation = Some(name.into());
        self
    }

    pub fn with_expression(mut self, name: impl Into<String>) -> Self {
        self.facial_expression = Some(name.into());
        self
    }

    pub fn with_lip_sync(mut self, lip_sync: LipSync) -> Self {
        self.lip_sync = Some(lip_sync);
        self
    }

    /// Requested clip; an empty name counts as no request.
    pub fn animation_name(&self) -> Option<&str> {
        self.animation.as_deref().filter(|s| !s.is_empty())
    }

    /// `audioUrl` wins; otherwise inline audio becomes a data URI.
    pub fn audio_source(&self) -> Option<AudioSource> {
        if let Some(url) = self.audio_url.as_deref().filter(|s| !s.is_empty()) {
            return Some(AudioSource::Url(url.to_string()));
        }
        self.audio
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|b64| AudioSource::DataUri(format!("data:audio/mp3;base64,{b64}")))
    }
}

impl LipSync {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            mouth_cues: Vec::new(),
        }
    }

    pub fn with_cue(mut self, start: f32, end: f32, value: &str) -> Self {
        self.mouth_cues.push(MouthCue {
            start,
            end,
            value: value.to_string(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_conversation_record() {
        let raw = r#"{
            "__typename": "ConversationMessage",
            "id": "m1",
            "role": "ASSISTANT",
            "text": "Hello there",
            "timestamp": "2024-01-01T00:00:00Z",
            "animation": "Talking",
            "facialExpression": "Joy",
            "audio": null,
            "audioUrl": "https://cdn.example/hello.mp3",
            "lipSync": { "duration": 1.5, "mouthCues": [ { "start": 0.0, "end": 0.2, "value": "X" } ] }
        }"#;
        let m = Message::from_json_str(raw).unwrap();
        assert_eq!(m.role, Role::Assistant);
        assert_eq!(m.animation_name(), Some("Talking"));
        assert_eq!(m.facial_expression.as_deref(), Some("Joy"));
        let ls = m.lip_sync.as_ref().unwrap();
        assert_eq!(ls.mouth_cues.len(), 1);
        assert_eq!(
            m.audio_source(),
            Some(AudioSource::Url("https://cdn.example/hello.mp3".into()))
        );
    }

    #[test]
    fn nulls_and_missing_fields_are_absent() {
        let m = Message::from_json_str(
            r#"{ "role": "system", "animation": null, "lipSync": null }"#,
        )
        .unwrap();
        assert_eq!(m.role, Role::System);
        assert_eq!(m.animation_name(), None);
        assert!(m.lip_sync.is_none());
        assert!(m.audio_source().is_none());
    }

    #[test]
    fn empty_animation_is_no_request() {
        let m = Message::new("m").with_animation("");
        assert_eq!(m.animation_name(), None);
    }

    #[test]
    fn inline_audio_becomes_data_uri() {
        let mut m = Message::new("m");
        m.audio = Some("AAAA".into());
        assert_eq!(
            m.audio_source().unwrap().as_str(),
            "data:audio/mp3;base64,AAAA"
        );
    }

    #[test]
    fn malformed_message_is_an_error() {
        let err = Message::from_json_str(r#"{ "lipSync": { "mouthCues": 3 } }"#).unwrap_err();
        assert_eq!(err.category(), "message");
    }
}
