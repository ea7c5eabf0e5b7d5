//! Per-frame inputs handed to `Engine::update()`.

use std::sync::Arc;

use crate::message::Message;

/// Message handover for this frame. The whole record is swapped at once.
#[derive(Clone, Debug, PartialEq)]
pub enum MessageUpdate {
    Replace(Arc<Message>),
    /// Conversation went quiet: neutral face, silent mouth, idle clip.
    Clear,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inputs {
    /// Audio position in seconds (see `PlaybackClock`).
    pub playback_time: f32,
    /// `None` keeps whatever message is current.
    pub message: Option<MessageUpdate>,
}

impl Inputs {
    pub fn at(playback_time: f32) -> Self {
        Self {
            playback_time,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<Arc<Message>>) -> Self {
        self.message = Some(MessageUpdate::Replace(message.into()));
        self
    }

    pub fn clearing_message(mut self) -> Self {
        self.message = Some(MessageUpdate::Clear);
        self
    }
}
