//! Output contracts from the core engine.
//!
//! Morph weights are not copied here: adapters read them from the registry
//! (`MorphChannelRegistry::mesh_influences`). Outputs carry the skeletal clip
//! mix for this frame and a list of semantic events.

use serde::{Deserialize, Serialize};

pub use crate::state_machine::ClipWeight;
use crate::state_machine::ClipEvent;

/// Discrete signals emitted during a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CoreEvent {
    /// First frame with a mounted avatar. Fired once per mount.
    RenderReady { avatar: String },
    ClipTransitionStarted {
        from: Option<String>,
        to: String,
        /// 0 for an immediate switch.
        duration: f32,
    },
    ClipTransitionFinished { clip: String },
    MessageReplaced { id: String },
    MessageCleared,
}

impl From<ClipEvent> for CoreEvent {
    fn from(ev: ClipEvent) -> Self {
        match ev {
            ClipEvent::Started { from, to, duration } => {
                CoreEvent::ClipTransitionStarted { from, to, duration }
            }
            ClipEvent::Finished { clip } => CoreEvent::ClipTransitionFinished { clip },
        }
    }
}

/// Outputs returned by Engine::update().
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub clips: Vec<ClipWeight>,
    #[serde(default)]
    pub events: Vec<CoreEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.clips.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_event(&mut self, event: CoreEvent) {
        self.events.push(event);
    }

    pub fn clip(&self, name: &str) -> Option<&ClipWeight> {
        self.clips.iter().find(|c| c.clip == name)
    }

    pub fn render_ready(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, CoreEvent::RenderReady { .. }))
    }
}
