use bevy::prelude::*;
use hashbrown::HashMap;
use mouthpiece_core::{ClipWeight, MeshId, MessageUpdate};

/// Audio position (seconds) the host's player reports each frame.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct AudioPlaybackTime(pub f32);

/// Registry mesh -> entity whose `MorphWeights` receive its influences.
/// Populated by the binding system by walking under `AvatarRoot`.
#[derive(Resource, Default)]
pub struct MeshBindings {
    pub map: HashMap<MeshId, Entity>,
}

/// Clip weights and local times for the host's skeletal mixer, refreshed every frame.
#[derive(Resource, Default, Debug, Clone)]
pub struct ClipMixerState {
    pub clips: Vec<ClipWeight>,
}

impl ClipMixerState {
    pub fn weight(&self, clip: &str) -> f32 {
        self.clips
            .iter()
            .find(|c| c.clip == clip)
            .map_or(0.0, |c| c.weight)
    }
}

/// Inbound message handover. When several arrive in one frame the last wins.
#[derive(Event, Debug, Clone)]
pub struct AvatarMessage(pub MessageUpdate);

/// Fired once per mounted avatar, on its first rendered frame.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct AvatarRenderReady {
    pub avatar: String,
}
