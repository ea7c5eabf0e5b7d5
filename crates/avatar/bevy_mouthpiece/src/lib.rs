//! Bevy adapter for mouthpiece-core.
//!
//! The plugin owns a `MouthpieceEngine` resource. Hosts mount an avatar asset
//! on it, tag the spawned scene with `AvatarRoot`, report the audio position
//! in `AudioPlaybackTime` and send `AvatarMessage` events. Each `Update` the
//! engine is ticked with the frame delta, blended influences are written into
//! `MorphWeights`, and clip weights land in `ClipMixerState`.

use bevy::prelude::*;
use log::error;
use mouthpiece_core::{Config, Engine};

mod components;
mod resources;
mod systems;

pub use components::{AvatarRoot, MorphMeshHint};
pub use resources::{AudioPlaybackTime, AvatarMessage, AvatarRenderReady, ClipMixerState, MeshBindings};
pub use systems::{apply_morph_weights_system, build_mesh_bindings_system, tick_engine_system};

#[derive(Resource)]
pub struct MouthpieceEngine(pub Engine);

#[derive(Default)]
pub struct MouthpiecePlugin {
    pub config: Config,
}

impl MouthpiecePlugin {
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }
}

impl Plugin for MouthpiecePlugin {
    fn build(&self, app: &mut App) {
        let config = match self.config.validate() {
            Ok(()) => self.config.clone(),
            Err(err) => {
                error!("invalid mouthpiece config, using defaults: {err}");
                Config::default()
            }
        };
        app.insert_resource(MouthpieceEngine(Engine::new(config)))
            .init_resource::<AudioPlaybackTime>()
            .init_resource::<MeshBindings>()
            .init_resource::<ClipMixerState>()
            .add_event::<AvatarMessage>()
            .add_event::<AvatarRenderReady>()
            .add_systems(
                Update,
                (
                    build_mesh_bindings_system,
                    tick_engine_system,
                    apply_morph_weights_system,
                )
                    .chain(),
            );
    }
}
