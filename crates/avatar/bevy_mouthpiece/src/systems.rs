use bevy::prelude::*;
use bevy::render::mesh::morph::MorphWeights;
use hashbrown::HashMap;
use log::warn;
use mouthpiece_core::{CoreEvent, Inputs, MeshId};

use crate::components::{AvatarRoot, MorphMeshHint};
use crate::resources::{
    AudioPlaybackTime, AvatarMessage, AvatarRenderReady, ClipMixerState, MeshBindings,
};
use crate::MouthpieceEngine;

/// Walks descendants under each `AvatarRoot` and maps every named entity that
/// carries `MorphWeights` to the registry mesh of the same name.
pub fn build_mesh_bindings_system(
    eng: Res<MouthpieceEngine>,
    roots: Query<Entity, With<AvatarRoot>>,
    children: Query<&Children>,
    names: Query<(&Name, Option<&MorphMeshHint>), With<MorphWeights>>,
    mut bindings: ResMut<MeshBindings>,
) {
    let mut map: HashMap<MeshId, Entity> = HashMap::new();

    fn walk(
        e: Entity,
        eng: &MouthpieceEngine,
        map: &mut HashMap<MeshId, Entity>,
        names: &Query<(&Name, Option<&MorphMeshHint>), With<MorphWeights>>,
        children: &Query<&Children>,
    ) {
        if let Ok((name, hint)) = names.get(e) {
            let mesh_name = hint.map_or(name.as_str(), |h| h.mesh.as_str());
            if let Some(mesh) = eng.0.registry().mesh_by_name(mesh_name) {
                map.insert(mesh, e);
            }
        }
        if let Ok(cs) = children.get(e) {
            for &c in cs.iter() {
                walk(c, eng, map, names, children);
            }
        }
    }

    for root in roots.iter() {
        walk(root, &eng, &mut map, &names, &children);
    }

    bindings.map = map;
}

/// Feed the frame delta, audio time and the newest message into the engine.
pub fn tick_engine_system(
    mut eng: ResMut<MouthpieceEngine>,
    time: Res<Time>,
    audio: Res<AudioPlaybackTime>,
    mut messages: EventReader<AvatarMessage>,
    mut ready: EventWriter<AvatarRenderReady>,
    mut mixer: ResMut<ClipMixerState>,
) {
    let inputs = Inputs {
        playback_time: audio.0,
        message: messages.read().last().map(|m| m.0.clone()),
    };
    let out = eng.0.update(time.delta_seconds(), inputs);
    for event in &out.events {
        if let CoreEvent::RenderReady { avatar } = event {
            ready.send(AvatarRenderReady {
                avatar: avatar.clone(),
            });
        }
    }
    mixer.clips.clear();
    mixer.clips.extend(out.clips.iter().cloned());
}

/// Copy each bound mesh's blended influences into its `MorphWeights`.
pub fn apply_morph_weights_system(
    eng: Res<MouthpieceEngine>,
    bindings: Res<MeshBindings>,
    mut weights: Query<&mut MorphWeights>,
) {
    let registry = eng.0.registry();
    for (mesh, entity) in bindings.map.iter() {
        let (Some(src), Ok(mut dst)) = (registry.mesh_influences(*mesh), weights.get_mut(*entity))
        else {
            continue;
        };
        let dst = dst.weights_mut();
        if dst.len() != src.len() {
            warn!(
                "morph weight count mismatch on {entity:?}: entity has {}, mesh has {}",
                dst.len(),
                src.len()
            );
        }
        for (d, s) in dst.iter_mut().zip(src) {
            *d = *s;
        }
    }
}
