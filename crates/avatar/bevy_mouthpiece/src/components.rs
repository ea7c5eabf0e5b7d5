use bevy::prelude::*;

/// Marker component designating the root of an avatar's entity tree.
/// The binding system walks descendants of any entity with this marker and
/// binds those carrying `MorphWeights` to the registry mesh of the same `Name`.
#[derive(Component)]
pub struct AvatarRoot;

/// Optional per-entity override of the mesh name used for binding.
#[derive(Component, Debug, Clone)]
pub struct MorphMeshHint {
    pub mesh: String,
}
