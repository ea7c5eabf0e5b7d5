//! Avatar asset description and an explicit load-once cache.
//!
//! The core never parses meshes itself. A loader (glTF importer, manifest
//! reader, test stub) produces an `AvatarAsset`: the morph dictionaries of the
//! skinned meshes and the list of skeletal clips. The cache owns the loaded
//! assets for as long as the host keeps it alive.

use std::path::PathBuf;
use std::sync::Arc;

use hashbrown::HashMap;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::error::MouthpieceError;

/// Morph dictionary of one skinned mesh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshMorphTargets {
    pub name: String,
    /// Target names in influence-array order.
    pub targets: Vec<String>,
    /// Authored influences; shorter than `targets` means the rest start at 0.
    #[serde(default)]
    pub influences: Vec<f32>,
}

/// One skeletal clip the mixer can play.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipInfo {
    pub name: String,
    /// Seconds.
    pub duration: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AvatarAsset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub meshes: Vec<MeshMorphTargets>,
    #[serde(default)]
    pub clips: Vec<ClipInfo>,
}

impl AvatarAsset {
    /// Parse an avatar manifest and check it.
    pub fn from_json_str(s: &str) -> Result<Self, MouthpieceError> {
        let asset: AvatarAsset = serde_json::from_str(s)?;
        asset.validate()?;
        Ok(asset)
    }

    pub fn validate(&self) -> Result<(), MouthpieceError> {
        for mesh in &self.meshes {
            if mesh.influences.len() > mesh.targets.len() {
                return Err(MouthpieceError::InvalidAsset {
                    key: self.name.clone(),
                    reason: format!(
                        "mesh '{}' has {} influences for {} targets",
                        mesh.name,
                        mesh.influences.len(),
                        mesh.targets.len()
                    ),
                });
            }
        }
        for clip in &self.clips {
            if !clip.duration.is_finite() || clip.duration < 0.0 {
                return Err(MouthpieceError::InvalidAsset {
                    key: self.name.clone(),
                    reason: format!("clip '{}' has invalid duration {}", clip.name, clip.duration),
                });
            }
        }
        Ok(())
    }

    pub fn clip(&self, name: &str) -> Option<&ClipInfo> {
        self.clips.iter().find(|c| c.name == name)
    }
}

/// Produces avatar assets by key (URL, path, ...).
pub trait AssetLoader {
    fn load(&mut self, key: &str) -> Result<AvatarAsset, MouthpieceError>;
}

impl<F> AssetLoader for F
where
    F: FnMut(&str) -> Result<AvatarAsset, MouthpieceError>,
{
    fn load(&mut self, key: &str) -> Result<AvatarAsset, MouthpieceError> {
        self(key)
    }
}

/// Reads avatar manifests (JSON) relative to a root directory.
#[derive(Clone, Debug)]
pub struct ManifestFileLoader {
    pub root: PathBuf,
}

impl ManifestFileLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetLoader for ManifestFileLoader {
    fn load(&mut self, key: &str) -> Result<AvatarAsset, MouthpieceError> {
        let path = self.root.join(key);
        let text = std::fs::read_to_string(&path).map_err(|e| MouthpieceError::AssetLoad {
            key: key.to_string(),
            reason: format!("{}: {e}", path.display()),
        })?;
        let mut asset = AvatarAsset::from_json_str(&text).map_err(|e| {
            MouthpieceError::AssetLoad {
                key: key.to_string(),
                reason: e.to_string(),
            }
        })?;
        if asset.name.is_empty() {
            asset.name = key.to_string();
        }
        Ok(asset)
    }
}

#[derive(Clone, Debug)]
enum CacheEntry {
    Ready(Arc<AvatarAsset>),
    Failed(MouthpieceError),
}

/// Load-once store of avatar assets.
///
/// A failed key is remembered: it is reported once and not retried until
/// evicted.
#[derive(Debug, Default)]
pub struct AssetCache {
    entries: HashMap<String, CacheEntry>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached asset, loading it on first use.
    pub fn get_or_load(
        &mut self,
        key: &str,
        loader: &mut dyn AssetLoader,
    ) -> Option<Arc<AvatarAsset>> {
        match self.entries.get(key) {
            Some(CacheEntry::Ready(asset)) => return Some(asset.clone()),
            Some(CacheEntry::Failed(_)) => return None,
            None => {}
        }

        match loader.load(key).and_then(|a| a.validate().map(|_| a)) {
            Ok(asset) => {
                debug!(
                    "loaded avatar '{key}': {} meshes, {} clips",
                    asset.meshes.len(),
                    asset.clips.len()
                );
                let asset = Arc::new(asset);
                self.entries
                    .insert(key.to_string(), CacheEntry::Ready(asset.clone()));
                Some(asset)
            }
            Err(err) => {
                error!("avatar asset '{key}' failed to load: {err}");
                self.entries
                    .insert(key.to_string(), CacheEntry::Failed(err));
                None
            }
        }
    }

    /// Warm the cache ahead of mounting.
    pub fn preload(&mut self, key: &str, loader: &mut dyn AssetLoader) {
        let _ = self.get_or_load(key, loader);
    }

    pub fn get(&self, key: &str) -> Option<Arc<AvatarAsset>> {
        match self.entries.get(key) {
            Some(CacheEntry::Ready(asset)) => Some(asset.clone()),
            _ => None,
        }
    }

    pub fn failure(&self, key: &str) -> Option<&MouthpieceError> {
        match self.entries.get(key) {
            Some(CacheEntry::Failed(err)) => Some(err),
            _ => None,
        }
    }

    pub fn evict(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
