//! Morph channel registry: one weight per named blend shape, bound to every
//! mesh slot that carries it.
//!
//! Channel names are interned once when a mesh is registered; drivers hold
//! `ChannelHandle`s and never look names up per frame.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::blend::Smoother;
use crate::ids::{ChannelHandle, IdAllocator, MeshId};

/// Trait for resolving channel names to handles.
/// Drivers bind against this once, at mount time.
pub trait ChannelResolver {
    fn resolve(&self, name: &str) -> Option<ChannelHandle>;
}

/// Location of one morph influence: (mesh, index into its influence array).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MorphSlot {
    pub mesh: MeshId,
    pub index: u32,
}

/// Current/target pair for one channel, plus the rate the last driver asked for.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelWeight {
    pub handle: ChannelHandle,
    pub current: f32,
    pub target: f32,
    pub rate: f32,
}

#[derive(Clone, Debug)]
struct ChannelEntry {
    name: String,
    weight: ChannelWeight,
    slots: Vec<MorphSlot>,
}

/// Influence array of one skinned mesh, as the renderer samples it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MeshInfluences {
    pub name: String,
    pub influences: Vec<f32>,
}

#[derive(Default, Debug)]
pub struct MorphChannelRegistry {
    ids: IdAllocator,
    channels: Vec<ChannelEntry>,
    by_name: HashMap<String, ChannelHandle>,
    meshes: Vec<MeshInfluences>,
}

impl MorphChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mesh and its morph-target dictionary (names in influence order).
    /// `initial` seeds the influences; missing entries start at 0.
    pub fn register_mesh(&mut self, name: &str, targets: &[String], initial: &[f32]) -> MeshId {
        let mesh = MeshId(self.meshes.len() as u32);
        let influences: Vec<f32> = (0..targets.len())
            .map(|i| initial.get(i).copied().unwrap_or(0.0).clamp(0.0, 1.0))
            .collect();

        for (i, target) in targets.iter().enumerate() {
            let slot = MorphSlot {
                mesh,
                index: i as u32,
            };
            match self.by_name.get(target.as_str()) {
                Some(handle) => self.channels[handle.index()].slots.push(slot),
                None => {
                    let handle = self.ids.alloc_channel();
                    let w = influences[i];
                    self.channels.push(ChannelEntry {
                        name: target.clone(),
                        weight: ChannelWeight {
                            handle,
                            current: w,
                            target: w,
                            rate: 0.0,
                        },
                        slots: vec![slot],
                    });
                    self.by_name.insert(target.clone(), handle);
                }
            }
        }

        self.meshes.push(MeshInfluences {
            name: name.to_string(),
            influences,
        });
        // Shared channels take the first mesh's value; make every slot agree.
        self.sync_slots();
        mesh
    }

    fn sync_slots(&mut self) {
        for entry in &self.channels {
            for slot in &entry.slots {
                if let Some(v) = self
                    .meshes
                    .get_mut(slot.mesh.index())
                    .and_then(|m| m.influences.get_mut(slot.index as usize))
                {
                    *v = entry.weight.current;
                }
            }
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn name(&self, handle: ChannelHandle) -> Option<&str> {
        self.channels.get(handle.index()).map(|c| c.name.as_str())
    }

    pub fn channel(&self, handle: ChannelHandle) -> Option<&ChannelWeight> {
        self.channels.get(handle.index()).map(|c| &c.weight)
    }

    /// Current (blended) weight of a channel.
    pub fn weight(&self, handle: ChannelHandle) -> Option<f32> {
        self.channel(handle).map(|w| w.current)
    }

    pub fn target(&self, handle: ChannelHandle) -> Option<f32> {
        self.channel(handle).map(|w| w.target)
    }

    /// Convenience for tooling and tests; resolves by name.
    pub fn weight_by_name(&self, name: &str) -> Option<f32> {
        self.resolve(name).and_then(|h| self.weight(h))
    }

    pub fn target_by_name(&self, name: &str) -> Option<f32> {
        self.resolve(name).and_then(|h| self.target(h))
    }

    pub fn slots(&self, handle: ChannelHandle) -> &[MorphSlot] {
        self.channels
            .get(handle.index())
            .map(|c| c.slots.as_slice())
            .unwrap_or(&[])
    }

    /// Set the current weight directly (and hold it: target follows).
    /// Unknown handles are ignored.
    pub fn set_weight(&mut self, handle: ChannelHandle, value: f32) {
        let Some(entry) = self.channels.get_mut(handle.index()) else {
            return;
        };
        let v = value.clamp(0.0, 1.0);
        entry.weight.current = v;
        entry.weight.target = v;
        for slot in &entry.slots {
            if let Some(dst) = self
                .meshes
                .get_mut(slot.mesh.index())
                .and_then(|m| m.influences.get_mut(slot.index as usize))
            {
                *dst = v;
            }
        }
    }

    /// Point a channel at a new target, approached at `rate` per frame.
    /// Unknown handles are ignored.
    #[inline]
    pub fn set_target(&mut self, handle: ChannelHandle, target: f32, rate: f32) {
        if let Some(entry) = self.channels.get_mut(handle.index()) {
            entry.weight.target = target.clamp(0.0, 1.0);
            entry.weight.rate = rate;
        }
    }

    /// Advance every channel toward its target and write the result into all
    /// of its mesh slots.
    pub fn step_all(&mut self, smoother: &Smoother) {
        for entry in &mut self.channels {
            let w = &mut entry.weight;
            let next = smoother.step(w.current, w.target, w.rate).clamp(0.0, 1.0);
            w.current = next;
            for slot in &entry.slots {
                if let Some(dst) = self
                    .meshes
                    .get_mut(slot.mesh.index())
                    .and_then(|m| m.influences.get_mut(slot.index as usize))
                {
                    *dst = next;
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChannelWeight)> {
        self.channels.iter().map(|c| (c.name.as_str(), &c.weight))
    }

    pub fn meshes(&self) -> &[MeshInfluences] {
        &self.meshes
    }

    pub fn mesh_influences(&self, mesh: MeshId) -> Option<&[f32]> {
        self.meshes.get(mesh.index()).map(|m| m.influences.as_slice())
    }

    pub fn mesh_by_name(&self, name: &str) -> Option<MeshId> {
        self.meshes
            .iter()
            .position(|m| m.name == name)
            .map(|i| MeshId(i as u32))
    }
}

impl ChannelResolver for MorphChannelRegistry {
    fn resolve(&self, name: &str) -> Option<ChannelHandle> {
        self.by_name.get(name).copied()
    }
}
