//! Identifiers and simple allocators for core entities.

use serde::{Deserialize, Serialize};

/// Dense handle into the morph channel arena.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ChannelHandle(pub u32);

/// Index of a skinned mesh inside the loaded avatar asset.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct MeshId(pub u32);

/// Index of a skeletal clip inside the avatar's clip library.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub u32);

impl ChannelHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl MeshId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ClipId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Monotonic allocator for ChannelHandle and ClipId.
/// Dense indices double as arena offsets; IDs are opaque externally.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_channel: u32,
    next_clip: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_channel(&mut self) -> ChannelHandle {
        let id = ChannelHandle(self.next_channel);
        self.next_channel = self.next_channel.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_clip(&mut self) -> ClipId {
        let id = ClipId(self.next_clip);
        self.next_clip = self.next_clip.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
