//! Mouthpiece Core (engine-agnostic)
//!
//! Per-frame blending for a talking avatar: facial-expression and viseme
//! morph targets are smoothed toward targets chosen from the current
//! conversation message and audio position, and skeletal clips are
//! crossfaded. Hosts mount an `AvatarAsset`, feed `Inputs` every frame, and
//! read morph influences from the registry and clip weights from `Outputs`.

pub mod asset;
pub mod blend;
pub mod config;
pub mod engine;
pub mod error;
pub mod expression;
pub mod ids;
pub mod inputs;
pub mod lipsync;
pub mod message;
pub mod outputs;
pub mod playback;
pub mod registry;
pub mod state_machine;
pub mod viseme;

// Re-exports for consumers (adapters)
pub use asset::{AssetCache, AssetLoader, AvatarAsset, ClipInfo, ManifestFileLoader, MeshMorphTargets};
pub use blend::{blend, blend_decay, tau_for_rate, Smoother, SNAP_EPSILON};
pub use config::{Config, SmoothingMode, AVATAR_CLIPS};
pub use engine::Engine;
pub use error::MouthpieceError;
pub use expression::{ExpressionDriver, FacialExpression};
pub use ids::{ChannelHandle, ClipId, MeshId};
pub use inputs::{Inputs, MessageUpdate};
pub use lipsync::{Cue, LipSyncDriver, LipSyncTrack};
pub use message::{AudioSource, LipSync, Message, MouthCue, Role};
pub use outputs::{ClipWeight, CoreEvent, Outputs};
pub use playback::{AudioTransport, PlaybackClock};
pub use registry::{ChannelResolver, ChannelWeight, MeshInfluences, MorphChannelRegistry, MorphSlot};
pub use state_machine::{AnimationState, AnimationStateMachine, ClipLibrary};
pub use viseme::Viseme;
