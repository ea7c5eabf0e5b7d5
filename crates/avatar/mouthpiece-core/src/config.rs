//! Core configuration for mouthpiece-core.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::MouthpieceError;

/// Clip names shipped with the reference avatar. Each is also an alias of itself.
pub const AVATAR_CLIPS: [&str; 5] = [
    "Animation_Idle_Orc",
    "Action_Idle_Breathing",
    "Action_Sad",
    "Face_Terror",
    "Pose_Static",
];

/// How the per-channel rates are turned into a per-frame step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SmoothingMode {
    #[default]
    /// Move `rate` of the remaining distance on every frame, whatever its length.
    PerFrame,
    /// Treat `rate` as the per-frame fraction at `reference_fps` and derive an
    /// exponential decay constant from it, so variable frame intervals converge
    /// at the same wall-clock speed.
    FrameRateIndependent { reference_fps: f32 },
}

/// Configuration for the blending engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Smoothing fraction for expression channels (both directions).
    pub expression_rate: f32,
    /// Smoothing fraction for visemes moving toward an active cue.
    pub viseme_attack_rate: f32,
    /// Smoothing fraction for visemes returning to rest.
    pub viseme_release_rate: f32,
    /// Skeletal crossfade length in seconds.
    pub crossfade_duration: f32,
    /// Clip played when no message is active.
    pub idle_clip: String,
    /// Requested name -> clip name, consulted when a request is not a clip name.
    pub clip_aliases: HashMap<String, String>,
    pub smoothing: SmoothingMode,
    /// Freeze all morph-target work (clips still advance).
    pub setup_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        let mut clip_aliases: HashMap<String, String> = AVATAR_CLIPS
            .iter()
            .map(|name| (name.to_string(), name.to_string()))
            .collect();
        clip_aliases.insert("Idle".to_string(), "Animation_Idle_Orc".to_string());

        Self {
            expression_rate: 0.1,
            viseme_attack_rate: 0.2,
            viseme_release_rate: 0.1,
            crossfade_duration: 0.5,
            idle_clip: "Animation_Idle_Orc".to_string(),
            clip_aliases,
            smoothing: SmoothingMode::PerFrame,
            setup_mode: false,
        }
    }
}

impl Config {
    /// Parse a JSON config; omitted fields keep their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, MouthpieceError> {
        let cfg: Config = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), MouthpieceError> {
        for (name, rate) in [
            ("expression_rate", self.expression_rate),
            ("viseme_attack_rate", self.viseme_attack_rate),
            ("viseme_release_rate", self.viseme_release_rate),
        ] {
            if !rate.is_finite() || rate <= 0.0 || rate > 1.0 {
                return Err(MouthpieceError::InvalidConfig {
                    reason: format!("{name} must be in (0, 1], got {rate}"),
                });
            }
        }

        if !self.crossfade_duration.is_finite() || self.crossfade_duration < 0.0 {
            return Err(MouthpieceError::InvalidConfig {
                reason: format!(
                    "crossfade_duration must be finite and >= 0, got {}",
                    self.crossfade_duration
                ),
            });
        }

        if self.idle_clip.is_empty() {
            return Err(MouthpieceError::InvalidConfig {
                reason: "idle_clip must not be empty".to_string(),
            });
        }

        if let SmoothingMode::FrameRateIndependent { reference_fps } = self.smoothing {
            if !reference_fps.is_finite() || reference_fps <= 0.0 {
                return Err(MouthpieceError::InvalidConfig {
                    reason: format!("reference_fps must be positive, got {reference_fps}"),
                });
            }
        }

        Ok(())
    }

    #[inline]
    pub fn with_expression_rate(mut self, rate: f32) -> Self {
        self.expression_rate = rate;
        self
    }

    #[inline]
    pub fn with_viseme_rates(mut self, attack: f32, release: f32) -> Self {
        self.viseme_attack_rate = attack;
        self.viseme_release_rate = release;
        self
    }

    #[inline]
    pub fn with_crossfade_duration(mut self, seconds: f32) -> Self {
        self.crossfade_duration = seconds;
        self
    }

    #[inline]
    pub fn with_idle_clip(mut self, name: impl Into<String>) -> Self {
        self.idle_clip = name.into();
        self
    }

    #[inline]
    pub fn with_clip_alias(mut self, alias: impl Into<String>, clip: impl Into<String>) -> Self {
        self.clip_aliases.insert(alias.into(), clip.into());
        self
    }

    #[inline]
    pub fn with_smoothing(mut self, smoothing: SmoothingMode) -> Self {
        self.smoothing = smoothing;
        self
    }

    #[inline]
    pub fn with_setup_mode(mut self, on: bool) -> Self {
        self.setup_mode = on;
        self
    }
}
