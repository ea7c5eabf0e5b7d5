//! Skeletal clip selection and crossfading.
//!
//! The machine keeps one layer per clip that currently has (or is gaining)
//! influence. Starting a clip fades it in over the crossfade duration while
//! every other layer fades out from wherever it is, so a request that lands
//! mid-crossfade simply retargets. When nothing is contributing yet, the new
//! clip snaps to full weight instead of fading in from an empty pose.

use hashbrown::HashMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::asset::ClipInfo;
use crate::config::Config;
use crate::ids::{ClipId, IdAllocator};

/// Seconds of slack when deciding that a fade has completed.
const FADE_EPSILON: f32 = 1e-5;

fn fmod(a: f32, b: f32) -> f32 {
    if b == 0.0 {
        return 0.0;
    }
    let m = a % b;
    if (m < 0.0 && b > 0.0) || (m > 0.0 && b < 0.0) {
        m + b
    } else {
        m
    }
}

/// The avatar's clips, addressable by id and name.
#[derive(Debug, Default)]
pub struct ClipLibrary {
    clips: Vec<(ClipId, ClipInfo)>,
    by_name: HashMap<String, ClipId>,
}

impl ClipLibrary {
    pub fn new(clips: &[ClipInfo]) -> Self {
        let mut ids = IdAllocator::new();
        let mut lib = Self::default();
        for clip in clips {
            if lib.by_name.contains_key(&clip.name) {
                warn!("duplicate clip '{}' ignored", clip.name);
                continue;
            }
            let id = ids.alloc_clip();
            lib.by_name.insert(clip.name.clone(), id);
            lib.clips.push((id, clip.clone()));
        }
        lib
    }

    pub fn get(&self, id: ClipId) -> Option<&ClipInfo> {
        self.clips.get(id.index()).map(|(_, c)| c)
    }

    pub fn find(&self, name: &str) -> Option<ClipId> {
        self.by_name.get(name).copied()
    }

    pub fn first(&self) -> Option<ClipId> {
        self.clips.first().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Exact name, then alias table, then the first clip.
    pub fn resolve(&self, name: &str, aliases: &HashMap<String, String>) -> Option<ClipId> {
        if let Some(id) = self.find(name) {
            return Some(id);
        }
        if let Some(id) = aliases.get(name).and_then(|target| self.find(target)) {
            return Some(id);
        }
        let fallback = self.first();
        if let Some(id) = fallback {
            warn!(
                "unknown clip '{name}', falling back to '{}'",
                self.clips[id.index()].1.name
            );
        }
        fallback
    }
}

#[derive(Copy, Clone, Debug)]
struct Fade {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
}

impl Fade {
    fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }
}

#[derive(Clone, Debug)]
struct ClipLayer {
    clip: ClipId,
    time: f32,
    weight: f32,
    fade: Option<Fade>,
}

/// Observable state of the machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state")]
pub enum AnimationState {
    /// The avatar has no clips.
    Empty,
    /// Playing the idle clip because nothing was requested.
    Idle { clip: String },
    Playing { clip: String },
    Transitioning {
        from: Option<String>,
        to: String,
        remaining: f32,
    },
}

/// One clip's contribution for the skeletal mixer this frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipWeight {
    pub clip: String,
    pub weight: f32,
    /// Local playback time in seconds.
    pub time: f32,
}

/// Transition notifications produced while requesting/advancing.
#[derive(Clone, Debug, PartialEq)]
pub enum ClipEvent {
    Started {
        from: Option<String>,
        to: String,
        duration: f32,
    },
    Finished {
        clip: String,
    },
}

#[derive(Debug)]
pub struct AnimationStateMachine {
    library: ClipLibrary,
    layers: Vec<ClipLayer>,
    active: Option<ClipId>,
    previous: Option<ClipId>,
    explicit: bool,
    crossfade_duration: f32,
    idle_clip: String,
    aliases: HashMap<String, String>,
}

impl AnimationStateMachine {
    pub fn new(library: ClipLibrary, cfg: &Config) -> Self {
        Self {
            library,
            layers: Vec::new(),
            active: None,
            previous: None,
            explicit: false,
            crossfade_duration: cfg.crossfade_duration,
            idle_clip: cfg.idle_clip.clone(),
            aliases: cfg.clip_aliases.clone(),
        }
    }

    pub fn library(&self) -> &ClipLibrary {
        &self.library
    }

    pub fn active_clip(&self) -> Option<&str> {
        self.active
            .and_then(|id| self.library.get(id))
            .map(|c| c.name.as_str())
    }

    /// Any clip with weight > 0.
    pub fn any_clip_in_use(&self) -> bool {
        self.layers.iter().any(|l| l.weight > 0.0)
    }

    pub fn weight_of(&self, name: &str) -> f32 {
        self.library
            .find(name)
            .and_then(|id| self.layers.iter().find(|l| l.clip == id))
            .map_or(0.0, |l| l.weight)
    }

    /// Ask for a clip by name; `None` means "no message": go idle.
    ///
    /// Returns the transition event if the active clip changed.
    pub fn request(&mut self, name: Option<&str>) -> Option<ClipEvent> {
        self.explicit = name.is_some();
        let wanted = name.unwrap_or(self.idle_clip.as_str()).to_string();
        let id = self.library.resolve(&wanted, &self.aliases)?;
        if self.active == Some(id) {
            return None;
        }
        Some(self.start(id))
    }

    fn start(&mut self, id: ClipId) -> ClipEvent {
        let immediate = !self.any_clip_in_use() || self.crossfade_duration <= 0.0;
        let duration = self.crossfade_duration;

        self.previous = self.active;
        self.active = Some(id);

        if immediate {
            self.layers.clear();
            self.layers.push(ClipLayer {
                clip: id,
                time: 0.0,
                weight: 1.0,
                fade: None,
            });
        } else {
            for layer in &mut self.layers {
                if layer.clip != id {
                    layer.fade = Some(Fade {
                        from: layer.weight,
                        to: 0.0,
                        elapsed: 0.0,
                        duration,
                    });
                }
            }
            match self.layers.iter_mut().find(|l| l.clip == id) {
                // Still visible while fading out: keep its pose time, fade back in.
                Some(layer) => {
                    layer.fade = Some(Fade {
                        from: layer.weight,
                        to: 1.0,
                        elapsed: 0.0,
                        duration,
                    });
                }
                None => self.layers.push(ClipLayer {
                    clip: id,
                    time: 0.0,
                    weight: 0.0,
                    fade: Some(Fade {
                        from: 0.0,
                        to: 1.0,
                        elapsed: 0.0,
                        duration,
                    }),
                }),
            }
        }

        let from = self.previous.and_then(|p| self.library.get(p)).map(|c| c.name.clone());
        let to = self
            .library
            .get(id)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        debug!(
            "clip transition {:?} -> {to} ({})",
            from,
            if immediate { "immediate" } else { "crossfade" }
        );
        ClipEvent::Started {
            from,
            to,
            duration: if immediate { 0.0 } else { duration },
        }
    }

    /// Advance fades and clip playback by `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> Option<ClipEvent> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let was_fading = self.layers.iter().any(|l| l.fade.is_some());

        for layer in &mut self.layers {
            let clip_len = self.library.get(layer.clip).map_or(0.0, |c| c.duration);
            layer.time = if clip_len > 0.0 {
                fmod(layer.time + dt, clip_len)
            } else {
                0.0
            };

            if let Some(fade) = layer.fade.as_mut() {
                fade.elapsed += dt;
                if fade.elapsed + FADE_EPSILON >= fade.duration {
                    layer.weight = fade.to;
                    layer.fade = None;
                } else {
                    let u = fade.elapsed / fade.duration;
                    layer.weight = (fade.from + (fade.to - fade.from) * u).clamp(0.0, 1.0);
                }
            }
        }

        let active = self.active;
        self.layers
            .retain(|l| Some(l.clip) == active || l.weight > 0.0 || l.fade.is_some());

        let still_fading = self.layers.iter().any(|l| l.fade.is_some());
        if was_fading && !still_fading {
            self.previous = None;
            let clip = self.active_clip().unwrap_or_default().to_string();
            debug!("clip transition to {clip} finished");
            return Some(ClipEvent::Finished { clip });
        }
        None
    }

    pub fn state(&self) -> AnimationState {
        let Some(active) = self.active.and_then(|id| self.library.get(id)) else {
            return AnimationState::Empty;
        };
        let incoming = self
            .layers
            .iter()
            .find(|l| Some(l.clip) == self.active)
            .and_then(|l| l.fade);
        let outgoing = self
            .layers
            .iter()
            .filter(|l| Some(l.clip) != self.active)
            .filter_map(|l| l.fade)
            .map(|f| f.remaining())
            .fold(0.0f32, f32::max);

        if let Some(fade) = incoming {
            return AnimationState::Transitioning {
                from: self
                    .previous
                    .and_then(|p| self.library.get(p))
                    .map(|c| c.name.clone()),
                to: active.name.clone(),
                remaining: fade.remaining().max(outgoing),
            };
        }
        if outgoing > 0.0 {
            return AnimationState::Transitioning {
                from: self
                    .previous
                    .and_then(|p| self.library.get(p))
                    .map(|c| c.name.clone()),
                to: active.name.clone(),
                remaining: outgoing,
            };
        }
        if self.explicit {
            AnimationState::Playing {
                clip: active.name.clone(),
            }
        } else {
            AnimationState::Idle {
                clip: active.name.clone(),
            }
        }
    }

    /// Weights and local times of every contributing clip.
    pub fn clip_weights(&self) -> impl Iterator<Item = ClipWeight> + '_ {
        self.layers.iter().filter_map(move |l| {
            self.library.get(l.clip).map(|c| ClipWeight {
                clip: c.name.clone(),
                weight: l.weight,
                time: l.time,
            })
        })
    }
}
