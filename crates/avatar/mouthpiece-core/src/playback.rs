//! Audio playback position as seen by the core.
//!
//! The real transport (decoder, device) lives with the host. The core only
//! reads a time per frame through `PlaybackClock`. `AudioTransport` is a
//! self-contained transport with the usual controls, used by hosts that
//! drive audio themselves and by tests.

use serde::{Deserialize, Serialize};

/// Source of the current playback position in seconds.
pub trait PlaybackClock {
    fn current_time(&self) -> f32;
}

impl PlaybackClock for f32 {
    fn current_time(&self) -> f32 {
        *self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioTransport {
    time: f32,
    duration: f32,
    paused: bool,
    muted: bool,
    volume: f32,
}

impl Default for AudioTransport {
    fn default() -> Self {
        Self {
            time: 0.0,
            duration: 0.0,
            paused: true,
            muted: false,
            volume: 1.0,
        }
    }
}

impl AudioTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport with a known track length.
    pub fn with_duration(duration: f32) -> Self {
        let mut t = Self::default();
        t.set_duration(duration);
        t
    }

    /// Update the track length (e.g. once decoding reports it). Time is re-clamped.
    pub fn set_duration(&mut self, duration: f32) {
        self.duration = if duration.is_finite() {
            duration.max(0.0)
        } else {
            0.0
        };
        self.time = self.time.min(self.duration);
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    #[inline]
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Start playback. Without a known duration there is nothing to play.
    pub fn play(&mut self) -> bool {
        if self.duration <= 0.0 {
            return false;
        }
        if self.time >= self.duration {
            self.time = 0.0;
        }
        self.paused = false;
        true
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Jump to `time`, clamped to `[0, duration]`.
    pub fn seek(&mut self, time: f32) {
        if !time.is_finite() {
            return;
        }
        self.time = time.clamp(0.0, self.duration);
    }

    /// Play/stop button: stopping pauses and rewinds, starting needs a duration.
    pub fn toggle(&mut self) {
        if !self.paused {
            self.pause();
            self.seek(0.0);
        } else {
            self.play();
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        if volume.is_finite() {
            self.volume = volume.clamp(0.0, 1.0);
        }
    }

    pub fn mute(&mut self) {
        self.muted = true;
    }

    pub fn unmute(&mut self) {
        self.muted = false;
    }

    /// Advance by `dt` while playing; reaching the end pauses at the end.
    pub fn advance(&mut self, dt: f32) {
        if self.paused || dt <= 0.0 {
            return;
        }
        self.time += dt;
        if self.time >= self.duration {
            self.time = self.duration;
            self.paused = true;
        }
    }
}

impl PlaybackClock for AudioTransport {
    fn current_time(&self) -> f32 {
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_requires_duration() {
        let mut t = AudioTransport::new();
        assert!(!t.play());
        assert!(t.is_paused());
        t.set_duration(2.0);
        assert!(t.play());
        assert!(!t.is_paused());
    }

    #[test]
    fn seek_is_clamped() {
        let mut t = AudioTransport::with_duration(3.0);
        t.seek(5.0);
        assert_eq!(t.current_time(), 3.0);
        t.seek(-1.0);
        assert_eq!(t.current_time(), 0.0);
        t.seek(f32::NAN);
        assert_eq!(t.current_time(), 0.0);
    }

    #[test]
    fn toggle_stops_and_rewinds() {
        let mut t = AudioTransport::with_duration(3.0);
        t.toggle();
        assert!(!t.is_paused());
        t.advance(1.25);
        assert_eq!(t.current_time(), 1.25);
        t.toggle();
        assert!(t.is_paused());
        assert_eq!(t.current_time(), 0.0);
    }

    #[test]
    fn advance_stops_at_end() {
        let mut t = AudioTransport::with_duration(1.0);
        t.play();
        t.advance(0.75);
        t.advance(0.75);
        assert_eq!(t.current_time(), 1.0);
        assert!(t.is_paused());
        // Playing again from the end restarts.
        assert!(t.play());
        assert_eq!(t.current_time(), 0.0);
    }

    #[test]
    fn volume_and_mute() {
        let mut t = AudioTransport::new();
        t.set_volume(1.5);
        assert_eq!(t.volume(), 1.0);
        t.set_volume(-0.5);
        assert_eq!(t.volume(), 0.0);
        t.mute();
        assert!(t.is_muted());
        t.unmute();
        assert!(!t.is_muted());
    }
}
