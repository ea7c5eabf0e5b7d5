//! Temporal blending of channel weights toward their targets.
//! - `blend`: fixed fraction of the remaining distance per call
//! - `blend_decay`: elapsed-time exponential decay, frame-rate independent
//! - `Smoother`: resolves a configured `SmoothingMode` into one of the two

use crate::config::SmoothingMode;

/// Distance below which a weight snaps onto its target.
pub const SNAP_EPSILON: f32 = 1e-4;

#[inline]
fn settle(current: f32, target: f32, next: f32) -> f32 {
    if (target - next).abs() <= SNAP_EPSILON {
        return target;
    }
    // Never step past the target, even with a rate > 1 or float noise.
    if (target - current) * (target - next) < 0.0 {
        target
    } else {
        next
    }
}

/// Move `rate` of the way from `current` to `target`.
///
/// `current == target` is a fixed point; the result never overshoots.
#[inline]
pub fn blend(current: f32, target: f32, rate: f32) -> f32 {
    if current == target {
        return target;
    }
    let rate = rate.clamp(0.0, 1.0);
    settle(current, target, current + (target - current) * rate)
}

/// `current + (target - current) * (1 - exp(-dt / tau))`.
///
/// A non-positive `tau` snaps straight to the target; a non-positive `dt` holds.
#[inline]
pub fn blend_decay(current: f32, target: f32, tau: f32, dt: f32) -> f32 {
    if current == target || dt <= 0.0 {
        return current;
    }
    if tau <= 0.0 {
        return target;
    }
    let alpha = 1.0 - (-dt / tau).exp();
    settle(current, target, current + (target - current) * alpha)
}

/// Decay constant whose step at `1 / reference_fps` equals the per-frame `rate`.
#[inline]
pub fn tau_for_rate(rate: f32, reference_fps: f32) -> f32 {
    if rate >= 1.0 {
        return 0.0;
    }
    -1.0 / (reference_fps * (1.0 - rate).ln())
}

/// Per-frame view of the configured smoothing rule.
#[derive(Clone, Copy, Debug)]
pub struct Smoother {
    mode: SmoothingMode,
    dt: f32,
}

impl Smoother {
    pub fn new(mode: SmoothingMode, dt: f32) -> Self {
        Self { mode, dt }
    }

    /// Step `current` toward `target` using `rate` as the per-frame fraction.
    #[inline]
    pub fn step(&self, current: f32, target: f32, rate: f32) -> f32 {
        match self.mode {
            SmoothingMode::PerFrame => blend(current, target, rate),
            SmoothingMode::FrameRateIndependent { reference_fps } => {
                blend_decay(current, target, tau_for_rate(rate, reference_fps), self.dt)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    #[test]
    fn fixed_points_hold() {
        for w in [0.0, 0.25, 0.5, 1.0] {
            assert_eq!(blend(w, w, 0.1), w);
            assert_eq!(blend_decay(w, w, 0.2, 1.0 / 60.0), w);
        }
    }

    #[test]
    fn moves_strictly_toward_target_without_overshoot() {
        let cases = [(0.0, 1.0), (1.0, 0.0), (0.3, 0.7), (0.9, 0.2)];
        for (c, t) in cases {
            for rate in [0.05, 0.1, 0.2, 0.9] {
                let n = blend(c, t, rate);
                assert!((t - n).abs() < (t - c).abs(), "c={c} t={t} n={n}");
                assert!((n - c) * (t - c) > 0.0, "moved the wrong way");
                assert!((t - n) * (t - c) >= 0.0, "overshoot c={c} t={t} n={n}");
            }
        }
    }

    #[test]
    fn snaps_when_close() {
        assert_eq!(blend(0.99995, 1.0, 0.1), 1.0);
        assert_eq!(blend(0.00005, 0.0, 0.1), 0.0);
    }

    #[test]
    fn rate_one_reaches_target() {
        assert_eq!(blend(0.2, 0.8, 1.0), 0.8);
        assert_eq!(blend(0.2, 0.8, 7.0), 0.8);
    }

    #[test]
    fn converges_over_many_frames() {
        let mut w = 0.0;
        for _ in 0..200 {
            w = blend(w, 1.0, 0.1);
        }
        assert_eq!(w, 1.0);
    }

    #[test]
    fn decay_matches_per_frame_at_reference_rate() {
        let fps = 60.0;
        let tau = tau_for_rate(0.1, fps);
        approx(blend_decay(0.0, 1.0, tau, 1.0 / fps), 0.1, 1e-5);
    }

    #[test]
    fn decay_is_frame_rate_independent() {
        let tau = tau_for_rate(0.1, 60.0);
        // One 1/30 s frame vs two 1/60 s frames.
        let one = blend_decay(0.0, 1.0, tau, 1.0 / 30.0);
        let two = blend_decay(blend_decay(0.0, 1.0, tau, 1.0 / 60.0), 1.0, tau, 1.0 / 60.0);
        approx(one, two, 1e-5);
    }

    #[test]
    fn decay_edge_cases() {
        assert_eq!(blend_decay(0.4, 1.0, 0.1, 0.0), 0.4);
        assert_eq!(blend_decay(0.4, 1.0, 0.0, 0.016), 1.0);
        // A huge frame lands on the target, not beyond it.
        assert_eq!(blend_decay(0.0, 1.0, 0.01, 10.0), 1.0);
    }

    #[test]
    fn smoother_dispatch() {
        let per_frame = Smoother::new(SmoothingMode::PerFrame, 0.5);
        approx(per_frame.step(0.0, 1.0, 0.1), 0.1, 1e-6);

        let timed = Smoother::new(
            SmoothingMode::FrameRateIndependent { reference_fps: 60.0 },
            1.0 / 60.0,
        );
        approx(timed.step(0.0, 1.0, 0.2), 0.2, 1e-5);
    }
}
