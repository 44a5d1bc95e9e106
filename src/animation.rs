//! Layer rotation animations as pure functions of elapsed time.
//!
//! Nothing here touches cube state. A driver samples [`Animation::angle_at`]
//! for presentation and asks [`Animation::is_finished`] to decide when the
//! discrete commit may happen.

use std::f64::consts::FRAC_PI_2;
use std::time::Duration;

use crate::grid::Layer;
use crate::pieces::CubieId;

/// Easing curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    /// Decelerating cubic, used when a released drag settles.
    EaseOutCubic,
    /// Symmetric cubic, used for discrete turns.
    EaseInOutCubic,
}

impl Easing {
    /// Maps linear progress in `0..=1` to eased progress.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Interpolation of a layer angle from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    pub from: f64,
    pub to: f64,
    pub duration: Duration,
    pub easing: Easing,
}

impl Animation {
    pub fn new(from: f64, to: f64, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            easing,
        }
    }

    /// Linear progress in `0..=1` after `elapsed`.
    pub fn progress(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Presented angle after `elapsed`. Exactly `to` once finished.
    pub fn angle_at(&self, elapsed: Duration) -> f64 {
        if self.is_finished(elapsed) {
            return self.to;
        }
        let eased = self.easing.apply(self.progress(elapsed));
        self.from + (self.to - self.from) * eased
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

/// A layer animating toward a whole number of quarter turns.
///
/// `quarter_turns == 0` means the layer returns to rest without any logical
/// change.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerTurn {
    pub layer: Layer,
    pub quarter_turns: i32,
    pub animation: Animation,
    pub elapsed: Duration,
    /// Cubies detached into the layer's pivot group when the turn began.
    pub members: Vec<CubieId>,
}

impl LayerTurn {
    pub fn new(
        layer: Layer,
        quarter_turns: i32,
        animation: Animation,
        members: Vec<CubieId>,
    ) -> Self {
        Self {
            layer,
            quarter_turns,
            animation,
            elapsed: Duration::ZERO,
            members,
        }
    }

    /// Angle the turn ends at.
    pub fn target_angle(&self) -> f64 {
        f64::from(self.quarter_turns) * FRAC_PI_2
    }

    /// Advances the clock and returns the angle to present.
    pub fn advance(&mut self, dt: Duration) -> f64 {
        self.elapsed = self.elapsed.saturating_add(dt);
        self.animation.angle_at(self.elapsed)
    }

    pub fn is_finished(&self) -> bool {
        self.animation.is_finished(self.elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::EaseOutCubic, Easing::EaseInOutCubic] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
            assert_eq!(easing.apply(2.0), 1.0);
        }
        assert_eq!(Easing::EaseInOutCubic.apply(0.5), 0.5);
    }

    #[test]
    fn test_animation_samples_monotonically() {
        let animation = Animation::new(
            0.3,
            FRAC_PI_2,
            Duration::from_millis(200),
            Easing::EaseOutCubic,
        );
        let mut previous = animation.angle_at(Duration::ZERO);
        assert_eq!(previous, 0.3);
        for ms in (10..=200).step_by(10) {
            let angle = animation.angle_at(Duration::from_millis(ms));
            assert!(angle >= previous);
            previous = angle;
        }
        assert_eq!(previous, FRAC_PI_2);
        assert!(animation.is_finished(Duration::from_millis(200)));
        assert!(!animation.is_finished(Duration::from_millis(199)));
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let animation = Animation::new(1.0, 0.0, Duration::ZERO, Easing::EaseInOutCubic);
        assert!(animation.is_finished(Duration::ZERO));
        assert_eq!(animation.angle_at(Duration::ZERO), 0.0);
    }

    #[test]
    fn test_layer_turn_reaches_target() {
        let animation = Animation::new(
            0.0,
            -FRAC_PI_2,
            Duration::from_millis(100),
            Easing::EaseInOutCubic,
        );
        let mut turn = LayerTurn::new(Layer::Up, -1, animation, vec![]);
        assert_eq!(turn.target_angle(), -FRAC_PI_2);
        turn.advance(Duration::from_millis(50));
        assert!(!turn.is_finished());
        assert_eq!(turn.advance(Duration::MAX), -FRAC_PI_2);
        assert!(turn.is_finished());
    }
}
