// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Fixed-point PID controller with shift gains.
//!
//! Works in `no_std`, does not allocate, and uses no multiply: every gain is a power of two.

/// A power-of-two gain.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    /// × 2^n
    Shl(u8),
    /// × 2^-n (arithmetic shift, rounds toward −∞)
    Shr(u8),
}

impl Gain {
    #[inline]
    pub fn apply(self, x: i32) -> i32 {
        match self {
            Gain::Shl(n) => x << n,
            Gain::Shr(n) => x >> n,
        }
    }
}

/// Derivative term configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DerivativeTerm {
    pub gain: Gain,
    /// Use `previous − error` instead of `error − previous`.
    pub inverted: bool,
}

/// PID controller with shift gains and asymmetric integral clamp.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ShiftPid {
    /// Kp = 2^p_shift
    p_shift: u8,
    /// Ki = 2^-i_shift, also the integrator's fixed-point scale
    i_shift: u8,
    derivative: Option<DerivativeTerm>,

    /// Integrator state
    integral: i32,
    /// Last error (for derivative term)
    prev_error: i32,

    /// Integral anti-windup clamp, already scaled
    int_min: i32,
    int_max: i32,
}

impl ShiftPid {
    /// Create a controller with the given shift gains and no integral headroom.
    pub const fn new(p_shift: u8, i_shift: u8) -> Self {
        Self {
            p_shift,
            i_shift,
            derivative: None,
            integral: 0,
            prev_error: 0,
            int_min: 0,
            int_max: 0,
        }
    }

    /// Set integral limits for anti-windup.
    ///
    /// The accumulator is clamped to `[min << scale, max << scale]`, where `scale` is the
    /// fixed-point scale of the error fed to [`ShiftPid::update`] (the IIR filter shift
    /// when the error is formed from filtered values). The output term stays
    /// `integral >> i_shift`.
    pub const fn with_integral_limits(mut self, min: i32, max: i32, scale: u8) -> Self {
        self.int_min = min << scale;
        self.int_max = max << scale;
        self
    }

    pub const fn with_derivative(mut self, derivative: Option<DerivativeTerm>) -> Self {
        self.derivative = derivative;
        self
    }

    /// Reset integrator + derivative history.
    pub fn reset(&mut self) {
        self.integral = 0;
        self.prev_error = 0;
    }

    #[inline]
    pub fn integral(&self) -> i32 {
        self.integral
    }

    /// Clamp bounds of the accumulator.
    #[inline]
    pub fn integral_bounds(&self) -> (i32, i32) {
        (self.int_min, self.int_max)
    }

    /// Run one update on `error` (setpoint − measurement). Returns the unclamped plant
    /// output; the caller owns the output limits.
    pub fn update(&mut self, error: i32) -> i32 {
        // ----- I term -----
        self.integral = self
            .integral
            .saturating_add(error)
            .clamp(self.int_min, self.int_max);

        // ----- D term -----
        let d = match self.derivative {
            Some(term) => {
                let delta = if term.inverted {
                    self.prev_error.saturating_sub(error)
                } else {
                    error.saturating_sub(self.prev_error)
                };
                term.gain.apply(delta)
            }
            None => 0,
        };
        self.prev_error = error;

        (error << self.p_shift)
            .saturating_add(self.integral >> self.i_shift)
            .saturating_add(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;

    const K: u8 = Tuning::DEFAULT.feedback_shift;

    #[test]
    fn integral_saturates_high() {
        let mut pid = ShiftPid::new(1, 8).with_integral_limits(-32, 96, K);
        for _ in 0..10_000 {
            pid.update(4000);
            assert!(pid.integral() <= 96 << K);
        }
        assert_eq!(pid.integral(), 96 << K);
    }

    #[test]
    fn integral_saturates_low() {
        let mut pid = ShiftPid::new(1, 8).with_integral_limits(-32, 96, K);
        for _ in 0..10_000 {
            pid.update(-4000);
            assert!(pid.integral() >= -32 << K);
        }
        assert_eq!(pid.integral(), -32 << K);
    }

    #[test]
    fn clamp_scale_is_independent_of_integral_gain() {
        let a = ShiftPid::new(1, 8).with_integral_limits(-32, 96, 2);
        let b = ShiftPid::new(1, 4).with_integral_limits(-32, 96, 2);
        assert_eq!(a.integral_bounds(), (-128, 384));
        assert_eq!(a.integral_bounds(), b.integral_bounds());
    }

    #[test]
    fn proportional_and_integral_terms() {
        let mut pid = ShiftPid::new(2, 4).with_integral_limits(-100, 100, 0);
        // integral = 16 → contributes 1
        assert_eq!(pid.update(16), (16 << 2) + 1);
        // integral = 32 → contributes 2
        assert_eq!(pid.update(16), (16 << 2) + 2);
    }

    #[test]
    fn derivative_sign_convention() {
        let term = DerivativeTerm {
            gain: Gain::Shl(1),
            inverted: false,
        };
        let mut pid = ShiftPid::new(0, 8)
            .with_integral_limits(0, 0, 0)
            .with_derivative(Some(term));
        assert_eq!(pid.update(10), 10 + 20);
        assert_eq!(pid.update(4), 4 - 12);

        let mut inv = ShiftPid::new(0, 8)
            .with_integral_limits(0, 0, 0)
            .with_derivative(Some(DerivativeTerm {
                gain: Gain::Shr(1),
                inverted: true,
            }));
        assert_eq!(inv.update(10), 10 - 5);
    }

    #[test]
    fn reset_clears_history() {
        let mut pid = ShiftPid::new(0, 2).with_integral_limits(-10, 10, 0);
        pid.update(7);
        pid.reset();
        assert_eq!(pid.integral(), 0);
    }
}
