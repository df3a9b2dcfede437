// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! High-voltage rail regulator.
//!
//! [`Regulator`] is the complete control-interrupt state. [`Regulator::step`] is the whole
//! interrupt body minus the register accesses: it takes one [`SamplePair`] and returns the
//! duty to load into the switch timer. Running it on the host is how the loop is tested.
//!
//! Per cycle:
//!
//! 1. filter both samples
//! 2. refresh the duty ceiling from the reference (unless overridden)
//! 3. rescale the target by the reference
//! 4. PID on `compensated_target − filtered_feedback`
//! 5. clamp to `[0, max_duty]`

use crate::config::Tuning;
use crate::control::compensation::{compensated_target_for, max_duty_for};
use crate::control::iir::IirFilter;
use crate::control::pid::ShiftPid;
use crate::sync::SamplePair;

/// Inputs owned by the polling context, sampled once per cycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Setpoint {
    /// Requested rail level, already clamped to `max_target`.
    pub target: u16,
    /// Bench override of the duty ceiling.
    pub max_duty_override: Option<u16>,
}

impl Setpoint {
    pub const fn target(target: u16) -> Self {
        Self {
            target,
            max_duty_override: None,
        }
    }
}

/// Controller state, written only from the conversion-complete interrupt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Regulator {
    tuning: Tuning,
    feedback: IirFilter,
    reference: IirFilter,
    pid: ShiftPid,

    /// Target in the feedback filter's scale.
    compensated_target: i32,
    /// Current on-time ceiling.
    max_duty: u16,
    /// Last value handed to the switch timer.
    duty: u16,
}

impl Regulator {
    pub const fn new(tuning: Tuning) -> Self {
        Self {
            feedback: IirFilter::new(tuning.feedback_shift),
            reference: IirFilter::new(tuning.reference_shift),
            pid: ShiftPid::new(tuning.p_shift, tuning.i_shift)
                .with_integral_limits(
                    tuning.integral_min,
                    tuning.integral_max,
                    tuning.feedback_shift,
                )
                .with_derivative(tuning.derivative),
            compensated_target: 0,
            max_duty: tuning.startup_max_duty,
            duty: 0,
            tuning,
        }
    }

    /// Run one control cycle and return the new switch duty.
    pub fn step(&mut self, sample: SamplePair, setpoint: Setpoint) -> u16 {
        let filtered_feedback = self.feedback.update(sample.feedback);
        let filtered_reference = self.reference.update(sample.reference);

        self.max_duty = match setpoint.max_duty_override {
            Some(max_duty) => max_duty,
            None => max_duty_for(filtered_reference, &self.tuning),
        };

        let target = setpoint.target.min(self.tuning.max_target);
        self.compensated_target = compensated_target_for(filtered_reference, target, &self.tuning);

        let error = self.compensated_target - filtered_feedback;
        let out = self.pid.update(error);

        self.duty = out.clamp(0, i32::from(self.max_duty)) as u16;
        self.duty
    }

    /// Filtered feedback, scaled by the filter.
    #[inline]
    pub fn filtered_feedback(&self) -> i32 {
        self.feedback.value()
    }

    /// Filtered reference, scaled by the filter.
    #[inline]
    pub fn filtered_reference(&self) -> i32 {
        self.reference.value()
    }

    /// Filtered feedback in raw sample units.
    #[inline]
    pub fn feedback_level(&self) -> u16 {
        self.feedback.output().clamp(0, i32::from(u16::MAX)) as u16
    }

    /// Filtered reference in raw sample units.
    #[inline]
    pub fn reference_level(&self) -> u16 {
        self.reference.output().clamp(0, i32::from(u16::MAX)) as u16
    }

    #[inline]
    pub fn integral(&self) -> i32 {
        self.pid.integral()
    }

    #[inline]
    pub fn integral_bounds(&self) -> (i32, i32) {
        self.pid.integral_bounds()
    }

    #[inline]
    pub fn compensated_target(&self) -> i32 {
        self.compensated_target
    }

    #[inline]
    pub fn max_duty(&self) -> u16 {
        self.max_duty
    }

    #[inline]
    pub fn duty(&self) -> u16 {
        self.duty
    }
}

impl Default for Regulator {
    fn default() -> Self {
        Self::new(Tuning::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_with_startup_ceiling() {
        let r = Regulator::default();
        assert_eq!(r.duty(), 0);
        assert_eq!(r.max_duty(), 48);
        assert_eq!(r.integral(), 0);
    }

    #[test]
    fn zero_target_keeps_switch_off() {
        let mut r = Regulator::default();
        for _ in 0..1000 {
            assert_eq!(r.step(SamplePair::new(300, 0xF0), Setpoint::target(0)), 0);
        }
    }

    #[test]
    fn open_loop_drives_to_ceiling() {
        let mut r = Regulator::default();
        let mut duty = 0;
        for _ in 0..100 {
            duty = r.step(SamplePair::new(0, 0xF0), Setpoint::target(150));
        }
        assert_eq!(r.max_duty(), 56);
        assert_eq!(duty, 56);
    }

    #[test]
    fn override_replaces_reference_ceiling() {
        let mut r = Regulator::default();
        let setpoint = Setpoint {
            target: 200,
            max_duty_override: Some(20),
        };
        for _ in 0..100 {
            assert!(r.step(SamplePair::new(0, 0x175), setpoint) <= 20);
        }
        assert_eq!(r.max_duty(), 20);
    }

    #[test]
    fn integral_saturates_at_filter_scaled_limit() {
        let t = Tuning::DEFAULT;
        let mut r = Regulator::new(t);
        for _ in 0..100_000 {
            r.step(SamplePair::new(0, 0x175), Setpoint::target(208));
        }
        assert_eq!(r.integral(), t.integral_max << t.feedback_shift);
        assert_eq!(
            r.integral_bounds(),
            (t.integral_min << t.feedback_shift, t.integral_max << t.feedback_shift)
        );
    }

    #[test]
    fn clamp_scale_follows_filter_shift() {
        let t = Tuning::DEFAULT.with_filter_shift(3);
        let mut r = Regulator::new(t);
        for _ in 0..100_000 {
            r.step(SamplePair::new(0, 0x175), Setpoint::target(208));
        }
        assert_eq!(r.integral(), 96 << 3);
        assert_eq!(r.filtered_reference(), 0x175 << 3);
    }

    #[test]
    fn integral_saturates_low_when_rail_is_high() {
        let t = Tuning::DEFAULT;
        let mut r = Regulator::new(t);
        for _ in 0..10_000 {
            assert_eq!(r.step(SamplePair::new(1000, 0xF0), Setpoint::target(50)), 0);
        }
        assert_eq!(r.integral(), t.integral_min << t.feedback_shift);
    }

    #[test]
    fn target_above_limit_is_clamped() {
        let mut a = Regulator::default();
        let mut b = Regulator::default();
        for _ in 0..50 {
            a.step(SamplePair::new(0, 0xF0), Setpoint::target(u16::MAX));
            b.step(SamplePair::new(0, 0xF0), Setpoint::target(208));
        }
        assert_eq!(a.compensated_target(), b.compensated_target());
    }
}
