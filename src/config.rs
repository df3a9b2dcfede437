// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Tuning constants for the converter and display.
//!
//! Every gain and divisor is an integer shift (or a short series of shifts) because the
//! control interrupt must not rely on a hardware multiplier. Each field documents the
//! real-number quantity it approximates so it can be re-derived for a new transformer or
//! board batch without reverse engineering the bit tricks.

use crate::control::fixed::ShiftTerm;
use crate::control::pid::{DerivativeTerm, Gain};

/// Real factor ≈ 1 / 4.43 : `1 / (1/4 − 1/64 − 1/128)`.
///
/// Maps the (unscaled) reference sample to the largest switch on-time that keeps the
/// transformer core out of saturation. Measured ratios were 373 → 84 and 240 → 54.
pub const MAX_DUTY_SERIES: &[ShiftTerm] = &[ShiftTerm::Add(2), ShiftTerm::Sub(6), ShiftTerm::Sub(7)];

/// Real factor ≈ 1 / 117.0 : `1/128 + 1/2048 + 1/4096`.
///
/// Applied to `reference * target` to get the feedback level that corresponds to the
/// requested rail voltage at the current supply voltage.
pub const TARGET_SERIES: &[ShiftTerm] =
    &[ShiftTerm::Add(7), ShiftTerm::Add(11), ShiftTerm::Add(12)];

/// Converter and control-law tuning.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tuning {
    /// Switch timer period in timer counts (140 @ 48 MHz ≈ 343 kHz).
    pub period: u16,
    /// Minimum off-time per period in counts; the duty ceiling never exceeds
    /// `period - dead_time`.
    pub dead_time: u16,
    /// IIR shift for the feedback channel. Filtered values carry this many extra bits.
    pub feedback_shift: u8,
    /// IIR shift for the reference channel.
    pub reference_shift: u8,
    /// Proportional gain, Kp = 2^p_shift duty counts per filtered count.
    pub p_shift: u8,
    /// Integral gain, Ki = 2^-i_shift per cycle.
    pub i_shift: u8,
    /// Lower integral clamp. The accumulator is held at or above
    /// `integral_min << feedback_shift`.
    pub integral_min: i32,
    /// Upper integral clamp, applied as `integral_max << feedback_shift`.
    pub integral_max: i32,
    /// Optional derivative term.
    pub derivative: Option<DerivativeTerm>,
    /// Largest accepted target (208 ≈ 190 V on the rail).
    pub max_target: u16,
    /// Duty ceiling used until the first reference sample has been filtered.
    pub startup_max_duty: u16,
    /// Reference → max duty approximation.
    pub max_duty_series: &'static [ShiftTerm],
    /// `reference * target` → compensated target approximation.
    pub target_series: &'static [ShiftTerm],
}

impl Tuning {
    pub const DEFAULT: Tuning = Tuning {
        period: 140,
        dead_time: 14,
        feedback_shift: 2,
        reference_shift: 2,
        p_shift: 1,
        i_shift: 8,
        integral_min: -32,
        integral_max: 96,
        derivative: None,
        max_target: 208,
        startup_max_duty: 48,
        max_duty_series: MAX_DUTY_SERIES,
        target_series: TARGET_SERIES,
    };

    /// Set the proportional and integral shifts.
    pub const fn with_gains(mut self, p_shift: u8, i_shift: u8) -> Self {
        self.p_shift = p_shift;
        self.i_shift = i_shift;
        self
    }

    /// Set the integral clamp (scaled by the feedback filter shift when applied).
    pub const fn with_integral_limits(mut self, min: i32, max: i32) -> Self {
        self.integral_min = min;
        self.integral_max = max;
        self
    }

    /// Enable the derivative term.
    pub const fn with_derivative(mut self, gain: Gain, inverted: bool) -> Self {
        self.derivative = Some(DerivativeTerm { gain, inverted });
        self
    }

    /// Set the filter shift for both channels.
    pub const fn with_filter_shift(mut self, shift: u8) -> Self {
        self.feedback_shift = shift;
        self.reference_shift = shift;
        self
    }

    pub const fn with_period(mut self, period: u16) -> Self {
        self.period = period;
        self
    }

    /// Highest duty the timer may ever be given for this period.
    #[inline]
    pub const fn duty_ceiling(&self) -> u16 {
        self.period.saturating_sub(self.dead_time)
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Display fade timing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FadeTiming {
    /// Timestamp bits dropped to form the 8-bit fade counter.
    pub tick_shift: u8,
    /// Left rotation applied to the fade counter before comparing against thresholds.
    pub dither_rotate: u32,
    /// All-off hold between two different masks, in microseconds.
    pub off_gap_us: u32,
}

impl FadeTiming {
    /// 2048 cycles per step at 48 MHz: a full 256-step sweep every ≈ 11 ms.
    pub const DEFAULT: FadeTiming = FadeTiming {
        tick_shift: 11,
        dither_rotate: 5,
        off_gap_us: 3,
    };
}

impl Default for FadeTiming {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Watchdog timeout. The control interrupt runs every ≈ 3 µs, so 2 ms is hundreds of
/// missed cycles.
pub const WATCHDOG_TIMEOUT_US: u32 = 2_000;
