// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Supply-voltage compensation.
//!
//! The feedback divider is sampled against the MCU supply, not a fixed reference, and the
//! reference channel reads a fixed 1.2 V source against that same supply. The reference
//! sample therefore rises as the supply falls (≈ 0xF0 at 5 V, ≈ 0x175 at 3.3 V), and both
//! the target and the safe on-time scale with it.

use crate::config::Tuning;
use crate::control::fixed::{shift_series, soft_mul};

/// Switch on-time ceiling for a filtered reference value.
///
/// `max_duty ≈ reference / 4.43`, evaluated as a shift series with the filter scale folded
/// into every term, then held under the period's dead-time ceiling.
pub fn max_duty_for(filtered_reference: i32, tuning: &Tuning) -> u16 {
    let v = filtered_reference.max(0) as u32;
    let duty = shift_series(v, tuning.max_duty_series, tuning.reference_shift);
    duty.clamp(0, i32::from(tuning.duty_ceiling())) as u16
}

/// Feedback level matching `target` at the current supply voltage.
///
/// `(reference * target) / 117` with one software multiply and a shift series. The
/// result is in the feedback filter's scale so it can be compared against the filtered
/// feedback directly.
pub fn compensated_target_for(filtered_reference: i32, target: u16, tuning: &Tuning) -> i32 {
    let v = filtered_reference.clamp(0, i32::from(u16::MAX)) as u16;
    let numerator = soft_mul(v, target);
    let t = shift_series(numerator, tuning.target_series, 0);

    // Reference scale → feedback scale.
    if tuning.feedback_shift >= tuning.reference_shift {
        t << (tuning.feedback_shift - tuning.reference_shift)
    } else {
        t >> (tuning.reference_shift - tuning.feedback_shift)
    }
}
