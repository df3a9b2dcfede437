// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Switching and sampling synchronization.
//!
//! The switch timer free-runs over `period` counts and drives the FET high for the first
//! `duty` counts. Its compare register is preloaded, so a duty written mid-period lands on
//! the next update event. The same update event is the ADC trigger: both channels are
//! converted at an identical phase every period, so switching ripple aliases to a constant
//! offset rather than noise. End of conversion is the one interrupt that runs the control
//! law.

use crate::config::Tuning;

/// The two conversions made on every switching period.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SamplePair {
    /// High-voltage divider, ratiometric to the supply.
    pub feedback: u16,
    /// Fixed reference, ratiometric to the supply.
    pub reference: u16,
}

impl SamplePair {
    pub const fn new(feedback: u16, reference: u16) -> Self {
        Self {
            feedback,
            reference,
        }
    }
}

/// Shortest period the timer may be set to.
pub const MIN_PERIOD: u16 = 20;

/// Rate the switch timer counts at. Periods and duties are in these counts whatever
/// the core clock.
pub const COUNT_HZ: u32 = 48_000_000;

/// Timer clock, prescaler and period.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwitchTiming {
    /// Timer input clock (Hz).
    pub timer_clock_hz: u32,
    /// Counts per period.
    pub period: u16,
}

impl SwitchTiming {
    pub const fn new(timer_clock_hz: u32, tuning: &Tuning) -> Self {
        Self {
            timer_clock_hz,
            period: tuning.period,
        }
    }

    /// `PSC` value that brings the timer clock down to [`COUNT_HZ`].
    pub fn prescaler(&self) -> u16 {
        (self.timer_clock_hz / COUNT_HZ).saturating_sub(1) as u16
    }

    /// Switching (and control-loop) frequency in Hz.
    pub fn switching_hz(&self) -> u32 {
        if self.period == 0 {
            return 0;
        }
        let count_hz = self.timer_clock_hz / (u32::from(self.prescaler()) + 1);
        count_hz / u32::from(self.period)
    }

    /// Core cycles available to the control interrupt per switching period.
    pub fn cycle_budget(&self, sysclk_hz: u32) -> u32 {
        match self.switching_hz() {
            0 => 0,
            hz => sysclk_hz / hz,
        }
    }

    /// Auto-reload value for an up-counting timer; the counter runs `0..=arr`.
    #[inline]
    pub fn auto_reload(&self) -> u16 {
        self.period.saturating_sub(1)
    }
}

/// Bench override of the period and duty ceiling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingOverride {
    pub period: u16,
    pub max_duty: u16,
}

impl TimingOverride {
    /// Validate a requested override: the period is raised to [`MIN_PERIOD`] and the
    /// duty ceiling keeps at least `dead_time` counts off per period.
    pub fn new(period: u16, max_duty: u16, dead_time: u16) -> Self {
        let period = period.max(MIN_PERIOD);
        let max_duty = max_duty.min(period.saturating_sub(dead_time));
        Self { period, max_duty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_switching_frequency() {
        let timing = SwitchTiming::new(48_000_000, &Tuning::DEFAULT);
        assert_eq!(timing.switching_hz(), 342_857);
        assert_eq!(timing.auto_reload(), 139);
        assert_eq!(timing.prescaler(), 0);
        assert_eq!(timing.cycle_budget(48_000_000), 140);
    }

    #[test]
    fn fast_core_keeps_period_in_48mhz_counts() {
        let timing = SwitchTiming::new(192_000_000, &Tuning::DEFAULT);
        assert_eq!(timing.prescaler(), 3);
        assert_eq!(timing.switching_hz(), 342_857);
        assert_eq!(timing.auto_reload(), 139);
        assert_eq!(timing.cycle_budget(192_000_000), 560);
    }

    #[test]
    fn override_is_sanitized() {
        assert_eq!(
            TimingOverride::new(5, 200, 14),
            TimingOverride {
                period: 20,
                max_duty: 6
            }
        );
        assert_eq!(
            TimingOverride::new(160, 100, 14),
            TimingOverride {
                period: 160,
                max_duty: 100
            }
        );
    }
}
