// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Watchdog supervision.
//!
//! The watchdog is reloaded once per *completed* control cycle (filter through duty
//! write), never merely because the interrupt fired. If the cycle stops completing for a
//! whole timeout the device resets; there is no other recovery path.
//!
//! [`Watchdog`] models the hardware countdown against a simulated clock so that behaviour
//! can be tested on the host. [`IwdgSettings`] derives the STM32 IWDG prescaler and reload
//! for a timeout.

/// Result of advancing the watchdog clock.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchdogEvent {
    Running,
    /// Countdown hit zero: the device is reset.
    Reset,
}

/// Countdown watchdog model.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Watchdog {
    timeout_us: u32,
    remaining_us: u32,
    tripped: bool,
}

impl Watchdog {
    /// Arm with a full timeout.
    pub const fn armed(timeout_us: u32) -> Self {
        Self {
            timeout_us,
            remaining_us: timeout_us,
            tripped: false,
        }
    }

    /// Reload the countdown. Has no effect once the reset has fired.
    pub fn pet(&mut self) {
        if !self.tripped {
            self.remaining_us = self.timeout_us;
        }
    }

    /// Let `elapsed_us` pass.
    pub fn advance(&mut self, elapsed_us: u32) -> WatchdogEvent {
        if !self.tripped {
            self.remaining_us = self.remaining_us.saturating_sub(elapsed_us);
            self.tripped = self.remaining_us == 0;
        }
        if self.tripped {
            WatchdogEvent::Reset
        } else {
            WatchdogEvent::Running
        }
    }

    #[inline]
    pub fn has_reset(&self) -> bool {
        self.tripped
    }

    #[inline]
    pub fn remaining_us(&self) -> u32 {
        self.remaining_us
    }
}

/// Nominal LSI frequency feeding the IWDG.
pub const LSI_HZ: u32 = 32_000;

/// IWDG prescaler code (`PR`, divider `4 << PR`) and reload (`RLR`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IwdgSettings {
    pub prescaler: u8,
    pub reload: u16,
}

impl IwdgSettings {
    const MAX_PRESCALER: u8 = 6;
    const MAX_RELOAD: u64 = 0xFFF;

    /// Smallest prescaler that can express `timeout_us`, for the finest resolution.
    /// Timeouts beyond the hardware range saturate at the longest one.
    pub fn for_timeout(timeout_us: u32, lsi_hz: u32) -> Self {
        for prescaler in 0..=Self::MAX_PRESCALER {
            let divider = 4u64 << prescaler;
            let ticks = timeout_us as u64 * lsi_hz as u64 / (divider * 1_000_000);
            if ticks <= Self::MAX_RELOAD {
                return Self {
                    prescaler,
                    reload: ticks.max(1) as u16,
                };
            }
        }
        Self {
            prescaler: Self::MAX_PRESCALER,
            reload: Self::MAX_RELOAD as u16,
        }
    }

    /// Timeout these settings produce, in microseconds.
    pub fn timeout_us(&self, lsi_hz: u32) -> u32 {
        let divider = 4u64 << self.prescaler;
        (self.reload as u64 * divider * 1_000_000 / lsi_hz as u64) as u32
    }
}
