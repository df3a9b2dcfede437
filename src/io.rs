// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Hardware capabilities the firmware logic depends on.
//!
//! Split by execution context: [`ConverterIo`] is owned by the conversion-complete
//! interrupt, [`PanelIo`] by the polling loop. Neither side ever holds the other's handle.

/// Switch timer, ADC and watchdog. Interrupt context only.
pub trait ConverterIo {
    /// Load the next period's on-time (buffered until the period boundary).
    fn set_switch_duty(&mut self, duty: u16);

    /// Change the switch period (bench tuning).
    fn set_switch_period(&mut self, period: u16);

    /// Arm timer-triggered conversions.
    fn start_sampling(&mut self);

    fn read_feedback_sample(&mut self) -> u16;

    fn read_reference_sample(&mut self) -> u16;

    /// Reload the watchdog.
    fn pet_watchdog(&mut self);
}

/// Host mailbox, auxiliary PWM and digit outputs. Polling loop only.
pub trait PanelIo {
    /// Take the pending command word, if the host has written one.
    fn read_command(&mut self) -> Option<u32>;

    fn write_status(&mut self, status: u32);

    fn set_aux_duty(&mut self, duty: u16);

    /// Drive the digit select outputs.
    fn write_digits(&mut self, mask: u16);

    /// Free-running timestamp (CPU cycles on the target).
    fn timestamp(&self) -> u32;

    fn delay_us(&mut self, us: u32);
}
