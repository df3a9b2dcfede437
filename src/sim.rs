// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host-side stand-ins for the converter and the panel.
//!
//! [`FirstOrderPlant`] is a first-order lag from duty to feedback sample, which is enough
//! to close the loop and watch it settle. [`SimConverter`] and [`SimPanel`] implement the
//! IO traits on top of it, with a [`Watchdog`] model in place of the IWDG.

use crate::config::WATCHDOG_TIMEOUT_US;
use crate::io::{ConverterIo, PanelIo};
use crate::watchdog::Watchdog;

/// Largest value a 10-bit conversion can return.
pub const ADC_FULL_SCALE: u16 = 1023;

/// First-order lag: `y ← y + (gain·duty − y) / 2^lag_shift` per switching period.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FirstOrderPlant {
    /// Feedback counts per duty count at steady state.
    gain: i32,
    lag_shift: u8,
    /// Output in Q8 feedback counts.
    y_q8: i32,
}

impl FirstOrderPlant {
    pub const fn new(gain: i32, lag_shift: u8) -> Self {
        Self {
            gain,
            lag_shift,
            y_q8: 0,
        }
    }

    /// Advance one period with the switch on for `duty` counts.
    pub fn step(&mut self, duty: u16) {
        let settle_q8 = i32::from(duty) * self.gain * 256;
        self.y_q8 += (settle_q8 - self.y_q8) >> self.lag_shift;
    }

    /// What the feedback ADC reads now.
    pub fn sample(&self) -> u16 {
        (self.y_q8 >> 8).clamp(0, i32::from(ADC_FULL_SCALE)) as u16
    }

    /// Force the output level (feedback counts), e.g. to model a load dump.
    pub fn set_level(&mut self, level: u16) {
        self.y_q8 = i32::from(level) << 8;
    }
}

/// Simulated switch timer + ADC + watchdog.
///
/// Each duty write closes one switching period: the plant is advanced with the new duty
/// and the next conversion sees the result.
#[derive(Debug)]
pub struct SimConverter {
    pub plant: FirstOrderPlant,
    /// Reference sample returned by every conversion.
    pub reference: u16,
    pub duty: u16,
    pub period: u16,
    pub sampling: bool,
    pub watchdog: Watchdog,
    pub duty_writes: u32,
}

impl SimConverter {
    pub fn new(plant: FirstOrderPlant, reference: u16) -> Self {
        Self {
            plant,
            reference,
            duty: 0,
            period: 0,
            sampling: false,
            watchdog: Watchdog::armed(WATCHDOG_TIMEOUT_US),
            duty_writes: 0,
        }
    }
}

impl ConverterIo for SimConverter {
    fn set_switch_duty(&mut self, duty: u16) {
        self.duty = duty;
        self.duty_writes = self.duty_writes.wrapping_add(1);
        self.plant.step(duty);
    }

    fn set_switch_period(&mut self, period: u16) {
        self.period = period;
    }

    fn start_sampling(&mut self) {
        self.sampling = true;
    }

    fn read_feedback_sample(&mut self) -> u16 {
        self.plant.sample()
    }

    fn read_reference_sample(&mut self) -> u16 {
        self.reference
    }

    fn pet_watchdog(&mut self) {
        self.watchdog.pet();
    }
}

/// Simulated host mailbox, aux PWM and digit bus.
///
/// Watches the digit bus for a lit mask being replaced by a different lit mask without an
/// all-off write in between, and for blanks that were not held.
#[derive(Debug, Default)]
pub struct SimPanel {
    /// Pending host word; taken by `read_command`.
    pub inbox: Option<u32>,
    pub status: u32,
    pub status_writes: u32,
    pub aux_duty: u16,
    /// Current bus state.
    pub digits: u16,
    pub digit_writes: u32,
    /// Lit → different lit with no blank in between.
    pub overlaps: u32,
    /// Blank → lit with no hold after the blank.
    pub unheld_blanks: u32,
    /// CPU cycles.
    pub now: u32,
    pub cycles_per_us: u32,
    blank_held_us: u32,
    blanked_from_lit: bool,
}

impl SimPanel {
    pub fn new() -> Self {
        Self {
            cycles_per_us: 48,
            ..Default::default()
        }
    }

    /// Queue a host command word.
    pub fn send(&mut self, word: u32) {
        self.inbox = Some(word);
    }

    /// Advance the free-running timestamp.
    pub fn advance_cycles(&mut self, cycles: u32) {
        self.now = self.now.wrapping_add(cycles);
    }
}

impl PanelIo for SimPanel {
    fn read_command(&mut self) -> Option<u32> {
        self.inbox.take()
    }

    fn write_status(&mut self, status: u32) {
        self.status = status;
        self.status_writes = self.status_writes.wrapping_add(1);
    }

    fn set_aux_duty(&mut self, duty: u16) {
        self.aux_duty = duty;
    }

    fn write_digits(&mut self, mask: u16) {
        if mask != 0 {
            if self.digits != 0 && self.digits != mask {
                self.overlaps += 1;
            }
            if self.digits == 0 && self.blanked_from_lit && self.blank_held_us == 0 {
                self.unheld_blanks += 1;
            }
            self.blanked_from_lit = false;
        } else {
            self.blanked_from_lit = self.digits != 0;
            self.blank_held_us = 0;
        }
        self.digits = mask;
        self.digit_writes = self.digit_writes.wrapping_add(1);
    }

    fn timestamp(&self) -> u32 {
        self.now
    }

    fn delay_us(&mut self, us: u32) {
        if self.digits == 0 {
            self.blank_held_us = self.blank_held_us.saturating_add(us);
        }
        self.advance_cycles(us.saturating_mul(self.cycles_per_us));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plant_settles_at_gain_times_duty() {
        let mut p = FirstOrderPlant::new(10, 4);
        for _ in 0..2000 {
            p.step(30);
        }
        // truncating lag stops just short of the ideal level
        assert!((299..=300).contains(&p.sample()), "{}", p.sample());
    }

    #[test]
    fn plant_saturates_at_full_scale() {
        let mut p = FirstOrderPlant::new(100, 2);
        for _ in 0..500 {
            p.step(100);
        }
        assert_eq!(p.sample(), ADC_FULL_SCALE);
    }

    #[test]
    fn panel_flags_direct_swap() {
        let mut panel = SimPanel::new();
        panel.write_digits(0x01);
        panel.write_digits(0x02);
        assert_eq!(panel.overlaps, 1);
    }
}
