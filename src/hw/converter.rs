// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Interrupt-side hardware: switch timer, injected ADC pair and the IWDG.

use super::adc::SampledPair;
use super::switch_timer::SwitchTimer;
use super::watchdog::Iwdg;
use crate::io::ConverterIo;

/// Owned by the `ADC` interrupt. The injected sequence converts feedback first, then the
/// reference.
pub struct Converter {
    switch: SwitchTimer,
    adc: SampledPair,
    iwdg: Iwdg,
}

impl Converter {
    pub fn new(switch: SwitchTimer, adc: SampledPair, iwdg: Iwdg) -> Self {
        Self { switch, adc, iwdg }
    }

    /// Acknowledge the conversion-complete interrupt.
    #[inline]
    pub fn acknowledge(&mut self) {
        self.adc.clear_pending();
    }
}

impl ConverterIo for Converter {
    #[inline]
    fn set_switch_duty(&mut self, duty: u16) {
        self.switch.set_duty(duty);
    }

    #[inline]
    fn set_switch_period(&mut self, period: u16) {
        self.switch.set_period(period);
    }

    fn start_sampling(&mut self) {
        self.switch.clear_update();
        self.adc.arm();
    }

    #[inline]
    fn read_feedback_sample(&mut self) -> u16 {
        self.adc.first()
    }

    #[inline]
    fn read_reference_sample(&mut self) -> u16 {
        self.adc.second()
    }

    #[inline]
    fn pet_watchdog(&mut self) {
        self.iwdg.feed();
    }
}
