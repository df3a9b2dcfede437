// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Timer-triggered ADC sampling for STM32F7 using direct PAC register access.
//!
//! ADC1's injected group converts two channels (feedback, then reference) on every
//! TIM1 update event, so both samples are taken at the same point of every switching
//! period. The end of the injected sequence raises the `ADC` interrupt.

use stm32f7xx_hal::pac;

/// `CR1.RES` for 10-bit results.
const RES_10BIT: u32 = 0b01;
/// `CR2.JEXTSEL` for TIM1 TRGO.
const JEXTSEL_TIM1_TRGO: u32 = 0b0000;
/// `CR2.JEXTEN` for a rising-edge trigger.
const JEXTEN_RISING: u32 = 0b01;
/// 15-cycle sample time.
const SMP_15: u32 = 0b001;

const CR1_JEOCIE: u32 = 1 << 7;
const CR1_SCAN: u32 = 1 << 8;
const CR2_ADON: u32 = 1 << 0;
const SR_JEOC: u32 = 1 << 2;
const SR_JSTRT: u32 = 1 << 3;

/// Two-channel injected sampler on ADC1.
pub struct SampledPair {
    adc: pac::ADC1,
}

impl SampledPair {
    /// Power up ADC1 and configure the injected pair. Triggers stay disabled until
    /// [`SampledPair::arm`].
    pub fn adc1(adc1: pac::ADC1, first: u8, second: u8) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.adc1en().set_bit());

        // ADC prescaler: PCLK2 / 4 (96 MHz → 24 MHz)
        let common = unsafe { &*pac::ADC_COMMON::ptr() };
        common.ccr.modify(|_, w| w.adcpre().div4());

        let adc = adc1;

        // Power off to configure
        adc.cr2.modify(|_, w| w.adon().clear_bit());

        // 10-bit, scan the injected group, interrupt at its end
        adc.cr1
            .write(|w| unsafe { w.bits(RES_10BIT << 24 | CR1_SCAN | CR1_JEOCIE) });

        // Short sample time on both channels
        adc.smpr2.modify(|r, w| unsafe {
            let mut bits = r.bits();
            for ch in [first, second] {
                let shift = 3 * u32::from(ch);
                bits = bits & !(0b111 << shift) | SMP_15 << shift;
            }
            w.bits(bits)
        });

        // JL = 1 (two conversions) runs JSQ3 then JSQ4
        adc.jsqr.write(|w| unsafe {
            w.bits(1 << 20 | u32::from(second & 0x1F) << 15 | u32::from(first & 0x1F) << 10)
        });

        adc.cr2.write(|w| unsafe { w.bits(JEXTSEL_TIM1_TRGO << 16 | CR2_ADON) });

        Self { adc }
    }

    /// Let TIM1 start conversions.
    pub fn arm(&mut self) {
        self.adc
            .cr2
            .modify(|r, w| unsafe { w.bits(r.bits() & !(0b11 << 20) | JEXTEN_RISING << 20) });
    }

    /// Result of the first conversion in the sequence.
    #[inline]
    pub fn first(&self) -> u16 {
        self.adc.jdr1.read().bits() as u16
    }

    /// Result of the second conversion in the sequence.
    #[inline]
    pub fn second(&self) -> u16 {
        self.adc.jdr2.read().bits() as u16
    }

    /// Acknowledge end of the injected sequence.
    #[inline]
    pub fn clear_pending(&mut self) {
        self.adc
            .sr
            .modify(|r, w| unsafe { w.bits(r.bits() & !(SR_JEOC | SR_JSTRT)) });
    }
}
