// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! PWM outputs via STM32F7 timers.
//!
//! TIM1 drives the flyback switch and emits TRGO on every update event, which is what
//! starts the ADC's injected conversions. TIM3 drives the auxiliary PWM at full 16-bit
//! resolution. Both use preloaded compare registers, so a new duty takes effect at the
//! next period boundary.

use stm32f7xx_hal::pac;

use crate::sync::SwitchTiming;

/// `CCMRx` output compare: PWM mode 1 with preload.
const OC_PWM1_PRELOAD: u32 = 0b110 << 4 | 1 << 3;
/// `CR2.MMS` = update event as TRGO.
const MMS_UPDATE: u32 = 0b010 << 4;
const CR1_CEN: u32 = 1 << 0;
const CR1_ARPE: u32 = 1 << 7;
const CCER_CC1E: u32 = 1 << 0;
const BDTR_MOE: u32 = 1 << 15;
const EGR_UG: u32 = 1 << 0;

/// Flyback switch on TIM1 CH1.
pub struct SwitchTimer {
    tim: pac::TIM1,
}

impl SwitchTimer {
    /// Configure TIM1 for PWM with the given period, zero duty, counter running.
    pub fn tim1(tim1: pac::TIM1, timing: SwitchTiming) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.tim1en().set_bit());

        let tim = tim1;

        // Disable counter while configuring
        tim.cr1.write(|w| unsafe { w.bits(0) });

        // Count at COUNT_HZ regardless of the core clock
        tim.psc.write(|w| unsafe { w.bits(u32::from(timing.prescaler())) });
        tim.arr.write(|w| unsafe { w.bits(u32::from(timing.auto_reload())) });

        tim.ccmr1_output().write(|w| unsafe { w.bits(OC_PWM1_PRELOAD) });
        tim.ccr1.write(|w| unsafe { w.bits(0) });
        tim.ccer.write(|w| unsafe { w.bits(CCER_CC1E) });

        // Update event triggers the ADC
        tim.cr2.write(|w| unsafe { w.bits(MMS_UPDATE) });

        // Advanced timer: outputs stay off until MOE
        tim.bdtr.write(|w| unsafe { w.bits(BDTR_MOE) });

        // Latch preloads, then run
        tim.egr.write(|w| unsafe { w.bits(EGR_UG) });
        tim.cr1.write(|w| unsafe { w.bits(CR1_ARPE | CR1_CEN) });

        Self { tim }
    }

    /// On-time in timer counts for the next period.
    #[inline]
    pub fn set_duty(&mut self, duty: u16) {
        self.tim.ccr1.write(|w| unsafe { w.bits(u32::from(duty)) });
    }

    /// Counts per period; applied at the next update event.
    #[inline]
    pub fn set_period(&mut self, period: u16) {
        let arr = u32::from(period.saturating_sub(1));
        self.tim.arr.write(|w| unsafe { w.bits(arr) });
    }

    /// Clear the update flag.
    #[inline]
    pub fn clear_update(&mut self) {
        self.tim.sr.modify(|r, w| unsafe { w.bits(r.bits() & !1) });
    }
}

/// Auxiliary PWM on TIM3 CH1, duty in `0..=0xFFFF`.
pub struct AuxPwm {
    tim: pac::TIM3,
}

impl AuxPwm {
    pub fn tim3(tim3: pac::TIM3) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim3en().set_bit());

        let tim = tim3;

        tim.cr1.write(|w| unsafe { w.bits(0) });

        // Auto-reload: max 16-bit
        tim.psc.write(|w| unsafe { w.bits(0) });
        tim.arr.write(|w| unsafe { w.bits(0xFFFF) });

        tim.ccmr1_output().write(|w| unsafe { w.bits(OC_PWM1_PRELOAD) });
        tim.ccr1.write(|w| unsafe { w.bits(0) });
        tim.ccer.write(|w| unsafe { w.bits(CCER_CC1E) });

        tim.egr.write(|w| unsafe { w.bits(EGR_UG) });
        tim.cr1.write(|w| unsafe { w.bits(CR1_ARPE | CR1_CEN) });

        Self { tim }
    }

    #[inline]
    pub fn set_duty(&mut self, duty: u16) {
        self.tim.ccr1.write(|w| unsafe { w.bits(u32::from(duty)) });
    }
}
