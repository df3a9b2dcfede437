// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for STM32F777 MCU for the nixie driver board.

use stm32f7xx_hal::{
    gpio::{gpioa, gpioc, gpiod, Alternate, Analog, Output, PushPull},
    pac,
    prelude::*,
};

/// All board pins. Construct this once at startup using:
///
/// ```ignore
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOC, dp.GPIOD);
/// ```
pub struct BoardPins {
    pub switch: SwitchPins,
    pub sense: SensePins,
    pub digits: DigitPins,
}

/// Flyback switch and auxiliary PWM outputs
pub struct SwitchPins {
    pub gate: gpioa::PA8<Alternate<1>>, // TIM1_CH1
    pub aux: gpioa::PA6<Alternate<2>>,  // TIM3_CH1
}

/// Analog inputs sampled once per switching period
pub struct SensePins {
    pub feedback: gpioa::PA0<Analog>,  // ADC1_IN0, HV divider
    pub reference: gpioa::PA1<Analog>, // ADC1_IN1, 1.2 V reference
}

/// Cathode drivers. Mask bits 0..7 on PC0..PC7, bits 8..15 on PD0..PD7.
pub struct DigitPins {
    pub k0: gpioc::PC0<Output<PushPull>>,
    pub k1: gpioc::PC1<Output<PushPull>>,
    pub k2: gpioc::PC2<Output<PushPull>>,
    pub k3: gpioc::PC3<Output<PushPull>>,
    pub k4: gpioc::PC4<Output<PushPull>>,
    pub k5: gpioc::PC5<Output<PushPull>>,
    pub k6: gpioc::PC6<Output<PushPull>>,
    pub k7: gpioc::PC7<Output<PushPull>>,
    pub k8: gpiod::PD0<Output<PushPull>>,
    pub k9: gpiod::PD1<Output<PushPull>>,
    pub k10: gpiod::PD2<Output<PushPull>>,
    pub k11: gpiod::PD3<Output<PushPull>>,
    pub k12: gpiod::PD4<Output<PushPull>>,
    pub k13: gpiod::PD5<Output<PushPull>>,
    pub k14: gpiod::PD6<Output<PushPull>>,
    pub k15: gpiod::PD7<Output<PushPull>>,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpioc: pac::GPIOC, gpiod: pac::GPIOD) -> Self {
        let gpioa = gpioa.split();
        let gpioc = gpioc.split();
        let gpiod = gpiod.split();

        Self {
            switch: SwitchPins {
                gate: gpioa.pa8.into_alternate::<1>(),
                aux: gpioa.pa6.into_alternate::<2>(),
            },

            sense: SensePins {
                feedback: gpioa.pa0.into_analog(),
                reference: gpioa.pa1.into_analog(),
            },

            digits: DigitPins {
                k0: gpioc.pc0.into_push_pull_output(),
                k1: gpioc.pc1.into_push_pull_output(),
                k2: gpioc.pc2.into_push_pull_output(),
                k3: gpioc.pc3.into_push_pull_output(),
                k4: gpioc.pc4.into_push_pull_output(),
                k5: gpioc.pc5.into_push_pull_output(),
                k6: gpioc.pc6.into_push_pull_output(),
                k7: gpioc.pc7.into_push_pull_output(),
                k8: gpiod.pd0.into_push_pull_output(),
                k9: gpiod.pd1.into_push_pull_output(),
                k10: gpiod.pd2.into_push_pull_output(),
                k11: gpiod.pd3.into_push_pull_output(),
                k12: gpiod.pd4.into_push_pull_output(),
                k13: gpiod.pd5.into_push_pull_output(),
                k14: gpiod.pd6.into_push_pull_output(),
                k15: gpiod.pd7.into_push_pull_output(),
            },
        }
    }
}

/// ADC1 channel numbers matching [`SensePins`].
pub const FEEDBACK_CHANNEL: u8 = 0;
pub const REFERENCE_CHANNEL: u8 = 1;
