// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! STM32F7 register-level drivers and the [`crate::io`] implementations built on them.

pub mod adc;
pub mod converter;
pub mod panel;
pub mod pins;
pub mod switch_timer;
pub mod watchdog;

pub use adc::SampledPair;
pub use converter::Converter;
pub use panel::Panel;
pub use pins::BoardPins;
pub use switch_timer::{AuxPwm, SwitchTimer};
pub use watchdog::{Iwdg, ResetCause};
