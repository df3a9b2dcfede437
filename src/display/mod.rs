// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Nixie digit selection and fading.

pub mod fade;
pub mod mask;

pub use fade::{DisplayMode, FadeConfig, FadeDriver};
pub use mask::digit_mask;
