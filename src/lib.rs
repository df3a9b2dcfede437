// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # nixiedrive Firmware
//!
//! Firmware for a nixie tube driver board: a flyback converter raises the 3.3–5 V supply
//! to a regulated high-voltage rail (up to ~190 V), and the tube's cathodes are switched
//! with dithered two-level fading. Targets an STM32F777 MCU.
//!
//! The regulation loop runs entirely inside the ADC conversion-complete interrupt, in
//! lock-step with the converter's switching period, using only shifts, adds and one
//! software multiply. Everything except the `hw` layer is plain `no_std` logic and is
//! tested on the host.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`config`] | Tuning constants and their real-number meaning |
//! | [`control`] | Fixed-point math, IIR filter, PID, supply compensation, regulator |
//! | [`sync`] | Switching period and per-period sample pair |
//! | [`display`] | Digit masks and the fade driver |
//! | [`protocol`] | Host command and status words |
//! | [`shared`] | Lock-free state shared by interrupt and polling loop |
//! | [`io`] | Hardware capability traits |
//! | [`firmware`] | Interrupt body and polling-loop body |
//! | [`watchdog`] | Watchdog model and IWDG settings |
//! | [`sim`] | Plant model and simulated IO for host tests |
//! | `hw` | STM32F7 register-level drivers (feature `hardware`) |
//!
//! ## Getting Started
//!
//! Run the host tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --target thumbv7em-none-eabihf --features hardware
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod control;
pub mod display;
pub mod error;
pub mod firmware;
pub mod io;
pub mod protocol;
pub mod shared;
pub mod sim;
pub mod sync;
pub mod watchdog;

#[cfg(feature = "hardware")]
pub mod hw;

pub use config::Tuning;
pub use error::ProtocolError;
pub use firmware::{Console, ControlLoop};
pub use shared::Shared;
