// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Algorithms
//!
//! Building blocks for the high-voltage regulation loop. Nothing here multiplies or
//! divides at runtime except [`fixed::soft_mul`].
//!
//! ## Modules
//!
//! - [`fixed`] - Shift-series division and software multiply.
//! - [`iir`] - Single-pole shift IIR filter.
//! - [`pid`] - PID controller with shift gains and anti-windup.
//! - [`compensation`] - Supply-voltage scaling of the target and duty ceiling.
//! - [`regulator`] - The complete per-interrupt control cycle.

pub mod compensation;
pub mod fixed;
pub mod iir;
pub mod pid;
pub mod regulator;

pub use iir::IirFilter;
pub use pid::ShiftPid;
pub use regulator::{Regulator, Setpoint};
