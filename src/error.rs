// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Error types.
//!
//! The control path has no error channel: out-of-range values are clamped. Only the host
//! command decoder reports errors, and those are logged and dropped.

use thiserror::Error;

/// Why a mailbox word was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    #[error("word {0:#010x} is not marked as a fresh command")]
    NotFresh(u32),
    #[error("unknown opcode {0}")]
    UnknownOpcode(u8),
    #[error("tuning opcode rejected (disabled or missing key)")]
    TuningLocked,
}
