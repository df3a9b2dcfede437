// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host mailbox word layout.
//!
//! The host writes one 32-bit command word; bits[7:4] == 0x4 marks it fresh and
//! bits[3:0] is the opcode. The firmware answers with a status word carrying the filtered
//! feedback and reference levels.

/// Bits that must equal [`FRESH_TAG`] for a word to be a command.
pub const FRESH_MASK: u32 = 0xF0;
pub const FRESH_TAG: u32 = 0x40;

// Opcodes
pub const OP_SET_TARGET: u8 = 1;
pub const OP_SHOW_DIGIT: u8 = 2;
pub const OP_FADE: u8 = 3;
pub const OP_TUNE: u8 = 4;
pub const OP_AUX_DUTY: u8 = 5;

/// Required in bits[15:8] of an [`OP_TUNE`] word.
pub const TUNE_KEY: u8 = 0xAA;

/// Decoded host command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Requested rail level (clamped on apply).
    SetTarget(u16),
    /// Stop fading and light one digit code.
    ShowDigit(u8),
    /// Fade between two digit codes.
    Fade { code_a: u8, code_b: u8, t0: u8, t1: u8 },
    /// Override period and duty ceiling.
    Tune { period: u8, max_duty: u8 },
    /// Auxiliary PWM compare value.
    SetAuxDuty(u16),
}

impl Command {
    /// Encode as a fresh mailbox word.
    pub fn to_word(self) -> u32 {
        let (op, payload) = match self {
            Command::SetTarget(v) => (OP_SET_TARGET, (v as u32) << 16),
            Command::ShowDigit(code) => (OP_SHOW_DIGIT, ((code & 0x0F) as u32) << 16),
            Command::Fade {
                code_a,
                code_b,
                t0,
                t1,
            } => (
                OP_FADE,
                ((code_a & 0x0F) as u32) << 8
                    | ((code_b & 0x0F) as u32) << 12
                    | (t0 as u32) << 16
                    | (t1 as u32) << 24,
            ),
            Command::Tune { period, max_duty } => (
                OP_TUNE,
                (TUNE_KEY as u32) << 8 | (period as u32) << 16 | (max_duty as u32) << 24,
            ),
            Command::SetAuxDuty(v) => (OP_AUX_DUTY, (v as u32) << 16),
        };
        payload | FRESH_TAG | op as u32
    }
}

/// Status word: bits[21:12] filtered feedback, bits[31:22] filtered reference, both in
/// raw sample units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    pub feedback: u16,
    pub reference: u16,
}

impl Status {
    const FIELD: u32 = 0x3FF;
    const FEEDBACK_POS: u32 = 12;
    const REFERENCE_POS: u32 = 22;

    pub fn pack(&self) -> u32 {
        ((self.feedback as u32) & Self::FIELD) << Self::FEEDBACK_POS
            | ((self.reference as u32) & Self::FIELD) << Self::REFERENCE_POS
    }

    pub fn unpack(word: u32) -> Self {
        Self {
            feedback: ((word >> Self::FEEDBACK_POS) & Self::FIELD) as u16,
            reference: ((word >> Self::REFERENCE_POS) & Self::FIELD) as u16,
        }
    }
}
