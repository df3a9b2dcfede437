// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Command word decoder.
//!
//! Turns a raw mailbox word into a [`Command`]. Anything that is not a fresh, known,
//! permitted command is reported as a [`ProtocolError`] and must leave state untouched.

use crate::error::ProtocolError;
use crate::protocol::messages::*;

pub struct Parser {
    accept_tuning: bool,
}

impl Parser {
    /// Decoder honouring the `tuning` build feature.
    pub const fn new() -> Self {
        Self {
            accept_tuning: cfg!(feature = "tuning"),
        }
    }

    /// Decoder with the tuning opcode explicitly enabled or disabled.
    pub const fn with_tuning(accept_tuning: bool) -> Self {
        Self { accept_tuning }
    }

    /// Decode one mailbox word.
    pub fn decode(&self, word: u32) -> Result<Command, ProtocolError> {
        if word & FRESH_MASK != FRESH_TAG {
            return Err(ProtocolError::NotFresh(word));
        }

        let field = |shift: u32, mask: u32| ((word >> shift) & mask) as u8;

        match (word & 0x0F) as u8 {
            OP_SET_TARGET => Ok(Command::SetTarget((word >> 16) as u16)),
            OP_SHOW_DIGIT => Ok(Command::ShowDigit(field(16, 0x0F))),
            OP_FADE => Ok(Command::Fade {
                code_a: field(8, 0x0F),
                code_b: field(12, 0x0F),
                t0: field(16, 0xFF),
                t1: field(24, 0xFF),
            }),
            OP_TUNE => {
                if !self.accept_tuning || field(8, 0xFF) != TUNE_KEY {
                    return Err(ProtocolError::TuningLocked);
                }
                Ok(Command::Tune {
                    period: field(16, 0xFF),
                    max_duty: field(24, 0xFF),
                })
            }
            OP_AUX_DUTY => Ok(Command::SetAuxDuty((word >> 16) as u16)),
            op => Err(ProtocolError::UnknownOpcode(op)),
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_tool_target_word() {
        // minichlink -s 0x04 0x01110041
        let p = Parser::with_tuning(false);
        assert_eq!(p.decode(0x0111_0041), Ok(Command::SetTarget(0x0111)));
    }

    #[test]
    fn stale_word_is_rejected() {
        let p = Parser::with_tuning(false);
        // A status word echoed back has a zero low byte.
        assert_eq!(
            p.decode(0x1234_5000),
            Err(ProtocolError::NotFresh(0x1234_5000))
        );
    }

    #[test]
    fn tuning_needs_feature_and_key() {
        let word = Command::Tune {
            period: 160,
            max_duty: 90,
        }
        .to_word();
        assert_eq!(
            Parser::with_tuning(false).decode(word),
            Err(ProtocolError::TuningLocked)
        );
        assert_eq!(
            Parser::with_tuning(true).decode(word),
            Ok(Command::Tune {
                period: 160,
                max_duty: 90
            })
        );
        let unkeyed = word & !0xFF00;
        assert_eq!(
            Parser::with_tuning(true).decode(unkeyed),
            Err(ProtocolError::TuningLocked)
        );
    }
}
