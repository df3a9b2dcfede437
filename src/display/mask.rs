// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Digit code → cathode select mask.
//!
//! Bits 7..0 of a mask are port C pins 7..0, bits 15..8 are port D pins 7..0. The tube's
//! cathodes are not wired in order, hence the table.

/// Highest valid digit code.
pub const MAX_DIGIT_CODE: u8 = 12;

/// All cathodes off.
pub const ALL_OFF: u16 = 0;

const MASKS: [u16; MAX_DIGIT_CODE as usize + 1] = [
    ALL_OFF,
    1 << 0, // PC0
    1 << 1, // PC1
    1 << 2, // PC2
    1 << 3, // PC3
    1 << 4, // PC4
    1 << 5, // PC5
    1 << 6, // PC6
    1 << 7, // PC7
    1 << 10, // PD2
    1 << 11, // PD3
    1 << 8, // PD0 (decimal point)
    1 << 15, // PD7 (aux)
];

/// Mask for a digit code. Code 0 and anything above [`MAX_DIGIT_CODE`] select nothing.
#[inline]
pub fn digit_mask(code: u8) -> u16 {
    MASKS.get(usize::from(code)).copied().unwrap_or(ALL_OFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_one_hot_and_distinct() {
        let mut seen = 0u16;
        for code in 1..=MAX_DIGIT_CODE {
            let m = digit_mask(code);
            assert_eq!(m.count_ones(), 1, "code {code}");
            assert_eq!(seen & m, 0, "code {code} reuses a pin");
            seen |= m;
        }
    }

    #[test]
    fn off_and_out_of_range() {
        assert_eq!(digit_mask(0), 0);
        for code in 13..=u8::MAX {
            assert_eq!(digit_mask(code), 0);
        }
    }
}
