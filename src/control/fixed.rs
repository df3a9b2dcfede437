// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Integer arithmetic for a core without a fast multiply or any divide.
//!
//! Division by an awkward constant is written as a short sum of right shifts, e.g.
//! `x / 4.43 ≈ (x >> 2) − (x >> 6) − (x >> 7)`. The one product that cannot be avoided
//! goes through [`soft_mul`].

/// One term of a shift series.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShiftTerm {
    /// `+ (x >> n)`
    Add(u8),
    /// `− (x >> n)`
    Sub(u8),
}

impl ShiftTerm {
    #[inline]
    const fn shift(self) -> u8 {
        match self {
            ShiftTerm::Add(n) | ShiftTerm::Sub(n) => n,
        }
    }
}

/// Sum of shifted copies of `x`, every shift increased by `extra`.
///
/// `extra` folds in the scale of an IIR-filtered input so the series can be written in
/// terms of the raw sample. Shifts of 32 or more contribute zero.
pub fn shift_series(x: u32, terms: &[ShiftTerm], extra: u8) -> i32 {
    let mut acc: i32 = 0;
    for term in terms {
        let n = u32::from(term.shift()) + u32::from(extra);
        let part = x.checked_shr(n).unwrap_or(0) as i32;
        acc = match term {
            ShiftTerm::Add(_) => acc.wrapping_add(part),
            ShiftTerm::Sub(_) => acc.wrapping_sub(part),
        };
    }
    acc
}

/// The real factor a series approximates, in Q16.
///
/// `TARGET_SERIES` reads back as 560 (≈ 65536 / 117.0).
pub fn series_factor_q16(terms: &[ShiftTerm]) -> i32 {
    shift_series(1 << 16, terms, 0)
}

/// Shift-and-add multiply.
///
/// Walks the bits of the smaller operand so the loop runs at most as many times as that
/// operand has significant bits. The product of two `u16` always fits in `u32`.
pub fn soft_mul(a: u16, b: u16) -> u32 {
    let (mut small, mut big) = if a < b {
        (a as u32, b as u32)
    } else {
        (b as u32, a as u32)
    };

    let mut acc = 0u32;
    while small != 0 {
        if small & 1 != 0 {
            acc += big;
        }
        small >>= 1;
        big <<= 1;
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MAX_DUTY_SERIES, TARGET_SERIES};

    #[test]
    fn soft_mul_edges() {
        assert_eq!(soft_mul(0, 0), 0);
        assert_eq!(soft_mul(0, u16::MAX), 0);
        assert_eq!(soft_mul(1, u16::MAX), 65_535);
        assert_eq!(soft_mul(u16::MAX, u16::MAX), 4_294_836_225);
        assert_eq!(soft_mul(208, 1492), 310_336);
    }

    #[test]
    fn series_matches_hand_expansion() {
        let x = 1492u32;
        let expected = (x >> 4) as i32 - (x >> 8) as i32 - (x >> 9) as i32;
        assert_eq!(shift_series(x, MAX_DUTY_SERIES, 2), expected);
    }

    #[test]
    fn oversized_shift_is_zero() {
        assert_eq!(shift_series(u32::MAX, &[ShiftTerm::Add(30)], 4), 0);
    }

    #[test]
    fn factors_read_back() {
        // 1/4 − 1/64 − 1/128 = 0.2265625
        assert_eq!(series_factor_q16(MAX_DUTY_SERIES), 14_848);
        // 1/128 + 1/2048 + 1/4096
        assert_eq!(series_factor_q16(TARGET_SERIES), 560);
    }
}
