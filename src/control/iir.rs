// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Single-pole IIR low-pass filter built from a shift and two adds.
//!
//! `acc ← acc − (acc >> k) + raw`. Under a constant input the accumulator settles at
//! `raw << k`, so the filtered value carries `k` extra bits of scale.

/// Shift IIR filter with time constant `2^k` samples.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IirFilter {
    shift: u8,
    acc: i32,
}

impl IirFilter {
    pub const fn new(shift: u8) -> Self {
        Self { shift, acc: 0 }
    }

    /// Feed one raw sample, returning the new (scaled) accumulator.
    #[inline]
    pub fn update(&mut self, raw: u16) -> i32 {
        self.acc = self.acc - (self.acc >> self.shift) + raw as i32;
        self.acc
    }

    /// Filtered value, scaled by `2^k`.
    #[inline]
    pub fn value(&self) -> i32 {
        self.acc
    }

    /// Filtered value in raw sample units.
    #[inline]
    pub fn output(&self) -> i32 {
        self.acc >> self.shift
    }
}
