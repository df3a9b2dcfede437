// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Two-level brightness fade between digits.
//!
//! An 8-bit phase sweeps 0..=255 and selects `mask_a` below `t0`, `mask_b` below `t1`
//! and nothing above. The phase comes from a free-running timestamp, bit-rotated so the
//! outputs toggle many times per sweep instead of once: every phase value is still visited
//! exactly once per 256 ticks, but the visible flicker frequency is far higher.
//!
//! The driver runs from the polling loop and never touches controller state. Between two
//! different masks it blanks the bus for a few microseconds so two cathodes are never on
//! together.

use crate::config::FadeTiming;
use crate::display::mask::ALL_OFF;
use crate::io::PanelIo;

/// Two-level fade configuration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FadeConfig {
    pub mask_a: u16,
    pub mask_b: u16,
    pub t0: u8,
    pub t1: u8,
}

impl FadeConfig {
    /// Build a config; `t1` is raised to `t0` if given out of order.
    pub fn new(mask_a: u16, mask_b: u16, t0: u8, t1: u8) -> Self {
        Self {
            mask_a,
            mask_b,
            t0,
            t1: t1.max(t0),
        }
    }

    /// Mask to drive at `phase`.
    #[inline]
    pub fn evaluate(&self, phase: u8) -> u16 {
        if phase < self.t0 {
            self.mask_a
        } else if phase < self.t1 {
            self.mask_b
        } else {
            ALL_OFF
        }
    }
}

/// What the digit bus should show.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayMode {
    /// One mask, always on (or all off).
    Static(u16),
    /// Dithered two-level fade.
    Fade(FadeConfig),
}

impl DisplayMode {
    #[inline]
    pub fn mask_at(&self, phase: u8) -> u16 {
        match self {
            DisplayMode::Static(mask) => *mask,
            DisplayMode::Fade(cfg) => cfg.evaluate(phase),
        }
    }
}

impl Default for DisplayMode {
    fn default() -> Self {
        DisplayMode::Static(ALL_OFF)
    }
}

/// Fade phase for a timestamp.
#[inline]
pub fn dither_phase(timestamp: u32, timing: &FadeTiming) -> u8 {
    let counter = (timestamp >> timing.tick_shift) as u8;
    counter.rotate_left(timing.dither_rotate)
}

/// Applies display masks to the digit bus with an off-gap on every change.
#[derive(Debug)]
pub struct FadeDriver {
    timing: FadeTiming,
    last_applied: u16,
}

impl FadeDriver {
    pub const fn new(timing: FadeTiming) -> Self {
        Self {
            timing,
            last_applied: ALL_OFF,
        }
    }

    /// Evaluate `mode` at the current timestamp and drive the result.
    pub fn step<IO: PanelIo>(&mut self, io: &mut IO, mode: DisplayMode) {
        let phase = dither_phase(io.timestamp(), &self.timing);
        self.apply(io, mode.mask_at(phase));
    }

    /// Drive `mask`, blanking first if something else is lit.
    pub fn apply<IO: PanelIo>(&mut self, io: &mut IO, mask: u16) {
        if mask == self.last_applied {
            return;
        }

        if self.last_applied != ALL_OFF {
            io.write_digits(ALL_OFF);
            io.delay_us(self.timing.off_gap_us);
        }
        if mask != ALL_OFF {
            io.write_digits(mask);
        }
        self.last_applied = mask;
    }

    #[inline]
    pub fn last_applied(&self) -> u16 {
        self.last_applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_thresholds() {
        let cfg = FadeConfig::new(0x01, 0x02, 10, 50);
        assert_eq!(cfg.evaluate(5), 0x01);
        assert_eq!(cfg.evaluate(9), 0x01);
        assert_eq!(cfg.evaluate(10), 0x02);
        assert_eq!(cfg.evaluate(30), 0x02);
        assert_eq!(cfg.evaluate(50), 0);
        assert_eq!(cfg.evaluate(60), 0);
    }

    #[test]
    fn out_of_order_thresholds() {
        let cfg = FadeConfig::new(0x01, 0x02, 80, 20);
        assert_eq!(cfg.t1, 80);
        assert_eq!(cfg.evaluate(79), 0x01);
        assert_eq!(cfg.evaluate(80), 0);
    }

    #[test]
    fn dither_visits_every_phase_once_per_sweep() {
        let timing = FadeTiming::DEFAULT;
        let mut seen = [false; 256];
        for step in 0u32..256 {
            let phase = dither_phase(step << timing.tick_shift, &timing);
            assert!(!seen[phase as usize]);
            seen[phase as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn dither_toggles_faster_than_plain_counter() {
        // 50 % split: a plain counter crosses t0 twice per sweep.
        let timing = FadeTiming::DEFAULT;
        let cfg = FadeConfig::new(0x01, 0x02, 128, 255);
        let mut changes = 0;
        let mut last = cfg.evaluate(dither_phase(0, &timing));
        for step in 1u32..256 {
            let m = cfg.evaluate(dither_phase(step << timing.tick_shift, &timing));
            if m != last {
                changes += 1;
            }
            last = m;
        }
        assert!(changes > 16, "only {changes} transitions");
    }
}
