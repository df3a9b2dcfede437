// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! State shared between the control interrupt and the polling loop.
//!
//! No locks: every field has exactly one writer and word-sized atomic loads/stores are
//! the only synchronization. Multi-word updates (the fade configuration) may be observed
//! half-written for one fade sweep, which shows up as a flicker at most.
//!
//! | Field | Writer | Reader |
//! | ----- | ------ | ------ |
//! | target, timing override | polling loop | interrupt |
//! | display mode | polling loop | fade driver |
//! | feedback/reference levels, cycle count | interrupt | polling loop |

use core::sync::atomic::{AtomicU16, AtomicU32, Ordering};

use crate::display::fade::{DisplayMode, FadeConfig};
use crate::protocol::Status;
use crate::sync::TimingOverride;

const FADE_FLAG: u32 = 1 << 16;

pub struct Shared {
    target: AtomicU16,
    /// `period | max_duty << 16`, zero when not overridden
    timing_override: AtomicU32,
    /// `mask_a | mask_b << 16`
    display_masks: AtomicU32,
    /// `t0 | t1 << 8 | FADE_FLAG`
    display_thresholds: AtomicU32,
    feedback_level: AtomicU16,
    reference_level: AtomicU16,
    cycles: AtomicU32,
}

impl Shared {
    pub const fn new() -> Self {
        Self {
            target: AtomicU16::new(0),
            timing_override: AtomicU32::new(0),
            display_masks: AtomicU32::new(0),
            display_thresholds: AtomicU32::new(0),
            feedback_level: AtomicU16::new(0),
            reference_level: AtomicU16::new(0),
            cycles: AtomicU32::new(0),
        }
    }

    // ----- written by the polling loop -----

    /// Store `min(target, max_target)`.
    pub fn set_target(&self, target: u16, max_target: u16) {
        self.target.store(target.min(max_target), Ordering::Relaxed);
    }

    pub fn target(&self) -> u16 {
        self.target.load(Ordering::Relaxed)
    }

    pub fn set_timing_override(&self, timing: TimingOverride) {
        let word = timing.period as u32 | (timing.max_duty as u32) << 16;
        self.timing_override.store(word, Ordering::Relaxed);
    }

    pub fn timing_override(&self) -> Option<TimingOverride> {
        let word = self.timing_override.load(Ordering::Relaxed);
        if word == 0 {
            return None;
        }
        Some(TimingOverride {
            period: word as u16,
            max_duty: (word >> 16) as u16,
        })
    }

    /// Publish a new display mode. Masks first, then thresholds and the mode flag.
    pub fn set_display(&self, mode: DisplayMode) {
        let (masks, thresholds) = match mode {
            DisplayMode::Static(mask) => (mask as u32, 0),
            DisplayMode::Fade(cfg) => (
                cfg.mask_a as u32 | (cfg.mask_b as u32) << 16,
                cfg.t0 as u32 | (cfg.t1 as u32) << 8 | FADE_FLAG,
            ),
        };
        self.display_masks.store(masks, Ordering::Release);
        self.display_thresholds.store(thresholds, Ordering::Release);
    }

    pub fn display(&self) -> DisplayMode {
        let thresholds = self.display_thresholds.load(Ordering::Acquire);
        let masks = self.display_masks.load(Ordering::Acquire);
        if thresholds & FADE_FLAG == 0 {
            return DisplayMode::Static(masks as u16);
        }
        DisplayMode::Fade(FadeConfig {
            mask_a: masks as u16,
            mask_b: (masks >> 16) as u16,
            t0: thresholds as u8,
            t1: (thresholds >> 8) as u8,
        })
    }

    // ----- written by the interrupt -----

    /// Publish filtered levels and count one completed control cycle.
    pub fn publish(&self, feedback: u16, reference: u16) {
        self.feedback_level.store(feedback, Ordering::Relaxed);
        self.reference_level.store(reference, Ordering::Relaxed);
        self.cycles
            .store(self.cycles.load(Ordering::Relaxed).wrapping_add(1), Ordering::Relaxed);
    }

    pub fn status(&self) -> Status {
        Status {
            feedback: self.feedback_level.load(Ordering::Relaxed),
            reference: self.reference_level.load(Ordering::Relaxed),
        }
    }

    /// Completed control cycles since reset (wraps).
    pub fn cycles(&self) -> u32 {
        self.cycles.load(Ordering::Relaxed)
    }
}

impl Default for Shared {
    fn default() -> Self {
        Self::new()
    }
}
