// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Polling-loop hardware: host mailbox, digit bus, auxiliary PWM and the cycle counter.
//!
//! The host talks to the firmware through two words in RAM, written and read over the
//! debug probe. The firmware clears [`HOST_COMMAND`] when it takes a command, so the host
//! can tell when a word has been consumed.

use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m::peripheral::DWT;
use stm32f7xx_hal::pac;

use super::switch_timer::AuxPwm;
use crate::io::PanelIo;

/// Command word from the host. Zero when empty.
#[no_mangle]
pub static HOST_COMMAND: AtomicU32 = AtomicU32::new(0);

/// Latest status word for the host.
#[no_mangle]
pub static HOST_STATUS: AtomicU32 = AtomicU32::new(0);

/// Write a 16-bit mask across PC0..PC7 (low byte) and PD0..PD7 (high byte).
///
/// Each port is updated with a single BSRR write, so a port never shows a mix of old and
/// new bits.
fn write_digit_bus(mask: u16) {
    let gpioc = unsafe { &*pac::GPIOC::ptr() };
    let gpiod = unsafe { &*pac::GPIOD::ptr() };

    let bsrr = |byte: u8| u32::from(byte) | u32::from(!byte) << 16;
    gpioc.bsrr.write(|w| unsafe { w.bits(bsrr(mask as u8)) });
    gpiod.bsrr.write(|w| unsafe { w.bits(bsrr((mask >> 8) as u8)) });
}

/// Everything the polling loop touches.
pub struct Panel {
    aux: AuxPwm,
    sysclk_mhz: u32,
}

impl Panel {
    /// The DWT cycle counter must already be running.
    pub fn new(aux: AuxPwm, sysclk_hz: u32) -> Self {
        write_digit_bus(0);
        Self {
            aux,
            sysclk_mhz: sysclk_hz / 1_000_000,
        }
    }
}

impl PanelIo for Panel {
    fn read_command(&mut self) -> Option<u32> {
        match HOST_COMMAND.swap(0, Ordering::AcqRel) {
            0 => None,
            word => Some(word),
        }
    }

    #[inline]
    fn write_status(&mut self, status: u32) {
        HOST_STATUS.store(status, Ordering::Release);
    }

    #[inline]
    fn set_aux_duty(&mut self, duty: u16) {
        self.aux.set_duty(duty);
    }

    #[inline]
    fn write_digits(&mut self, mask: u16) {
        write_digit_bus(mask);
    }

    #[inline]
    fn timestamp(&self) -> u32 {
        DWT::cycle_count()
    }

    fn delay_us(&mut self, us: u32) {
        cortex_m::asm::delay(us.saturating_mul(self.sysclk_mhz));
    }
}
