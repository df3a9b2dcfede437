// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Independent watchdog (IWDG) and reset-cause readout.
//!
//! Once started the IWDG cannot be stopped; only a reload within the timeout keeps the
//! MCU from resetting.

use stm32f7xx_hal::pac;

use crate::watchdog::IwdgSettings;

const KEY_UNLOCK: u32 = 0x5555;
const KEY_RELOAD: u32 = 0xAAAA;
const KEY_START: u32 = 0xCCCC;
/// `SR.PVU | SR.RVU`
const SR_BUSY: u32 = 0b11;

/// `RCC_CSR` reset flags
const CSR_RMVF: u32 = 1 << 24;
const CSR_IWDGRSTF: u32 = 1 << 29;
const CSR_WWDGRSTF: u32 = 1 << 30;

pub struct Iwdg {
    iwdg: pac::IWDG,
}

impl Iwdg {
    /// Start the watchdog with the given prescaler and reload.
    pub fn start(iwdg: pac::IWDG, settings: IwdgSettings) -> Self {
        // Starting first also turns on the LSI
        iwdg.kr.write(|w| unsafe { w.bits(KEY_START) });
        iwdg.kr.write(|w| unsafe { w.bits(KEY_UNLOCK) });
        iwdg.pr.write(|w| unsafe { w.bits(u32::from(settings.prescaler)) });
        iwdg.rlr.write(|w| unsafe { w.bits(u32::from(settings.reload)) });

        // Wait for the new values to reach the LSI domain
        while iwdg.sr.read().bits() & SR_BUSY != 0 {}

        iwdg.kr.write(|w| unsafe { w.bits(KEY_RELOAD) });

        Self { iwdg }
    }

    #[inline]
    pub fn feed(&mut self) {
        self.iwdg.kr.write(|w| unsafe { w.bits(KEY_RELOAD) });
    }
}

/// Why the MCU last came out of reset, as far as the watchdogs are concerned.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetCause {
    Watchdog,
    Other,
}

impl ResetCause {
    /// Read the reset flags and clear them for the next boot.
    pub fn take() -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        let csr = rcc.csr.read().bits();
        rcc.csr.modify(|r, w| unsafe { w.bits(r.bits() | CSR_RMVF) });

        if csr & (CSR_IWDGRSTF | CSR_WWDGRSTF) != 0 {
            ResetCause::Watchdog
        } else {
            ResetCause::Other
        }
    }
}
