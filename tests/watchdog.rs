// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Watchdog behaviour against a simulated clock.

use nixiedrive::config::{Tuning, WATCHDOG_TIMEOUT_US};
use nixiedrive::sim::{FirstOrderPlant, SimConverter};
use nixiedrive::watchdog::{IwdgSettings, WatchdogEvent, LSI_HZ};
use nixiedrive::{ControlLoop, Shared};
use rstest::rstest;

const PERIOD_US: u32 = 3;

fn running() -> (ControlLoop, SimConverter, Shared) {
    let shared = Shared::new();
    shared.set_target(150, 208);
    let mut control = ControlLoop::new(Tuning::DEFAULT);
    let mut conv = SimConverter::new(FirstOrderPlant::new(10, 8), 0xF0);
    control.start(&mut conv);
    for _ in 0..10_000 {
        control.on_conversion_complete(&mut conv, &shared);
        assert_eq!(conv.watchdog.advance(PERIOD_US), WatchdogEvent::Running);
    }
    (control, conv, shared)
}

#[test]
fn stalled_loop_resets_after_timeout() {
    let (_, mut conv, _) = running();

    // No more completed cycles: the interrupt has stopped. One period has already
    // elapsed since the last pet.
    let mut stalled = 0;
    while conv.watchdog.advance(PERIOD_US) == WatchdogEvent::Running {
        stalled += 1;
        assert!(stalled < 1_000);
    }
    assert_eq!(stalled + 1, (WATCHDOG_TIMEOUT_US - PERIOD_US).div_ceil(PERIOD_US));
    assert!(conv.watchdog.has_reset());
}

#[test]
fn resumed_loop_cannot_undo_reset() {
    let (mut control, mut conv, shared) = running();
    conv.watchdog.advance(WATCHDOG_TIMEOUT_US);
    control.on_conversion_complete(&mut conv, &shared);
    assert_eq!(conv.watchdog.advance(0), WatchdogEvent::Reset);
}

#[test]
fn slow_loop_within_timeout_survives() {
    let (mut control, mut conv, shared) = running();
    for _ in 0..1_000 {
        control.on_conversion_complete(&mut conv, &shared);
        assert_eq!(conv.watchdog.remaining_us(), WATCHDOG_TIMEOUT_US);
        assert_eq!(
            conv.watchdog.advance(WATCHDOG_TIMEOUT_US - 1),
            WatchdogEvent::Running
        );
    }
}

#[rstest]
#[case(2_000, 0, 16)]
#[case(100_000, 0, 800)]
#[case(1_000_000, 1, 4000)]
#[case(8_000_000, 4, 4000)]
fn iwdg_settings(#[case] timeout_us: u32, #[case] prescaler: u8, #[case] reload: u16) {
    let s = IwdgSettings::for_timeout(timeout_us, LSI_HZ);
    assert_eq!(s, IwdgSettings { prescaler, reload });
    assert_eq!(s.timeout_us(LSI_HZ), timeout_us);
}
