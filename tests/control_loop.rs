// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Closed-loop runs of the control interrupt against the simulated plant.

use nixiedrive::config::Tuning;
use nixiedrive::control::compensation::compensated_target_for;
use nixiedrive::io::ConverterIo;
use nixiedrive::protocol::Status;
use nixiedrive::sim::{FirstOrderPlant, SimConverter};
use nixiedrive::sync::TimingOverride;
use nixiedrive::watchdog::WatchdogEvent;
use nixiedrive::{ControlLoop, Shared};
use proptest::prelude::*;
use rstest::rstest;

/// One switching period at the default timing, rounded up.
const PERIOD_US: u32 = 3;

fn closed_loop(target: u16, reference: u16, cycles: u32) -> (ControlLoop, SimConverter, Shared) {
    let shared = Shared::new();
    shared.set_target(target, Tuning::DEFAULT.max_target);

    let mut control = ControlLoop::new(Tuning::DEFAULT);
    let mut conv = SimConverter::new(FirstOrderPlant::new(10, 8), reference);
    control.start(&mut conv);

    for _ in 0..cycles {
        control.on_conversion_complete(&mut conv, &shared);
        assert_eq!(conv.watchdog.advance(PERIOD_US), WatchdogEvent::Running);
    }
    (control, conv, shared)
}

#[rstest]
#[case(150, 0xF0)]
#[case(100, 0xF0)]
#[case(192, 0xF0)]
#[case(150, 0x175)]
#[case(100, 0x175)]
fn settles_on_compensated_target(#[case] target: u16, #[case] reference: u16) {
    let (control, conv, _) = closed_loop(target, reference, 50_000);
    let reg = control.regulator();

    // Mostly proportional: a small positive offset remains, within 1/32 of the setpoint.
    let error = reg.compensated_target() - reg.filtered_feedback();
    assert!(
        error.abs() * 32 <= reg.compensated_target(),
        "target {target} ref {reference:#x}: error {error}"
    );
    assert_eq!(reg.integral(), reg.integral_bounds().1);
    assert!(conv.duty <= reg.max_duty());
    assert!(reg.duty() > 0);
}

#[test]
fn start_programs_timer_before_sampling() {
    let mut control = ControlLoop::new(Tuning::DEFAULT);
    let mut conv = SimConverter::new(FirstOrderPlant::new(10, 8), 0xF0);
    assert!(!conv.sampling);

    control.start(&mut conv);
    assert!(conv.sampling);
    assert_eq!(conv.period, 140);
    assert_eq!(conv.duty, 0);
}

#[test]
fn lower_supply_raises_feedback_setpoint() {
    let t = Tuning::DEFAULT;
    let at_5v = compensated_target_for(0xF0 << 2, 150, &t);
    let at_3v3 = compensated_target_for(0x175 << 2, 150, &t);
    assert!(at_3v3 > at_5v);

    // Both runs reach their own setpoint.
    let (a, _, _) = closed_loop(150, 0xF0, 50_000);
    let (b, _, _) = closed_loop(150, 0x175, 50_000);
    assert!(b.regulator().feedback_level() > a.regulator().feedback_level());
}

#[test]
fn status_reflects_filtered_levels() {
    let (control, _, shared) = closed_loop(150, 0xF0, 5_000);
    let status = shared.status();
    assert_eq!(status.feedback, control.regulator().feedback_level());
    assert_eq!(status.reference, 0xF0);
    assert_eq!(
        i32::from(status.reference),
        control.regulator().filtered_reference() >> Tuning::DEFAULT.reference_shift
    );
    assert_eq!(Status::unpack(status.pack()), status);
    assert_eq!(shared.cycles(), 5_000);
}

#[test]
fn target_change_mid_run_is_tracked() {
    let (mut control, mut conv, shared) = closed_loop(100, 0xF0, 30_000);
    shared.set_target(180, Tuning::DEFAULT.max_target);
    for _ in 0..50_000 {
        control.on_conversion_complete(&mut conv, &shared);
    }
    let reg = control.regulator();
    let error = reg.compensated_target() - reg.filtered_feedback();
    assert!(error.abs() * 32 <= reg.compensated_target(), "error {error}");
}

#[test]
fn load_dump_drops_duty_to_zero() {
    let (mut control, mut conv, shared) = closed_loop(150, 0xF0, 30_000);
    // Rail far above target: plant output is negative, duty clamps at zero.
    let mut duty = u16::MAX;
    for _ in 0..8 {
        conv.plant.set_level(1000);
        duty = control.on_conversion_complete(&mut conv, &shared);
    }
    assert_eq!(duty, 0);
}

#[test]
fn timing_override_applies_period_and_ceiling() {
    let (mut control, mut conv, shared) = closed_loop(200, 0x175, 1_000);
    let t = TimingOverride::new(160, 30, Tuning::DEFAULT.dead_time);
    shared.set_timing_override(t);

    for _ in 0..1_000 {
        let duty = control.on_conversion_complete(&mut conv, &shared);
        assert!(duty <= 30);
    }
    assert_eq!(conv.period, 160);
    assert_eq!(control.period(), 160);
    assert_eq!(control.regulator().max_duty(), 30);
}

/// Records the order of hardware accesses within one cycle.
#[derive(Default)]
struct Recorder {
    events: Vec<&'static str>,
}

impl ConverterIo for Recorder {
    fn set_switch_duty(&mut self, _duty: u16) {
        self.events.push("duty");
    }
    fn set_switch_period(&mut self, _period: u16) {
        self.events.push("period");
    }
    fn start_sampling(&mut self) {
        self.events.push("start");
    }
    fn read_feedback_sample(&mut self) -> u16 {
        self.events.push("feedback");
        200
    }
    fn read_reference_sample(&mut self) -> u16 {
        self.events.push("reference");
        0xF0
    }
    fn pet_watchdog(&mut self) {
        self.events.push("pet");
    }
}

#[test]
fn watchdog_is_petted_last() {
    let shared = Shared::new();
    shared.set_target(150, 208);
    let mut control = ControlLoop::new(Tuning::DEFAULT);
    let mut io = Recorder::default();

    control.on_conversion_complete(&mut io, &shared);
    assert_eq!(io.events, ["feedback", "reference", "duty", "pet"]);
    assert_eq!(shared.cycles(), 1);
}

proptest! {
    #[test]
    fn duty_never_exceeds_ceiling(
        samples in prop::collection::vec((0u16..1024, 0u16..1024), 1..400),
        target in any::<u16>(),
    ) {
        let shared = Shared::new();
        shared.set_target(target, Tuning::DEFAULT.max_target);
        let mut control = ControlLoop::new(Tuning::DEFAULT);

        for (feedback, reference) in samples {
            let mut conv = SimConverter::new(FirstOrderPlant::new(0, 0), reference);
            conv.plant.set_level(feedback);
            let duty = control.on_conversion_complete(&mut conv, &shared);
            prop_assert!(duty <= control.regulator().max_duty());
            prop_assert!(duty <= Tuning::DEFAULT.duty_ceiling());

            let (lo, hi) = control.regulator().integral_bounds();
            let integral = control.regulator().integral();
            prop_assert!(lo <= integral && integral <= hi);
        }
    }
}
