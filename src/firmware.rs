// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! The two execution contexts.
//!
//! [`ControlLoop`] is the body of the conversion-complete interrupt: sample, regulate,
//! actuate, publish, and only then pet the watchdog. [`Console`] is the body of the
//! polling loop: take a host command, apply it to [`Shared`], advance the fade driver and
//! post the status word.
//!
//! Typical wiring:
//!
//! ```ignore
//! // interrupt
//! control.on_conversion_complete(&mut converter, &SHARED);
//!
//! // main
//! loop {
//!     console.poll(&mut panel, &SHARED);
//! }
//! ```

use crate::config::{FadeTiming, Tuning};
use crate::control::regulator::{Regulator, Setpoint};
use crate::display::fade::{DisplayMode, FadeConfig, FadeDriver};
use crate::display::mask::digit_mask;
use crate::io::{ConverterIo, PanelIo};
use crate::protocol::{Command, Parser};
use crate::shared::Shared;
use crate::sync::{SamplePair, TimingOverride};

/// Interrupt-owned control state.
pub struct ControlLoop {
    regulator: Regulator,
    /// Period currently loaded into the switch timer.
    period: u16,
}

impl ControlLoop {
    pub const fn new(tuning: Tuning) -> Self {
        Self {
            regulator: Regulator::new(tuning),
            period: tuning.period,
        }
    }

    /// Program the switch timer with the default period and zero duty, then let the timer
    /// start triggering conversions.
    pub fn start<IO: ConverterIo>(&mut self, io: &mut IO) {
        io.set_switch_period(self.period);
        io.set_switch_duty(0);
        io.start_sampling();
    }

    /// One full control cycle. Returns the duty written to the switch timer.
    pub fn on_conversion_complete<IO: ConverterIo>(&mut self, io: &mut IO, shared: &Shared) -> u16 {
        let sample = SamplePair::new(io.read_feedback_sample(), io.read_reference_sample());

        let timing = shared.timing_override();
        if let Some(t) = timing {
            if t.period != self.period {
                io.set_switch_period(t.period);
                self.period = t.period;
            }
        }

        let setpoint = Setpoint {
            target: shared.target(),
            max_duty_override: timing.map(|t| t.max_duty),
        };
        let duty = self.regulator.step(sample, setpoint);
        io.set_switch_duty(duty);

        shared.publish(self.regulator.feedback_level(), self.regulator.reference_level());
        io.pet_watchdog();
        duty
    }

    #[inline]
    pub fn regulator(&self) -> &Regulator {
        &self.regulator
    }

    #[inline]
    pub fn period(&self) -> u16 {
        self.period
    }
}

/// Polling-loop state: command decoding and the display.
pub struct Console {
    parser: Parser,
    tuning: Tuning,
    fade: FadeDriver,
}

impl Console {
    pub const fn new(tuning: Tuning, fade: FadeTiming) -> Self {
        Self {
            parser: Parser::new(),
            tuning,
            fade: FadeDriver::new(fade),
        }
    }

    /// Replace the decoder (e.g. to force the tuning opcode on or off).
    pub fn with_parser(mut self, parser: Parser) -> Self {
        self.parser = parser;
        self
    }

    /// One pass of the polling loop.
    pub fn poll<IO: PanelIo>(&mut self, io: &mut IO, shared: &Shared) {
        if let Some(word) = io.read_command() {
            match self.parser.decode(word) {
                Ok(cmd) => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("command {}", cmd);
                    self.apply(cmd, io, shared);
                }
                Err(_err) => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("dropped {=u32:#x}: {}", word, _err);
                }
            }
        }

        self.fade.step(io, shared.display());
        io.write_status(shared.status().pack());
    }

    /// Apply a decoded command.
    pub fn apply<IO: PanelIo>(&mut self, cmd: Command, io: &mut IO, shared: &Shared) {
        match cmd {
            Command::SetTarget(target) => shared.set_target(target, self.tuning.max_target),
            Command::ShowDigit(code) => shared.set_display(DisplayMode::Static(digit_mask(code))),
            Command::Fade {
                code_a,
                code_b,
                t0,
                t1,
            } => shared.set_display(DisplayMode::Fade(FadeConfig::new(
                digit_mask(code_a),
                digit_mask(code_b),
                t0,
                t1,
            ))),
            Command::Tune { period, max_duty } => {
                let t = TimingOverride::new(period.into(), max_duty.into(), self.tuning.dead_time);
                #[cfg(feature = "defmt")]
                defmt::info!("timing override: period {} max duty {}", t.period, t.max_duty);
                shared.set_timing_override(t);
            }
            Command::SetAuxDuty(duty) => io.set_aux_duty(duty),
        }
    }

    #[inline]
    pub fn fade(&self) -> &FadeDriver {
        &self.fade
    }
}
