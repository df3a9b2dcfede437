// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![no_main]
#![no_std]

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m::interrupt::Mutex;
use cortex_m::peripheral::{DWT, NVIC};
use cortex_m_rt::entry;
use defmt_rtt as _;
use panic_halt as _;

use stm32f7xx_hal::{pac, pac::interrupt, prelude::*};

use nixiedrive::config::{FadeTiming, Tuning, WATCHDOG_TIMEOUT_US};
use nixiedrive::hw::{
    pins, AuxPwm, BoardPins, Converter, Iwdg, Panel, ResetCause, SampledPair, SwitchTimer,
};
use nixiedrive::sync::SwitchTiming;
use nixiedrive::watchdog::{IwdgSettings, LSI_HZ};
use nixiedrive::{Console, ControlLoop, Shared};

const TUNING: Tuning = Tuning::DEFAULT;

/// Core clock. The switch timer is prescaled back to 48 MHz counts, so at 192 MHz the
/// control interrupt gets 560 core cycles per 140-count period instead of 140.
/// `ADC_CYCLES_MAX` records the worst case actually seen.
const SYSCLK_HZ: u32 = 192_000_000;
/// APB2 at half the core clock; TIM1 is clocked at twice this, i.e. `SYSCLK_HZ`.
const PCLK2_HZ: u32 = 96_000_000;

/// DWT counter at 4× the 48 MHz the fade timing is specified for.
const FADE: FadeTiming = FadeTiming {
    tick_shift: FadeTiming::DEFAULT.tick_shift + 2,
    ..FadeTiming::DEFAULT
};

static SHARED: Shared = Shared::new();

/// Longest `ADC` interrupt body seen, in core cycles.
static ADC_CYCLES_MAX: AtomicU32 = AtomicU32::new(0);

/// Owned by the `ADC` interrupt once `main` hands it over.
static CONTROL: Mutex<RefCell<Option<(ControlLoop, Converter)>>> = Mutex::new(RefCell::new(None));

#[entry]
fn main() -> ! {
    // Peripherals
    let (Some(dp), Some(mut cp)) = (pac::Peripherals::take(), cortex_m::Peripherals::take())
    else {
        loop {
            cortex_m::asm::wfi();
        }
    };

    defmt::info!("nixiedrive {}", env!("CARGO_PKG_VERSION"));
    let cause = ResetCause::take();
    if cause == ResetCause::Watchdog {
        defmt::warn!("last reset was the watchdog");
    }

    // Clocks
    let rcc = dp.RCC.constrain();
    let _clocks = rcc
        .cfgr
        .sysclk(SYSCLK_HZ.Hz())
        .pclk2(PCLK2_HZ.Hz())
        .freeze();

    cp.DCB.enable_trace();
    cp.DWT.enable_cycle_counter();

    let _pins = BoardPins::new(dp.GPIOA, dp.GPIOC, dp.GPIOD);

    let timing = SwitchTiming::new(SYSCLK_HZ, &TUNING);
    let budget = timing.cycle_budget(SYSCLK_HZ);
    defmt::info!(
        "switching at {} Hz ({} core cycles): period {} dead time {} max target {}",
        timing.switching_hz(),
        budget,
        TUNING.period,
        TUNING.dead_time,
        TUNING.max_target
    );
    defmt::info!(
        "pid: p_shift {} i_shift {} integral [{}, {}] << {}",
        TUNING.p_shift,
        TUNING.i_shift,
        TUNING.integral_min,
        TUNING.integral_max,
        TUNING.feedback_shift
    );

    // Converter: switch timer, sampling, watchdog
    let switch = SwitchTimer::tim1(dp.TIM1, timing);
    let adc = SampledPair::adc1(dp.ADC1, pins::FEEDBACK_CHANNEL, pins::REFERENCE_CHANNEL);
    let wd = IwdgSettings::for_timeout(WATCHDOG_TIMEOUT_US, LSI_HZ);
    defmt::info!("watchdog: {} us", wd.timeout_us(LSI_HZ));
    let iwdg = Iwdg::start(dp.IWDG, wd);

    let mut converter = Converter::new(switch, adc, iwdg);
    let mut control = ControlLoop::new(TUNING);
    control.start(&mut converter);

    cortex_m::interrupt::free(|cs| {
        CONTROL.borrow(cs).replace(Some((control, converter)));
    });
    unsafe { NVIC::unmask(pac::Interrupt::ADC) };

    // Panel: mailbox, digits, aux PWM
    let mut panel = Panel::new(AuxPwm::tim3(dp.TIM3), SYSCLK_HZ);
    let mut console = Console::new(TUNING, FADE);

    let mut reported = 0;
    loop {
        console.poll(&mut panel, &SHARED);

        let worst = ADC_CYCLES_MAX.load(Ordering::Relaxed);
        if worst != reported {
            reported = worst;
            if worst >= budget {
                defmt::warn!("control interrupt took {} cycles (budget {})", worst, budget);
            } else {
                defmt::debug!("control interrupt worst case {} cycles", worst);
            }
        }
    }
}

#[interrupt]
fn ADC() {
    let start = DWT::cycle_count();
    cortex_m::interrupt::free(|cs| {
        if let Some((control, converter)) = CONTROL.borrow(cs).borrow_mut().as_mut() {
            converter.acknowledge();
            control.on_conversion_complete(converter, &SHARED);
        }
    });

    let elapsed = DWT::cycle_count().wrapping_sub(start);
    if elapsed > ADC_CYCLES_MAX.load(Ordering::Relaxed) {
        ADC_CYCLES_MAX.store(elapsed, Ordering::Relaxed);
    }
}
