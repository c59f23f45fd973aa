//! Pushbutton inputs and LED indicators.

use crate::sequencer::{ClockSourceSender, SharedSequencer, emit_off, with_sequencer};
use arpeggio_lib::{
    arpeggiator::ArpeggiatorParam,
    configuration::{ClockSource, CycleConfig},
};
use defmt::*;
use embassy_stm32::{exti::ExtiInput, gpio::Output};
use embassy_time::{Instant, Timer};

/// Handles presses of the user button, cycling through the
/// [`ArpeggiatorMode`](arpeggio_lib::configuration::ArpeggiatorMode)s.
///
/// Keys collected in one mode are dropped when switching to the next. The moment of the press also reseeds the random
/// pattern.
#[embassy_executor::task]
pub async fn select_mode(mut button: ExtiInput<'static>, sequencer: &'static SharedSequencer) -> ! {
    loop {
        button.wait_for_rising_edge().await;

        let (mode, off) = with_sequencer(sequencer, |s| {
            s.arpeggiator.toggle_param(ArpeggiatorParam::Mode);
            s.arpeggiator.reseed(Instant::now().as_ticks());
            (s.arpeggiator.params().mode(), s.arpeggiator.clear())
        });
        emit_off(off);
        info!("Arpeggiator mode: {}", mode);
    }
}

/// Handles button presses, cycling through the
/// [`ArpeggiatorPattern`](arpeggio_lib::configuration::ArpeggiatorPattern)s.
#[embassy_executor::task]
pub async fn select_pattern(
    mut button: ExtiInput<'static>,
    sequencer: &'static SharedSequencer,
) -> ! {
    loop {
        button.wait_for_falling_edge().await;

        let pattern = with_sequencer(sequencer, |s| {
            s.arpeggiator.toggle_param(ArpeggiatorParam::Pattern);
            s.arpeggiator.params().pattern()
        });
        info!("Arpeggiator pattern: {}", pattern);
    }
}

/// Handles button presses, toggling the [`ClockSource`]. The LED is lit while the external clock is selected.
#[embassy_executor::task]
pub async fn select_clock_source(
    mut button: ExtiInput<'static>,
    mut led: Output<'static>,
    clock_source: ClockSourceSender<'static>,
) -> ! {
    loop {
        button.wait_for_falling_edge().await;

        let new_state = clock_source
            .try_get()
            .expect("Clock source should never be uninitialized")
            .cycle();
        clock_source.send(new_state);
        info!("Clock source: {}", new_state);

        match new_state {
            ClockSource::Internal => {
                led.set_low();
            }
            ClockSource::External => {
                led.set_high();
            }
        }
    }
}

/// Blinks the selected [`ArpeggiatorPattern`](arpeggio_lib::configuration::ArpeggiatorPattern) number on the LED.
///
/// Patterns are numbered from one. A second of darkness separates each count, then the count is flashed
/// within the following second.
#[embassy_executor::task]
pub async fn display_pattern(mut led: Output<'static>, sequencer: &'static SharedSequencer) -> ! {
    const PERIOD_US: u64 = 1_000_000;

    loop {
        led.set_low();
        Timer::after_micros(PERIOD_US).await;

        let number = with_sequencer(sequencer, |s| s.arpeggiator.param(ArpeggiatorParam::Pattern))
            .saturating_add(1);
        // a gap follows every flash but the last
        let slots = u64::from(number) * 2 - 1;
        let slot_us = PERIOD_US / slots;
        for flash in 0..number {
            led.set_high();
            Timer::after_micros(slot_us).await;
            led.set_low();
            if flash + 1 < number {
                Timer::after_micros(slot_us).await;
            }
        }
    }
}
