//! Drives the arpeggiator from the internal tempo clock.

use crate::sequencer::{
    SharedSequencer, TempoReceiver, accepts_pulses_from, emit_step, with_sequencer,
};
use arpeggio_lib::{
    clock::{Clock, InternalClock},
    configuration::ClockSource,
};
use defmt::*;
use embassy_futures::select::{Either, select};
use embassy_time::{Duration, TICK_HZ, Ticker};

/// Task producing 24 PPQN pulses at the tempo set through [`TEMPO_SYNC`](crate::sequencer::TEMPO_SYNC).
///
/// The time driver's tick counter stands in for the hardware timer: the pre-divider becomes the ticker's period and the
/// post-divider is counted in software. Pulses only reach the arpeggiator while the internal clock is selected and the
/// transport is running; the ticker keeps going regardless so tempo is kept while stopped.
#[embassy_executor::task]
pub async fn internal_clock(
    sequencer: &'static SharedSequencer,
    mut tempo: TempoReceiver<'static>,
) -> ! {
    let mut clock = InternalClock::new(TICK_HZ as u32);
    let mut speed = tempo.get().await;

    loop {
        let pre_divider = clock.set_bpm_parameter(speed);
        info!(
            "Internal clock at {} BPM ({})",
            clock.bpm(),
            clock.dividers()
        );
        let mut ticker = Ticker::every(Duration::from_ticks(u64::from(pre_divider)));

        speed = loop {
            match select(ticker.next(), tempo.changed()).await {
                Either::First(_) => {
                    if clock.clock() && accepts_pulses_from(ClockSource::Internal) {
                        if let Some(step) = with_sequencer(sequencer, |s| s.arpeggiator.pulse()) {
                            emit_step(step);
                        }
                    }
                }
                Either::Second(new_speed) => break new_speed,
            }
        };
    }
}
