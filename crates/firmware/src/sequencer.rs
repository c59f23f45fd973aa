//! State shared between the MIDI, clock and control tasks: the arpeggiator itself, the external clock feeding it, and
//! the queue of note events awaiting output.

use arpeggio_lib::{
    arpeggiator::{Arpeggiator, NoteEvent, Step},
    clock::{DEFAULT_BPM, ExternalClock, MIN_BPM},
    configuration::ClockSource,
};
use core::cell::RefCell;
use defmt::*;
use embassy_sync::{
    blocking_mutex::{Mutex, raw::CriticalSectionRawMutex},
    channel::Channel,
    watch::{Receiver, Sender, Watch},
};
use wmidi::Note;

/// Everything that must change together when a key, a clock pulse or a control arrives.
#[derive(Default)]
pub struct Sequencer {
    pub arpeggiator: Arpeggiator,
    pub external_clock: ExternalClock,
}

/// Each access is a single critical section, so a clock pulse never observes a pattern mid-rebuild.
pub type SharedSequencer = Mutex<CriticalSectionRawMutex, RefCell<Sequencer>>;

/// Runs `f` on the sequencer inside a critical section.
pub fn with_sequencer<R>(sequencer: &SharedSequencer, f: impl FnOnce(&mut Sequencer) -> R) -> R {
    sequencer.lock(|cell| f(&mut cell.borrow_mut()))
}

/// Whether the transport is running, as set by MIDI Start, Continue and Stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum Transport {
    Running,
    Stopped,
}

const TRANSPORT_RECEIVER_CNT: usize = 0;
/// Syncs the [`Transport`] state across tasks.
pub static TRANSPORT_SYNC: Watch<CriticalSectionRawMutex, Transport, TRANSPORT_RECEIVER_CNT> =
    Watch::new_with(Transport::Running);

const CLOCK_SOURCE_RECEIVER_CNT: usize = 0;
/// Syncs the [`ClockSource`] selection across tasks.
pub static CLOCK_SOURCE_SYNC: Watch<
    CriticalSectionRawMutex,
    ClockSource,
    CLOCK_SOURCE_RECEIVER_CNT,
> = Watch::new_with(ClockSource::Internal);
pub type ClockSourceSender<'a> =
    Sender<'a, CriticalSectionRawMutex, ClockSource, CLOCK_SOURCE_RECEIVER_CNT>;

const TEMPO_RECEIVER_CNT: usize = 1;
/// Syncs the raw speed parameter (BPM above the minimum) with the internal clock.
pub static TEMPO_SYNC: Watch<CriticalSectionRawMutex, u8, TEMPO_RECEIVER_CNT> =
    Watch::new_with((DEFAULT_BPM - MIN_BPM) as u8);
pub type TempoReceiver<'a> = Receiver<'a, CriticalSectionRawMutex, u8, TEMPO_RECEIVER_CNT>;

/// Whether pulses from `source` should currently advance the arpeggiator.
pub fn accepts_pulses_from(source: ClockSource) -> bool {
    let running = TRANSPORT_SYNC.anon_receiver().try_get() == Some(Transport::Running);
    let selected = CLOCK_SOURCE_SYNC.anon_receiver().try_get().unwrap_or_default();
    running && selected == source
}

const NOTE_EVENTS_CAPACITY: usize = 16;
/// Note events waiting for the MIDI output.
pub static NOTE_EVENTS: Channel<CriticalSectionRawMutex, NoteEvent, NOTE_EVENTS_CAPACITY> =
    Channel::new();

/// Queues `event` for output without waiting; the event is dropped if the queue is full.
pub fn emit(event: NoteEvent) {
    if NOTE_EVENTS.try_send(event).is_err() {
        warn!("MIDI output queue full, dropping {}", event);
    }
}

/// Queues the events of `step`, Note Off first.
pub fn emit_step(step: Step) {
    step.events().for_each(emit);
}

/// Queues a Note Off for `note`, if there is one.
pub fn emit_off(note: Option<Note>) {
    if let Some(note) = note {
        emit(NoteEvent::Off(note));
    }
}
