mod held_keys;
pub use held_keys::*;

mod params;
pub use params::*;

mod pattern;
pub use pattern::*;

use rand::{Rng, SeedableRng, rngs::SmallRng};
use wmidi::{Channel, Note, U7, Velocity};

use crate::{
    clock::{Clock, ClockDivider},
    configuration::{ArpeggiatorMode, ArpeggiatorPattern},
};

/// Release velocity of every Note Off sent.
const NOTE_OFF_VELOCITY: U7 = U7::from_u8_lossy(0);

/// Seed used until [`Arpeggiator::reseed`] is called.
const DEFAULT_SEED: u64 = 0x5EED_A4BE_6610;

/// An instruction for the downstream MIDI output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteEvent {
    /// Start sounding a note.
    On(Note, Velocity),
    /// Stop sounding a note.
    Off(Note),
}

#[cfg(feature = "defmt")]
impl defmt::Format for NoteEvent {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::On(note, velocity) => defmt::write!(
                fmt,
                "On({} ({}), {})",
                note.to_str(),
                *note as u8,
                u8::from(*velocity)
            ),
            Self::Off(note) => defmt::write!(fmt, "Off({} ({}))", note.to_str(), *note as u8),
        }
    }
}

impl NoteEvent {
    /// Builds the MIDI message which carries out this event on `channel`.
    pub fn to_midi(&self, channel: Channel) -> wmidi::MidiMessage<'static> {
        match *self {
            Self::On(note, velocity) => wmidi::MidiMessage::NoteOn(channel, note, velocity),
            Self::Off(note) => wmidi::MidiMessage::NoteOff(channel, note, NOTE_OFF_VELOCITY),
        }
    }
}

/// The result of advancing the arpeggiator by one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// The note sounding before this step, which must be turned off first.
    pub off: Option<Note>,
    /// The note this step plays.
    pub on: Note,
    /// Velocity to play [`Self::on`] with.
    pub velocity: Velocity,
}

impl Step {
    /// The step's events in the order they must be sent: any Note Off strictly before the Note On.
    pub fn events(&self) -> impl Iterator<Item = NoteEvent> {
        self.off
            .map(NoteEvent::Off)
            .into_iter()
            .chain(core::iter::once(NoteEvent::On(self.on, self.velocity)))
    }
}

/// The key/pattern engine.
///
/// Keys pressed while the arpeggiator is enabled are collected into [`HeldKeys`], from which a [`Pattern`] is
/// generated. Each [`Self::tick`] plays the next note of that pattern, ending the one played before it. The engine is
/// monophonic: at most one of its notes sounds at any time.
///
/// Nothing here is synchronized. If key changes and ticks come from different interrupt priorities, each call must be
/// made inside one critical section so a tick never sees a half-rebuilt pattern.
#[derive(Clone, Debug)]
pub struct Arpeggiator {
    params: ArpeggiatorParams,
    keys: HeldKeys,
    pattern: Pattern,
    cursor: usize,
    active_note: Option<Note>,
    step_divider: ClockDivider,
    rng: SmallRng,
}

impl Default for Arpeggiator {
    fn default() -> Self {
        Self::new(ArpeggiatorParams::default())
    }
}

impl Arpeggiator {
    /// Constructs an idle arpeggiator with the given parameters, e.g. those restored from a scene.
    pub fn new(params: ArpeggiatorParams) -> Self {
        Self {
            params,
            keys: HeldKeys::new(),
            pattern: Pattern::new(),
            cursor: 0,
            active_note: None,
            step_divider: ClockDivider::new(params.scale().pulses_per_step()),
            rng: SmallRng::seed_from_u64(DEFAULT_SEED),
        }
    }

    /// Getter.
    pub fn params(&self) -> &ArpeggiatorParams {
        &self.params
    }

    /// Getter.
    pub fn held_keys(&self) -> &HeldKeys {
        &self.keys
    }

    /// Getter.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Index of the pattern step the next [`Self::tick`] plays. Unused by [`ArpeggiatorPattern::Random`].
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The note currently sounding, if any.
    pub fn active_note(&self) -> Option<Note> {
        self.active_note
    }

    /// Whether keys latch, i.e., whether the arpeggiator is in [`ArpeggiatorMode::Hold`].
    pub fn is_active(&self) -> bool {
        self.params.mode() == ArpeggiatorMode::Hold
    }

    /// Restarts the random number generator used by [`ArpeggiatorPattern::Random`] from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    /// Registers a key press. Ignored unless the mode accepts keys, or when the key is already held, or when no room is
    /// left for another key.
    pub fn add_note(&mut self, note: Note) {
        if !self.params.mode().accepts_keys() {
            return;
        }
        if self.keys.add(note) {
            self.regenerate();
        }
    }

    /// Registers a key release. Returns the note to turn off, if any.
    ///
    /// The key is forgotten in every mode. In [`ArpeggiatorMode::Normal`] the pattern is rebuilt, the sounding note is
    /// ended and the pattern restarts from its first step, since the cursor may now point past the end of the shorter
    /// pattern. In [`ArpeggiatorMode::Hold`] the pattern keeps playing as it was; the next key press rebuilds it from
    /// the keys held at that moment.
    pub fn remove_note(&mut self, note: Note) -> Option<Note> {
        let removed = self.keys.remove(note);
        if self.params.mode() != ArpeggiatorMode::Normal {
            return None;
        }
        if removed {
            self.regenerate();
        }
        self.cursor = 0;
        self.active_note.take()
    }

    /// Forgets every key and empties the pattern. Returns the note to turn off, if any.
    pub fn clear(&mut self) -> Option<Note> {
        self.keys.clear();
        self.pattern = Pattern::new();
        self.cursor = 0;
        #[cfg(feature = "defmt")]
        defmt::debug!("Arpeggiator cleared");
        self.active_note.take()
    }

    /// Ends the sounding note without touching the held keys or the position in the pattern. Returns the note to turn
    /// off, if any.
    pub fn release(&mut self) -> Option<Note> {
        self.active_note.take()
    }

    /// Plays the next step of the pattern. Returns nothing, and rewinds the cursor, if the pattern is empty.
    pub fn tick(&mut self) -> Option<Step> {
        let len = self.pattern.len();
        if len == 0 {
            self.cursor = 0;
            return None;
        }

        let index = match self.params.pattern() {
            ArpeggiatorPattern::Random => self.rng.gen_range(0..len),
            _ => {
                if self.cursor >= len {
                    self.cursor = 0;
                }
                let index = self.cursor;
                self.cursor = (index + 1) % len;
                index
            }
        };
        let on = self.pattern.get(index)?;

        let step = Step {
            off: self.active_note.replace(on),
            on,
            velocity: self.params.velocity(),
        };
        #[cfg(feature = "defmt")]
        defmt::trace!("Step {}: {}", index, on as u8);
        Some(step)
    }

    /// Counts one 24 PPQN clock pulse, playing a step once enough pulses for the current
    /// [`Scale`](crate::configuration::Scale) have elapsed.
    pub fn pulse(&mut self) -> Option<Step> {
        if self.step_divider.clock() {
            self.tick()
        } else {
            None
        }
    }

    /// Makes the next [`Self::pulse`] play a step, e.g. when the transport starts.
    pub fn restart(&mut self) {
        self.step_divider.restart();
    }

    /// Raw value of `param`.
    pub fn param(&self, param: ArpeggiatorParam) -> u8 {
        self.params.param(param)
    }

    /// See [`ArpeggiatorParams::set_param`].
    pub fn set_param(&mut self, param: ArpeggiatorParam, value: u8) -> u8 {
        let value = self.params.set_param(param, value);
        self.param_changed(param);
        value
    }

    /// See [`ArpeggiatorParams::inc_param`].
    pub fn inc_param(&mut self, param: ArpeggiatorParam) -> u8 {
        let value = self.params.inc_param(param);
        self.param_changed(param);
        value
    }

    /// See [`ArpeggiatorParams::dec_param`].
    pub fn dec_param(&mut self, param: ArpeggiatorParam) -> u8 {
        let value = self.params.dec_param(param);
        self.param_changed(param);
        value
    }

    /// See [`ArpeggiatorParams::toggle_param`].
    pub fn toggle_param(&mut self, param: ArpeggiatorParam) -> u8 {
        let value = self.params.toggle_param(param);
        self.param_changed(param);
        value
    }

    fn param_changed(&mut self, param: ArpeggiatorParam) {
        match param {
            ArpeggiatorParam::Pattern => {
                self.regenerate();
                self.cursor = 0;
            }
            ArpeggiatorParam::Scale => self
                .step_divider
                .set_divider(self.params.scale().pulses_per_step()),
            _ => {}
        }
        #[cfg(feature = "defmt")]
        defmt::debug!("{} set to {}", param, self.params.param(param));
    }

    fn regenerate(&mut self) {
        self.pattern = Pattern::generate(&self.keys, self.params.pattern());
        if self.pattern.is_empty() {
            self.cursor = 0;
        }
    }
}
