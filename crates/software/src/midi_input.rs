//! Provides [`MidiInput`], a byte-at-a-time parser turning a serial MIDI stream into [`MidiMessage`]s.
//!
//! The parser follows running status: once a channel voice message completes, further data bytes without a new status
//! byte are read as another message of the same kind. System Real-Time bytes are reported the moment they arrive and
//! leave any message in progress untouched, since the protocol allows them anywhere, even mid-message.
//!
//! Malformed input is never an error. A data byte with no status to attach to is dropped, as is every byte of a System
//! Exclusive payload.

mod message;
pub use message::*;

mod status;
pub use status::*;

use wmidi::{Channel, ControlFunction, Note, U7, U14};

/// Determines which channels' messages the parser accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChannelFilter {
    /// Accept messages on every channel.
    #[default]
    Omni,
    /// Accept messages on a single channel only.
    ///
    /// A status byte for any other channel is ignored outright and leaves the parser's state as it was. Data bytes that
    /// follow it are therefore read against whatever message was in progress before; a stream interleaving several
    /// channels without status bytes between them will be misread.
    Only(Channel),
}

/// Where the parser is within the message currently arriving.
///
/// Each channel voice message kind has a `StatusReceived` state, entered on its status byte and returned to after each
/// complete message (running status). Kinds with two data bytes also have a `DataReceived` state holding the first one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParserState {
    /// No status byte has been seen yet.
    #[default]
    Idle,
    /// Waiting for the note of a Note Off.
    NoteOffStatusReceived(Channel),
    /// Waiting for the velocity of a Note Off.
    NoteOffDataReceived(Channel, Note),
    /// Waiting for the note of a Note On.
    NoteOnStatusReceived(Channel),
    /// Waiting for the velocity of a Note On.
    NoteOnDataReceived(Channel, Note),
    /// Waiting for the note of a Polyphonic Aftertouch.
    PolyAfterTouchStatusReceived(Channel),
    /// Waiting for the pressure of a Polyphonic Aftertouch.
    PolyAfterTouchDataReceived(Channel, Note),
    /// Waiting for the controller number of a Control Change.
    ControlChangeStatusReceived(Channel),
    /// Waiting for the value of a Control Change.
    ControlChangeDataReceived(Channel, ControlFunction),
    /// Waiting for the program number of a Program Change.
    ProgramChangeStatusReceived(Channel),
    /// Waiting for the pressure of a Channel Aftertouch.
    ChannelAfterTouchStatusReceived(Channel),
    /// Waiting for the least significant 7 bits of a Pitch Bend.
    PitchBendStatusReceived(Channel),
    /// Waiting for the most significant 7 bits of a Pitch Bend.
    PitchBendDataReceived(Channel, U7),
    /// Inside a System Exclusive (or other non-real-time system) message; data bytes are dropped.
    SysExReceived,
}

/// Parses a serial stream of MIDI bytes into [`MidiMessage`]s, one byte at a time.
#[derive(Clone, Debug, Default)]
pub struct MidiInput {
    state: ParserState,
    channel_filter: ChannelFilter,
}

impl MidiInput {
    /// Constructs an omni-mode [`MidiInput`].
    pub const fn new() -> Self {
        Self {
            state: ParserState::Idle,
            channel_filter: ChannelFilter::Omni,
        }
    }

    /// Getter.
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Getter.
    pub fn channel_filter(&self) -> ChannelFilter {
        self.channel_filter
    }

    /// Restricts (or lifts the restriction on) the channels whose messages are accepted. See [`ChannelFilter::Only`]
    /// for how filtered status bytes affect parsing.
    pub fn set_channel_filter(&mut self, channel_filter: ChannelFilter) {
        self.channel_filter = channel_filter;
    }

    /// Consumes one received byte. Returns the message it completes, if any.
    pub fn parse(&mut self, byte: u8) -> Option<MidiMessage> {
        match MidiByte::classify(byte) {
            MidiByte::Status(status) => self.parse_status(status),
            MidiByte::Data(data) => self.parse_data(data),
        }
    }

    fn parse_status(&mut self, status: StatusByte) -> Option<MidiMessage> {
        let command = status.command();
        if command == Command::System {
            return match SystemRealtime::from_byte(status.byte()) {
                // real-time messages may be interleaved with any other message and must not disturb it
                Some(realtime) => Some(MidiMessage::SysExRealtime(realtime)),
                None => {
                    self.state = ParserState::SysExReceived;
                    None
                }
            };
        }

        let Some(channel) = self.accept(status.channel_index()) else {
            #[cfg(feature = "defmt")]
            defmt::trace!("Ignoring status byte {:#04x}: channel filtered", status.byte());
            return None;
        };

        self.state = match command {
            Command::NoteOff => ParserState::NoteOffStatusReceived(channel),
            Command::NoteOn => ParserState::NoteOnStatusReceived(channel),
            Command::PolyAfterTouch => ParserState::PolyAfterTouchStatusReceived(channel),
            Command::ControlChange => ParserState::ControlChangeStatusReceived(channel),
            Command::ProgramChange => ParserState::ProgramChangeStatusReceived(channel),
            Command::ChannelAfterTouch => ParserState::ChannelAfterTouchStatusReceived(channel),
            Command::PitchBend => ParserState::PitchBendStatusReceived(channel),
            Command::System => ParserState::SysExReceived,
        };
        None
    }

    fn parse_data(&mut self, data: U7) -> Option<MidiMessage> {
        use ParserState::*;

        let (next, message) = match self.state {
            Idle => (Idle, None),
            NoteOffStatusReceived(ch) => (NoteOffDataReceived(ch, Note::from(data)), None),
            NoteOffDataReceived(ch, note) => (
                NoteOffStatusReceived(ch),
                Some(MidiMessage::NoteOff(ch, note, data)),
            ),
            NoteOnStatusReceived(ch) => (NoteOnDataReceived(ch, Note::from(data)), None),
            NoteOnDataReceived(ch, note) => (
                NoteOnStatusReceived(ch),
                Some(MidiMessage::NoteOn(ch, note, data)),
            ),
            PolyAfterTouchStatusReceived(ch) => {
                (PolyAfterTouchDataReceived(ch, Note::from(data)), None)
            }
            PolyAfterTouchDataReceived(ch, note) => (
                PolyAfterTouchStatusReceived(ch),
                Some(MidiMessage::PolyAfterTouch(ch, note, data)),
            ),
            ControlChangeStatusReceived(ch) => {
                (ControlChangeDataReceived(ch, ControlFunction(data)), None)
            }
            ControlChangeDataReceived(ch, function) => (
                ControlChangeStatusReceived(ch),
                Some(MidiMessage::ControlChange(ch, function, data)),
            ),
            // single data byte messages complete immediately and stay put for running status
            ProgramChangeStatusReceived(ch) => (
                ProgramChangeStatusReceived(ch),
                Some(MidiMessage::ProgramChange(ch, data)),
            ),
            ChannelAfterTouchStatusReceived(ch) => (
                ChannelAfterTouchStatusReceived(ch),
                Some(MidiMessage::ChannelAfterTouch(ch, data)),
            ),
            PitchBendStatusReceived(ch) => (PitchBendDataReceived(ch, data), None),
            PitchBendDataReceived(ch, lsb) => (
                PitchBendStatusReceived(ch),
                Some(MidiMessage::PitchBend(ch, pitch_bend_value(lsb, data))),
            ),
            SysExReceived => (SysExReceived, None),
        };

        self.state = next;
        message
    }

    fn accept(&self, channel_index: u8) -> Option<Channel> {
        let channel = Channel::from_index(channel_index).ok()?;
        match self.channel_filter {
            ChannelFilter::Omni => Some(channel),
            ChannelFilter::Only(selected) if selected == channel => Some(channel),
            ChannelFilter::Only(_) => None,
        }
    }
}

fn pitch_bend_value(lsb: U7, msb: U7) -> U14 {
    // two 7-bit halves always fit in 14 bits
    U14::try_from((u16::from(u8::from(msb)) << 7) | u16::from(u8::from(lsb))).unwrap_or(U14::MIN)
}
