use super::SystemRealtime;
use wmidi::{Channel, ControlFunction, ControlValue, Note, ProgramNumber, U7, U14, Velocity};

/// A fully decoded MIDI message.
///
/// Channel voice messages keep the channel they were received on; the command nibble is implied by the variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MidiMessage {
    /// A key was released.
    NoteOff(Channel, Note, Velocity),
    /// A key was struck. A velocity of zero is, by convention, a release.
    NoteOn(Channel, Note, Velocity),
    /// Pressure applied to a single held key.
    PolyAfterTouch(Channel, Note, Velocity),
    /// A controller moved.
    ControlChange(Channel, ControlFunction, ControlValue),
    /// A patch was selected.
    ProgramChange(Channel, ProgramNumber),
    /// Pressure applied to the keyboard as a whole.
    ChannelAfterTouch(Channel, Velocity),
    /// The pitch wheel moved. The 14-bit value is centered on `0x2000`.
    PitchBend(Channel, U14),
    /// One byte of a System Exclusive payload. Reserved: the parser currently drops SysEx payloads.
    SysEx(U7),
    /// A single-byte System Real-Time message.
    SysExRealtime(SystemRealtime),
}

impl MidiMessage {
    /// Returns the channel of channel voice messages, `None` for system messages.
    pub fn channel(&self) -> Option<Channel> {
        match *self {
            Self::NoteOff(channel, ..)
            | Self::NoteOn(channel, ..)
            | Self::PolyAfterTouch(channel, ..)
            | Self::ControlChange(channel, ..)
            | Self::ProgramChange(channel, _)
            | Self::ChannelAfterTouch(channel, _)
            | Self::PitchBend(channel, _) => Some(channel),
            Self::SysEx(_) | Self::SysExRealtime(_) => None,
        }
    }

    /// Returns true for messages that press or release a key.
    pub fn is_note_event(&self) -> bool {
        matches!(self, Self::NoteOff(..) | Self::NoteOn(..))
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MidiMessage {
    fn format(&self, fmt: defmt::Formatter) {
        match *self {
            Self::NoteOff(channel, note, velocity) => defmt::write!(
                fmt,
                "NoteOff {{ channel: {}, note: {} ({}), velocity: {} }}",
                channel.number(),
                note.to_str(),
                note as u8,
                u8::from(velocity)
            ),
            Self::NoteOn(channel, note, velocity) => defmt::write!(
                fmt,
                "NoteOn {{ channel: {}, note: {} ({}), velocity: {} }}",
                channel.number(),
                note.to_str(),
                note as u8,
                u8::from(velocity)
            ),
            Self::PolyAfterTouch(channel, note, velocity) => defmt::write!(
                fmt,
                "PolyAfterTouch {{ channel: {}, note: {}, velocity: {} }}",
                channel.number(),
                note as u8,
                u8::from(velocity)
            ),
            Self::ControlChange(channel, function, value) => defmt::write!(
                fmt,
                "ControlChange {{ channel: {}, controller: {}, value: {} }}",
                channel.number(),
                u8::from(function.0),
                u8::from(value)
            ),
            Self::ProgramChange(channel, program) => defmt::write!(
                fmt,
                "ProgramChange {{ channel: {}, program: {} }}",
                channel.number(),
                u8::from(program)
            ),
            Self::ChannelAfterTouch(channel, velocity) => defmt::write!(
                fmt,
                "ChannelAfterTouch {{ channel: {}, velocity: {} }}",
                channel.number(),
                u8::from(velocity)
            ),
            Self::PitchBend(channel, value) => defmt::write!(
                fmt,
                "PitchBend {{ channel: {}, value: {} }}",
                channel.number(),
                u16::from(value)
            ),
            Self::SysEx(data) => defmt::write!(fmt, "SysEx {{ data: {} }}", u8::from(data)),
            Self::SysExRealtime(message) => defmt::write!(fmt, "{}", message),
        }
    }
}
