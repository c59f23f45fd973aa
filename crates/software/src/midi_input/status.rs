//! Classification of raw bytes and decoding of the fields packed into a status byte.

use wmidi::U7;

/// A byte received from the wire, classified by its top bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MidiByte {
    /// The top bit is set: the byte starts a message (or is a real-time message on its own).
    Status(StatusByte),
    /// The top bit is clear: the byte carries a 7-bit payload value.
    Data(U7),
}

impl MidiByte {
    /// Classifies a raw byte.
    pub fn classify(byte: u8) -> Self {
        if byte & StatusByte::FLAG != 0 {
            Self::Status(StatusByte(byte))
        } else {
            Self::Data(U7::from_u8_lossy(byte))
        }
    }
}

/// The three-bit command field of a status byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// `0x8n`
    NoteOff,
    /// `0x9n`
    NoteOn,
    /// `0xAn`
    PolyAfterTouch,
    /// `0xBn`
    ControlChange,
    /// `0xCn`
    ProgramChange,
    /// `0xDn`
    ChannelAfterTouch,
    /// `0xEn`
    PitchBend,
    /// `0xF0` through `0xFF`; the low nibble selects a system message rather than a channel.
    System,
}

/// A byte with its status flag set, laid out as `1ccc nnnn`: a 3-bit command and a 4-bit channel index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusByte(u8);

impl StatusByte {
    const FLAG: u8 = 0b1000_0000;
    const COMMAND_SHIFT: u8 = 4;
    const COMMAND_MASK: u8 = 0b0111;
    const CHANNEL_MASK: u8 = 0b1111;

    /// The raw byte.
    pub fn byte(&self) -> u8 {
        self.0
    }

    /// Zero-based channel index. Meaningless for [`Command::System`].
    pub fn channel_index(&self) -> u8 {
        self.0 & Self::CHANNEL_MASK
    }

    /// The command field.
    pub fn command(&self) -> Command {
        match (self.0 >> Self::COMMAND_SHIFT) & Self::COMMAND_MASK {
            0 => Command::NoteOff,
            1 => Command::NoteOn,
            2 => Command::PolyAfterTouch,
            3 => Command::ControlChange,
            4 => Command::ProgramChange,
            5 => Command::ChannelAfterTouch,
            6 => Command::PitchBend,
            _ => Command::System,
        }
    }
}

/// System Real-Time messages. These are single status bytes which may arrive at any point in the stream, even between
/// the bytes of another message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SystemRealtime {
    /// Sent 24 times per quarter note by a device providing tempo.
    TimingClock = 0xF8,
    /// Start playback from the beginning.
    Start = 0xFA,
    /// Resume playback from where it was stopped.
    Continue = 0xFB,
    /// Stop playback.
    Stop = 0xFC,
    /// Keep-alive sent by some devices while otherwise idle.
    ActiveSensing = 0xFE,
    /// Return to power-up state.
    Reset = 0xFF,
}

impl SystemRealtime {
    /// Returns the real-time message encoded by `byte`, if any. `0xF9` and `0xFD` are undefined and yield `None`.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0xF8 => Some(Self::TimingClock),
            0xFA => Some(Self::Start),
            0xFB => Some(Self::Continue),
            0xFC => Some(Self::Stop),
            0xFE => Some(Self::ActiveSensing),
            0xFF => Some(Self::Reset),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(byte: u8) -> StatusByte {
        match MidiByte::classify(byte) {
            MidiByte::Status(status) => status,
            MidiByte::Data(_) => panic!("{byte:#04x} should classify as a status byte"),
        }
    }

    #[test]
    fn classify_by_top_bit() {
        assert_eq!(MidiByte::Data(U7::from_u8_lossy(0x7F)), MidiByte::classify(0x7F));
        assert!(matches!(MidiByte::classify(0x80), MidiByte::Status(_)));
    }

    #[test]
    fn decode_channel_and_command() {
        let s = status(0x9A);
        assert_eq!(Command::NoteOn, s.command(), "Expected left but got right");
        assert_eq!(10, s.channel_index(), "Expected left but got right");

        assert_eq!(Command::NoteOff, status(0x80).command());
        assert_eq!(Command::PolyAfterTouch, status(0xA0).command());
        assert_eq!(Command::ControlChange, status(0xB3).command());
        assert_eq!(Command::ProgramChange, status(0xC0).command());
        assert_eq!(Command::ChannelAfterTouch, status(0xDF).command());
        assert_eq!(Command::PitchBend, status(0xE1).command());
        assert_eq!(Command::System, status(0xF0).command());
    }

    #[test]
    fn realtime_bytes() {
        assert_eq!(Some(SystemRealtime::TimingClock), SystemRealtime::from_byte(0xF8));
        assert_eq!(Some(SystemRealtime::Reset), SystemRealtime::from_byte(0xFF));
        assert_eq!(None, SystemRealtime::from_byte(0xF9));
        assert_eq!(None, SystemRealtime::from_byte(0xF0));
        assert_eq!(0xFC, SystemRealtime::Stop as u8);
    }
}
