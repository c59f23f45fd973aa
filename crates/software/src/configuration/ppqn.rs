use num_derive::{FromPrimitive, ToPrimitive};

/// Resolution of an incoming MIDI clock, in pulses per quarter note.
///
/// The discriminant doubles as the shift applied to the external clock's base divider.
#[derive(Debug, Default, Copy, Clone, ToPrimitive, FromPrimitive, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ppqn {
    /// Standard MIDI clock resolution.
    #[default]
    TwentyFour,
    /// Double resolution, as sent by some drum machines and sequencers.
    FortyEight,
}

impl Ppqn {
    /// Raw value of the last variant.
    pub const MAX: u8 = super::last_index(2);

    /// Pulses per quarter note.
    pub fn pulses(&self) -> u8 {
        24 << (*self as u8)
    }
}

impl super::CycleConfig for Ppqn {}
