use num_derive::{FromPrimitive, ToPrimitive};

/// Determines whether, and how, held keys feed the arpeggiator.
#[derive(Debug, Default, Copy, Clone, ToPrimitive, FromPrimitive, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArpeggiatorMode {
    /// Keys join the pattern when pressed and leave it when released.
    Normal,
    /// Keys join the pattern when pressed and stay in it after release, until the arpeggiator is cleared.
    Hold,
    /// Key presses and releases are ignored.
    #[default]
    Off,
}

impl ArpeggiatorMode {
    /// Raw value of the last variant.
    pub const MAX: u8 = super::last_index(3);

    /// Returns true for the modes in which key presses alter the pattern.
    pub fn accepts_keys(&self) -> bool {
        matches!(self, Self::Normal | Self::Hold)
    }
}

impl super::CycleConfig for ArpeggiatorMode {}
