use num_derive::{FromPrimitive, ToPrimitive};

/// Determines the order in which held keys are played.
///
/// Examples assume keys C, E and G are held.
#[derive(Debug, Default, Copy, Clone, ToPrimitive, FromPrimitive, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArpeggiatorPattern {
    /// Lowest to highest: C E G, C E G, ...
    #[default]
    Up,
    /// Highest to lowest: G E C, G E C, ...
    Down,
    /// Up then back down without repeating either end: C E G E, C E G E, ...
    UpDown,
    /// Up then back down, playing both ends twice: C E G G E C, C E G G E C, ...
    UpDownHold,
    /// Any held key, chosen at random on each step.
    Random,
}

impl ArpeggiatorPattern {
    /// Raw value of the last variant.
    pub const MAX: u8 = super::last_index(5);
}

impl super::CycleConfig for ArpeggiatorPattern {}
