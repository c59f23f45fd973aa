use num_derive::{FromPrimitive, ToPrimitive};

/// Determines where the arpeggiator takes its tempo from.
#[derive(Debug, Default, Copy, Clone, ToPrimitive, FromPrimitive, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Steps are timed by the device itself, according to the speed setting.
    #[default]
    Internal,
    /// Steps follow the MIDI Timing Clock messages of another device.
    External,
}

impl super::CycleConfig for ClockSource {}
