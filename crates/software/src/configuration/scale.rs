use num_derive::{FromPrimitive, ToPrimitive};

/// The note value of a single arpeggiator step.
///
/// Each variant halves the length of the previous one, so the discriminant is the power of two by which the tempo is
/// multiplied to get the step rate.
#[derive(Debug, Default, Copy, Clone, ToPrimitive, FromPrimitive, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Scale {
    /// One step per beat.
    #[default]
    Quarter,
    /// Two steps per beat.
    Eighth,
    /// Four steps per beat.
    Sixteenth,
    /// Eight steps per beat.
    ThirtySecond,
}

impl Scale {
    /// Raw value of the last variant.
    pub const MAX: u8 = super::last_index(4);

    /// Number of 24 PPQN clock pulses that make up one step.
    pub fn pulses_per_step(&self) -> u8 {
        24 >> (*self as u8)
    }
}

impl super::CycleConfig for Scale {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulses_per_step() {
        assert_eq!(24, Scale::Quarter.pulses_per_step());
        assert_eq!(12, Scale::Eighth.pulses_per_step());
        assert_eq!(6, Scale::Sixteenth.pulses_per_step());
        assert_eq!(3, Scale::ThirtySecond.pulses_per_step());
    }
}
