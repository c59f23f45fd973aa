//! Generation of the note sequence the arpeggiator steps through.

use tinyvec::{ArrayVec, array_vec};
use wmidi::{Note, U7};

use super::{HELD_KEYS_CAPACITY, HeldKeys};
use crate::configuration::ArpeggiatorPattern;

/// Longest pattern any [`ArpeggiatorPattern`] can produce from a full set of keys.
pub const PATTERN_CAPACITY: usize = 2 * HELD_KEYS_CAPACITY;

/// An ordered sequence of notes derived from [`HeldKeys`].
///
/// A pattern is never edited in place; it is rebuilt from scratch with [`Pattern::generate`] whenever the held keys or
/// the selected [`ArpeggiatorPattern`] change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pattern {
    notes: ArrayVec<[U7; PATTERN_CAPACITY]>,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Pattern {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Pattern {{ [");
        for (i, &note) in self.notes.iter().enumerate() {
            if i != 0 {
                defmt::write!(fmt, ",");
            }
            defmt::write!(fmt, " {}", u8::from(note));
        }
        defmt::write!(fmt, " ] }}");
    }
}

impl Pattern {
    /// Construct an empty `Pattern`.
    pub fn new() -> Self {
        Self { notes: array_vec!() }
    }

    /// Builds the pattern for `keys` in the given style.
    ///
    /// - `Up`: the keys as held, lowest first.
    /// - `Down`: the keys highest first.
    /// - `UpDown`: up through every key, then back down without repeating either end, so four keys give
    ///   `1 2 3 4 3 2`. Two keys or fewer play as `Up`.
    /// - `UpDownHold`: up through every key, then down through every key, so four keys give `1 2 3 4 4 3 2 1`. A single
    ///   key plays as `Up`.
    /// - `Random`: laid out as `Up`; the order comes from picking a random index at each step.
    pub fn generate(keys: &HeldKeys, style: ArpeggiatorPattern) -> Self {
        let keys = keys.as_slice();
        let mut notes: ArrayVec<[U7; PATTERN_CAPACITY]> = array_vec!();

        match style {
            ArpeggiatorPattern::Up | ArpeggiatorPattern::Random => notes.extend_from_slice(keys),
            ArpeggiatorPattern::Down => notes.extend(keys.iter().rev().copied()),
            ArpeggiatorPattern::UpDown => {
                notes.extend_from_slice(keys);
                if keys.len() > 2 {
                    notes.extend(keys[1..keys.len() - 1].iter().rev().copied());
                }
            }
            ArpeggiatorPattern::UpDownHold => {
                notes.extend_from_slice(keys);
                if keys.len() > 1 {
                    notes.extend(keys.iter().rev().copied());
                }
            }
        }

        Self { notes }
    }

    /// Number of steps in the pattern.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Determine if the pattern has any steps.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// The note played at step `index`, if the pattern is that long.
    pub fn get(&self, index: usize) -> Option<Note> {
        self.notes.get(index).map(|&note| Note::from(note))
    }

    /// Returns an [`Iterator`] over the notes in playing order.
    pub fn iter(&self) -> impl Iterator<Item = Note> + '_ {
        self.notes.iter().map(|&note| Note::from(note))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(values: &[u8]) -> HeldKeys {
        let mut keys = HeldKeys::new();
        for &value in values {
            keys.add(Note::from(U7::from_u8_lossy(value)));
        }
        keys
    }

    fn assert_notes(expected: &[u8], pattern: &Pattern) {
        let actual: ArrayVec<[u8; PATTERN_CAPACITY]> = pattern.iter().map(|note| note as u8).collect();
        assert_eq!(expected, &actual[..], "Expected left but got right");
    }

    mod up {
        use super::*;

        #[test]
        fn ascending() {
            let pattern = Pattern::generate(&keys(&[7, 5]), ArpeggiatorPattern::Up);
            assert_notes(&[5, 7], &pattern);
        }
    }

    mod down {
        use super::*;

        #[test]
        fn descending() {
            let pattern = Pattern::generate(&keys(&[5, 7]), ArpeggiatorPattern::Down);
            assert_notes(&[7, 5], &pattern);
        }
    }

    mod up_down {
        use super::*;

        #[test]
        fn four_keys_skip_both_ends_on_the_way_down() {
            let pattern = Pattern::generate(&keys(&[1, 2, 3, 4]), ArpeggiatorPattern::UpDown);
            assert_notes(&[1, 2, 3, 4, 3, 2], &pattern);
        }

        #[test]
        fn three_keys() {
            let pattern = Pattern::generate(&keys(&[1, 2, 3]), ArpeggiatorPattern::UpDown);
            assert_notes(&[1, 2, 3, 2], &pattern);
        }

        #[test]
        fn two_keys_play_as_up() {
            let pattern = Pattern::generate(&keys(&[1, 2]), ArpeggiatorPattern::UpDown);
            assert_notes(&[1, 2], &pattern);
        }

        #[test]
        fn length_is_twice_one_less_than_keys() {
            for count in 3..=HELD_KEYS_CAPACITY as u8 {
                let values: ArrayVec<[u8; HELD_KEYS_CAPACITY]> = (60..60 + count).collect();
                let pattern = Pattern::generate(&keys(&values), ArpeggiatorPattern::UpDown);
                assert_eq!(2 * (count as usize - 1), pattern.len());
            }
        }
    }

    mod up_down_hold {
        use super::*;

        #[test]
        fn four_keys_repeat_both_ends() {
            let pattern = Pattern::generate(&keys(&[1, 2, 3, 4]), ArpeggiatorPattern::UpDownHold);
            assert_notes(&[1, 2, 3, 4, 4, 3, 2, 1], &pattern);
        }

        #[test]
        fn single_key_plays_once() {
            let pattern = Pattern::generate(&keys(&[9]), ArpeggiatorPattern::UpDownHold);
            assert_notes(&[9], &pattern);
        }

        #[test]
        fn full_set_fits() {
            let values: ArrayVec<[u8; HELD_KEYS_CAPACITY]> =
                (60..60 + HELD_KEYS_CAPACITY as u8).collect();
            let pattern = Pattern::generate(&keys(&values), ArpeggiatorPattern::UpDownHold);
            assert_eq!(PATTERN_CAPACITY, pattern.len());
        }
    }

    #[test]
    fn random_is_laid_out_as_up() {
        let held = keys(&[64, 60, 67]);
        assert_eq!(
            Pattern::generate(&held, ArpeggiatorPattern::Up),
            Pattern::generate(&held, ArpeggiatorPattern::Random),
            "Expected left but got right"
        );
    }

    #[test]
    fn no_keys_no_steps() {
        let held = HeldKeys::new();
        for style in [
            ArpeggiatorPattern::Up,
            ArpeggiatorPattern::Down,
            ArpeggiatorPattern::UpDown,
            ArpeggiatorPattern::UpDownHold,
            ArpeggiatorPattern::Random,
        ] {
            assert!(Pattern::generate(&held, style).is_empty(), "{style:?}");
        }
    }

    #[test]
    fn regeneration_is_idempotent() {
        let held = keys(&[50, 52, 55, 59, 62]);
        let first = Pattern::generate(&held, ArpeggiatorPattern::UpDown);
        let second = Pattern::generate(&held, ArpeggiatorPattern::UpDown);
        assert_eq!(first, second, "Expected left but got right");
    }
}
