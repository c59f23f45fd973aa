//! Provides [`HeldKeys`], the ordered set of keys currently feeding the arpeggiator.

use tinyvec::{ArrayVec, array_vec};
use wmidi::{Note, U7};

/// Maximum number of keys the arpeggiator tracks at once.
pub const HELD_KEYS_CAPACITY: usize = 10;

/// The keys held down (or, in hold mode, latched) on the controlling keyboard.
///
/// Keys are kept in ascending order without duplicates; pattern generation relies on this. Once
/// [`HELD_KEYS_CAPACITY`] keys are held, further keys are ignored until one is released.
///
/// Internally, this struct uses the [`U7`] type because [`tinyvec`] requires that `Items` implement [`Default`].
/// Public interfaces deal with the related [`Note`] type instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldKeys {
    data: ArrayVec<[U7; HELD_KEYS_CAPACITY]>,
}

#[cfg(feature = "defmt")]
impl defmt::Format for HeldKeys {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "HeldKeys {{ [");
        for (i, &key) in self.data.iter().enumerate() {
            if i != 0 {
                defmt::write!(fmt, ",");
            }
            defmt::write!(fmt, " {} ({})", Note::from(key).to_str(), u8::from(key));
        }
        defmt::write!(fmt, " ] }}");
    }
}

impl HeldKeys {
    /// Construct an empty `HeldKeys`.
    pub fn new() -> Self {
        Self { data: array_vec!() }
    }

    /// Registers a key press. Returns false if the key was already held or no room was left.
    pub fn add(&mut self, note: Note) -> bool {
        let key = U7::from_u8_lossy(note as u8);
        if self.data.len() == self.data.capacity() {
            return false;
        }
        match self.data.binary_search(&key) {
            Ok(_) => false,
            Err(index) => {
                self.data.insert(index, key);
                true
            }
        }
    }

    /// Registers a key release. Returns false if the key wasn't held.
    pub fn remove(&mut self, note: Note) -> bool {
        let key = U7::from_u8_lossy(note as u8);
        match self.data.binary_search(&key) {
            Ok(index) => {
                self.data.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    /// Releases every key.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Determine if any keys are held.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The held keys in ascending order.
    pub fn as_slice(&self) -> &[U7] {
        &self.data
    }

    /// Returns an [`Iterator`] over the held keys, lowest first.
    pub fn iter(&self) -> impl Iterator<Item = Note> + '_ {
        self.data.iter().map(|&key| Note::from(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const C_NOTE: U7 = U7::from_u8_lossy(60);
    const D_NOTE: U7 = U7::from_u8_lossy(62);
    const E_NOTE: U7 = U7::from_u8_lossy(64);
    const G_NOTE: U7 = U7::from_u8_lossy(67);

    fn chord() -> HeldKeys {
        HeldKeys {
            data: array_vec!([U7; HELD_KEYS_CAPACITY] => C_NOTE, E_NOTE, G_NOTE),
        }
    }

    fn is_strictly_ascending(keys: &HeldKeys) -> bool {
        keys.as_slice().windows(2).all(|pair| pair[0] < pair[1])
    }

    #[test]
    fn new() {
        let expected = HeldKeys { data: array_vec!() };
        let actual = HeldKeys::new();
        assert_eq!(expected, actual, "Expected left but got right");
    }

    mod add {
        use super::*;

        #[test]
        fn inserts_in_order() {
            let expected = HeldKeys {
                data: array_vec!([U7; HELD_KEYS_CAPACITY] => C_NOTE, D_NOTE, E_NOTE, G_NOTE),
            };

            let mut actual = chord();
            assert!(actual.add(D_NOTE.into()));

            assert_eq!(expected, actual, "Expected left but got right");
        }

        #[test]
        fn order_of_presses_does_not_matter() {
            let mut actual = HeldKeys::new();
            actual.add(G_NOTE.into());
            actual.add(C_NOTE.into());
            actual.add(E_NOTE.into());

            assert_eq!(chord(), actual, "Expected left but got right");
        }

        #[test]
        fn duplicate_is_ignored() {
            let expected = chord();
            let mut actual = chord();
            assert!(!actual.add(C_NOTE.into()));

            assert_eq!(expected, actual, "Expected left but got right");
        }

        #[test]
        fn ignores_rather_than_overflow() {
            let mut keys = HeldKeys::new();
            for key in 40..40 + HELD_KEYS_CAPACITY as u8 {
                keys.add(Note::from(U7::from_u8_lossy(key)));
            }
            assert_eq!(HELD_KEYS_CAPACITY, keys.len(), "Expected set to be full");
            // end setup

            assert!(!keys.add(Note::C1));
            assert_eq!(HELD_KEYS_CAPACITY, keys.len(), "Expected length not to change");
            assert!(keys.iter().all(|note| note != Note::C1));
        }
    }

    mod remove {
        use super::*;

        #[test]
        fn held_key() {
            let expected = HeldKeys {
                data: array_vec!([U7; HELD_KEYS_CAPACITY] => E_NOTE, G_NOTE),
            };

            let mut actual = chord();
            assert!(actual.remove(C_NOTE.into()));

            assert_eq!(expected, actual, "Expected left but got right");
        }

        #[test]
        fn unheld_key_is_ignored() {
            let mut actual = chord();
            assert!(!actual.remove(D_NOTE.into()));
            assert_eq!(chord(), actual, "Expected left but got right");
        }
    }

    #[test]
    fn stays_ascending_and_unique_through_churn() {
        let mut keys = HeldKeys::new();
        // a deterministic but jumbled sequence of presses and releases
        let mut value: u8 = 17;
        for round in 0..200u16 {
            value = value.wrapping_mul(29).wrapping_add(11) & 0x7F;
            let note = Note::from(U7::from_u8_lossy(value % 24 + 48));
            if round % 3 == 0 {
                keys.remove(note);
            } else {
                keys.add(note);
            }
            assert!(is_strictly_ascending(&keys), "Order broken in round {round}");
            assert!(keys.len() <= HELD_KEYS_CAPACITY);
        }
    }

    #[test]
    fn clear() {
        let mut keys = chord();
        keys.clear();
        assert!(keys.is_empty());
    }

    #[test]
    fn iter() {
        let chord = chord();
        let mut iter = chord.iter();
        assert_eq!(Some(Note::C4), iter.next());
        assert_eq!(Some(Note::E4), iter.next());
        assert_eq!(Some(Note::G4), iter.next());
        assert_eq!(None, iter.next());
    }
}
