//! Provides [`Param`], a small integer setting whose adjustments stay within caller-supplied bounds.

/// A raw `u8` setting which can be nudged up or down without ever leaving its range.
///
/// The bounds are not stored; callers pass them on each adjustment. This keeps the value a single byte, which is what
/// ends up in a persisted parameter record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Param(u8);

impl Param {
    /// Constructs a [`Param`] holding `value`.
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Getter.
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Setter. Performs no range checks.
    pub fn set(&mut self, value: u8) {
        self.0 = value;
    }

    /// Adds one, stopping at `max`. Returns the new value.
    pub fn increment(&mut self, max: u8) -> u8 {
        self.increase(1, max)
    }

    /// Subtracts one, stopping at `min`. Returns the new value.
    pub fn decrement(&mut self, min: u8) -> u8 {
        self.decrease(1, min)
    }

    /// Adds `by`, stopping at `max`. Returns the new value.
    pub fn increase(&mut self, by: u8, max: u8) -> u8 {
        self.0 = self.0.saturating_add(by).min(max);
        self.0
    }

    /// Subtracts `by`, stopping at `min`. Returns the new value.
    pub fn decrease(&mut self, by: u8, min: u8) -> u8 {
        self.0 = self.0.saturating_sub(by).max(min);
        self.0
    }

    /// Adds one, wrapping around to `min` once `max` has been passed. Returns the new value.
    ///
    /// Suited to pushbutton inputs, where one button steps through every available setting.
    pub fn increment_rollover(&mut self, min: u8, max: u8) -> u8 {
        self.0 = if self.0 >= max { min } else { self.0 + 1 };
        self.0
    }
}

impl From<Param> for u8 {
    fn from(param: Param) -> Self {
        param.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_clamps_at_max() {
        let mut p = Param::new(3);
        assert_eq!(4, p.increment(4), "Expected left but got right");
        assert_eq!(4, p.increment(4), "Should not exceed max");
    }

    #[test]
    fn decrement_clamps_at_min() {
        let mut p = Param::new(1);
        assert_eq!(0, p.decrement(0), "Expected left but got right");
        assert_eq!(0, p.decrement(0), "Should not fall below min");
    }

    #[test]
    fn increase_saturates_rather_than_overflow() {
        let mut p = Param::new(250);
        assert_eq!(255, p.increase(10, 255), "Expected left but got right");
    }

    #[test]
    fn decrease_respects_nonzero_min() {
        let mut p = Param::new(12);
        assert_eq!(10, p.decrease(5, 10), "Expected left but got right");
    }

    #[test]
    fn increment_rollover_wraps() {
        let mut p = Param::new(1);
        assert_eq!(2, p.increment_rollover(0, 2));
        assert_eq!(0, p.increment_rollover(0, 2), "Should wrap around to min");
        assert_eq!(1, p.increment_rollover(0, 2));
    }

    #[test]
    fn increment_rollover_recovers_from_out_of_range_value() {
        let mut p = Param::new(9);
        assert_eq!(
            0,
            p.increment_rollover(0, 4),
            "Expected a value above max to wrap to min"
        );
    }
}
