use super::Clock;

/// Counts incoming ticks down from a reload value, firing when the count reaches zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockDivider {
    divider: u8,
    count: u8,
}

impl Default for ClockDivider {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ClockDivider {
    /// Constructs a divider which fires on every `divider`th tick, starting a full period from now. A divider of zero
    /// is treated as one.
    pub const fn new(divider: u8) -> Self {
        let divider = if divider == 0 { 1 } else { divider };
        Self {
            divider,
            count: divider,
        }
    }

    /// Getter.
    pub fn divider(&self) -> u8 {
        self.divider
    }

    /// Changes the division ratio and starts a full period from now.
    pub fn set_divider(&mut self, divider: u8) {
        *self = Self::new(divider);
    }

    /// Makes the next tick fire.
    pub fn restart(&mut self) {
        self.count = 1;
    }
}

impl Clock for ClockDivider {
    fn clock(&mut self) -> bool {
        self.count -= 1;
        if self.count == 0 {
            self.count = self.divider;
            true
        } else {
            false
        }
    }
}
