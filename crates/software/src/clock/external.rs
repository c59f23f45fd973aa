use num_traits::FromPrimitive;

use super::{Clock, ClockDivider};
use crate::{configuration::Ppqn, parameter::Param};

/// Timing Clock pulses per sixteenth note at 24 PPQN.
pub const EXTERNAL_BASE_DIVIDER: u8 = 6;

/// Follows the MIDI Timing Clock of another device, producing one pulse per sixteenth note.
///
/// There is no tempo arithmetic here; the sending device sets the tempo through the rate of its pulses. The configured
/// [`Ppqn`] only sets how many incoming pulses make up a sixteenth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExternalClock {
    ppqn: Ppqn,
    divider: ClockDivider,
}

impl Default for ExternalClock {
    fn default() -> Self {
        Self::new(Ppqn::default())
    }
}

impl ExternalClock {
    /// Constructs a clock expecting `ppqn` pulses per quarter note.
    pub fn new(ppqn: Ppqn) -> Self {
        Self {
            ppqn,
            divider: ClockDivider::new(Self::divider_for(ppqn)),
        }
    }

    /// Getter.
    pub fn ppqn(&self) -> Ppqn {
        self.ppqn
    }

    /// Incoming pulses per outgoing pulse.
    pub fn clock_divider(&self) -> u8 {
        Self::divider_for(self.ppqn)
    }

    /// Selects the next higher resolution, if any. Returns the resolution in effect.
    pub fn inc_ppqn(&mut self) -> Ppqn {
        let mut raw = Param::new(self.ppqn as u8);
        self.set_ppqn(raw.increment(Ppqn::MAX))
    }

    /// Selects the next lower resolution, if any. Returns the resolution in effect.
    pub fn dec_ppqn(&mut self) -> Ppqn {
        let mut raw = Param::new(self.ppqn as u8);
        self.set_ppqn(raw.decrement(0))
    }

    /// Makes the next incoming pulse produce a pulse, e.g. on MIDI Start or Continue.
    pub fn restart(&mut self) {
        self.divider.restart();
    }

    fn set_ppqn(&mut self, raw: u8) -> Ppqn {
        let ppqn = Ppqn::from_u8(raw).unwrap_or_default();
        if ppqn != self.ppqn {
            self.ppqn = ppqn;
            self.divider.set_divider(Self::divider_for(ppqn));
        }
        ppqn
    }

    const fn divider_for(ppqn: Ppqn) -> u8 {
        EXTERNAL_BASE_DIVIDER << (ppqn as u8)
    }
}

impl Clock for ExternalClock {
    fn clock(&mut self) -> bool {
        self.divider.clock()
    }
}
