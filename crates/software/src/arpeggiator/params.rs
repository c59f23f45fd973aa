//! The arpeggiator's user-adjustable parameters and the record they are saved to as part of a scene.

use embassy_time::Duration;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use wmidi::{U7, Velocity};

use crate::{
    clock::{DEFAULT_BPM, MIN_BPM},
    configuration::{ArpeggiatorMode, ArpeggiatorPattern, Scale},
    parameter::Param,
};

/// Identifies one arpeggiator parameter. The discriminant is the parameter's position in a saved record.
#[derive(Debug, Copy, Clone, ToPrimitive, FromPrimitive, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArpeggiatorParam {
    /// Raw [`ArpeggiatorMode`].
    Mode,
    /// Tempo of the internal clock, as an offset above [`MIN_BPM`].
    Speed,
    /// Raw [`ArpeggiatorPattern`].
    Pattern,
    /// Raw [`Scale`].
    Scale,
    /// Velocity of every note the arpeggiator plays.
    Velocity,
}

impl ArpeggiatorParam {
    /// Every parameter, in record order.
    pub const ALL: [Self; SCENE_RECORD_LEN] = [
        Self::Mode,
        Self::Speed,
        Self::Pattern,
        Self::Scale,
        Self::Velocity,
    ];

    /// Inclusive bounds of the raw value.
    pub const fn range(&self) -> (u8, u8) {
        match self {
            Self::Mode => (0, ArpeggiatorMode::MAX),
            Self::Speed => (0, u8::MAX),
            Self::Pattern => (0, ArpeggiatorPattern::MAX),
            Self::Scale => (0, Scale::MAX),
            Self::Velocity => (0, 127),
        }
    }

    const fn index(&self) -> usize {
        *self as usize
    }
}

/// Size of a saved parameter record in bytes.
pub const SCENE_RECORD_LEN: usize = 5;

/// Returned when a saved parameter record cannot be restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SceneError {
    /// The record was not [`SCENE_RECORD_LEN`] bytes long.
    WrongLength(usize),
}

impl core::fmt::Display for SceneError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::WrongLength(len) => write!(
                f,
                "parameter record must be {SCENE_RECORD_LEN} bytes long, got {len}"
            ),
        }
    }
}

/// Raw values of every [`ArpeggiatorParam`], each kept within its range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArpeggiatorParams {
    params: [Param; SCENE_RECORD_LEN],
}

impl Default for ArpeggiatorParams {
    fn default() -> Self {
        let mut params = [Param::default(); SCENE_RECORD_LEN];
        params[ArpeggiatorParam::Mode.index()] = Param::new(ArpeggiatorMode::Off as u8);
        params[ArpeggiatorParam::Speed.index()] = Param::new((DEFAULT_BPM - MIN_BPM) as u8);
        params[ArpeggiatorParam::Pattern.index()] = Param::new(ArpeggiatorPattern::Up as u8);
        params[ArpeggiatorParam::Scale.index()] = Param::new(Scale::Quarter as u8);
        params[ArpeggiatorParam::Velocity.index()] = Param::new(127);
        Self { params }
    }
}

impl ArpeggiatorParams {
    /// Raw value of `param`.
    pub fn param(&self, param: ArpeggiatorParam) -> u8 {
        self.params[param.index()].value()
    }

    /// Sets `param`, clamping `value` into range. Returns the value stored.
    pub fn set_param(&mut self, param: ArpeggiatorParam, value: u8) -> u8 {
        let (min, max) = param.range();
        let slot = &mut self.params[param.index()];
        slot.set(value.clamp(min, max));
        slot.value()
    }

    /// Increments `param`, stopping at the top of its range. Returns the new value.
    pub fn inc_param(&mut self, param: ArpeggiatorParam) -> u8 {
        let (_, max) = param.range();
        self.params[param.index()].increment(max)
    }

    /// Decrements `param`, stopping at the bottom of its range. Returns the new value.
    pub fn dec_param(&mut self, param: ArpeggiatorParam) -> u8 {
        let (min, _) = param.range();
        self.params[param.index()].decrement(min)
    }

    /// Increments `param`, wrapping from the top of its range to the bottom. Returns the new value.
    pub fn toggle_param(&mut self, param: ArpeggiatorParam) -> u8 {
        let (min, max) = param.range();
        self.params[param.index()].increment_rollover(min, max)
    }

    /// Getter.
    pub fn mode(&self) -> ArpeggiatorMode {
        ArpeggiatorMode::from_u8(self.param(ArpeggiatorParam::Mode)).unwrap_or_default()
    }

    /// Getter.
    pub fn pattern(&self) -> ArpeggiatorPattern {
        ArpeggiatorPattern::from_u8(self.param(ArpeggiatorParam::Pattern)).unwrap_or_default()
    }

    /// Getter.
    pub fn scale(&self) -> Scale {
        Scale::from_u8(self.param(ArpeggiatorParam::Scale)).unwrap_or_default()
    }

    /// Getter.
    pub fn velocity(&self) -> Velocity {
        U7::from_u8_lossy(self.param(ArpeggiatorParam::Velocity))
    }

    /// Tempo in beats per minute.
    pub fn bpm(&self) -> u16 {
        MIN_BPM + u16::from(self.param(ArpeggiatorParam::Speed))
    }

    /// Time between two steps at the current tempo and [`Scale`].
    pub fn step_interval(&self) -> Duration {
        let steps_per_minute = u64::from(self.bpm()) << (self.scale() as u8);
        Duration::from_millis(60_000 / steps_per_minute)
    }

    /// Serializes the raw values in [`ArpeggiatorParam`] order.
    pub fn to_bytes(&self) -> [u8; SCENE_RECORD_LEN] {
        self.params.map(u8::from)
    }

    /// Restores a record written by [`Self::to_bytes`]. Values outside a parameter's range are clamped.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SceneError> {
        if bytes.len() != SCENE_RECORD_LEN {
            return Err(SceneError::WrongLength(bytes.len()));
        }
        let mut params = Self::default();
        for (param, &value) in ArpeggiatorParam::ALL.iter().zip(bytes) {
            params.set_param(*param, value);
        }
        Ok(params)
    }
}
