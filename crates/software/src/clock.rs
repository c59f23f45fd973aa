mod divider;
pub use divider::*;

mod external;
pub use external::*;

mod internal;
pub use internal::*;

/// Slowest tempo the internal clock runs at; BPM parameters are stored as an offset above it.
pub const MIN_BPM: u16 = 45;

/// Tempo of a freshly constructed internal clock.
pub const DEFAULT_BPM: u16 = 130;

/// Resolution of the pulses the internal clock produces, in pulses per quarter note.
pub const REFERENCE_PPQN: u32 = 24;

/// A source of logical clock pulses, reduced from some faster tick stream.
///
/// Implementors only count; they know nothing of what the pulses drive.
pub trait Clock {
    /// Counts one incoming tick. Returns true if it completes a logical pulse.
    fn clock(&mut self) -> bool;
}
