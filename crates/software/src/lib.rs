//! This crate contains architecture-agnostic logic for a serial [MIDI](https://midi.org/midi-1-0) arpeggiator: a byte-stream
//! parser producing MIDI messages, an engine that turns the keys being held into a repeating note pattern, and the clocks
//! that advance that pattern, either from a BPM setting or from the MIDI clock of another device.
//!
//! Nothing here allocates, blocks, or loops unboundedly, so every entry point may be called from interrupt context.

#![deny(missing_docs)]
#![no_std]

/// Turns held keys into a cyclic note pattern and steps through it.
pub mod arpeggiator;

/// Tick sources which drive the [`arpeggiator`].
pub mod clock;

pub mod configuration;

pub mod midi_input;

pub mod parameter;
