//! MIDI input over DIN and USB, dispatch of parsed messages to the sequencer, and DIN MIDI output.

use crate::{
    Disconnected,
    sequencer::{
        SharedSequencer, TEMPO_SYNC, TRANSPORT_SYNC, Transport, NOTE_EVENTS, accepts_pulses_from,
        emit_off, emit_step, with_sequencer,
    },
};
use arpeggio_lib::{
    arpeggiator::ArpeggiatorParam,
    clock::Clock,
    configuration::ClockSource,
    midi_input::{MidiInput, MidiMessage, SystemRealtime},
};
use defmt::*;
use embassy_stm32::{
    mode::Async,
    usart::{RingBufferedUartRx, UartTx},
    usb,
};
use embassy_usb::class::midi::MidiClass;
use wmidi::{ControlFunction, U7};

/// Channel the arpeggiator plays on.
const OUTPUT_CHANNEL: wmidi::Channel = wmidi::Channel::Ch1;

/// First of the (otherwise undefined) controllers mapped onto [`ArpeggiatorParam`]s, in parameter order.
const FIRST_PARAM_CONTROLLER: u8 = 20;

/// Task reading the DIN MIDI input.
#[embassy_executor::task]
pub async fn din_midi_in(
    mut rx: RingBufferedUartRx<'static>,
    sequencer: &'static SharedSequencer,
) -> ! {
    let mut parser = MidiInput::new();
    let mut buf = [0; 32];
    loop {
        match rx.read(&mut buf).await {
            Ok(n) => parse_into(&mut parser, &buf[..n], sequencer),
            // overruns and framing errors cost the bytes involved; the parser resyncs on the next status byte
            Err(e) => warn!("DIN MIDI read error: {}", e),
        }
    }
}

/// Task writing the arpeggiator's note events to the DIN MIDI output.
#[embassy_executor::task]
pub async fn din_midi_out(mut tx: UartTx<'static, Async>) -> ! {
    let mut buf = [0; 3];
    loop {
        let event = NOTE_EVENTS.receive().await;
        let message = event.to_midi(OUTPUT_CHANNEL);
        match message.copy_to_slice(&mut buf) {
            Ok(n) => {
                if let Err(e) = tx.write(&buf[..n]).await {
                    warn!("DIN MIDI write error: {}", e);
                }
            }
            Err(_) => error!("{} does not fit the output buffer", event),
        }
    }
}

/// Reads USB MIDI from the host for as long as the device runs, reconnecting after each unplug. Parser state
/// carries across connections so a message split by a reconnect is dropped at the next status byte.
#[embassy_executor::task]
pub async fn usb_midi_in(
    mut class: MidiClass<'static, crate::UsbDriver>,
    sequencer: &'static SharedSequencer,
) -> ! {
    let mut parser = MidiInput::new();
    loop {
        class.wait_connection().await;
        info!("USB connected");
        let _ = process_usb_midi(&mut class, &mut parser, sequencer).await;
        info!("USB disconnected");
    }
}

/// Helper function which feeds the MIDI carried by USB-MIDI Event Packets to `parser`.
async fn process_usb_midi<'d, T: usb::Instance + 'd>(
    class: &mut MidiClass<'d, usb::Driver<'d, T>>,
    parser: &mut MidiInput,
    sequencer: &'static SharedSequencer,
) -> Result<(), Disconnected> {
    let mut buf = [0; 64];
    loop {
        let n = class.read_packet(&mut buf).await?;
        for packet in buf[..n].chunks(4) {
            if packet.len() != 4 {
                error!("USB-MIDI Event Packets must always be 32 bits long");
                continue;
            }
            parse_into(parser, usb_midi_payload(packet), sequencer);
        }
    }
}

/// The MIDI bytes of a USB-MIDI Event Packet.
///
/// The low nibble of the header is the Code Index Number, which gives the length of the message; the rest of the packet
/// is padding that must not reach the parser, where it would read as running status data.
fn usb_midi_payload(packet: &[u8]) -> &[u8] {
    let len = match packet[0] & 0x0F {
        0x5 | 0xF => 1,
        0x2 | 0x6 | 0xC | 0xD => 2,
        0x3 | 0x4 | 0x7 | 0x8 | 0x9 | 0xA | 0xB | 0xE => 3,
        // reserved for future use
        _ => 0,
    };
    &packet[1..=len]
}

fn parse_into(parser: &mut MidiInput, bytes: &[u8], sequencer: &'static SharedSequencer) {
    for &byte in bytes {
        if let Some(message) = parser.parse(byte) {
            dispatch(message, sequencer);
        }
    }
}

/// Acts on a parsed message.
fn dispatch(message: MidiMessage, sequencer: &'static SharedSequencer) {
    match message {
        MidiMessage::NoteOn(_, note, velocity) if u8::from(velocity) == 0 => {
            emit_off(with_sequencer(sequencer, |s| s.arpeggiator.remove_note(note)));
        }
        MidiMessage::NoteOn(_, note, _) => {
            with_sequencer(sequencer, |s| s.arpeggiator.add_note(note));
        }
        MidiMessage::NoteOff(_, note, _) => {
            emit_off(with_sequencer(sequencer, |s| s.arpeggiator.remove_note(note)));
        }
        MidiMessage::ControlChange(_, ControlFunction::ALL_NOTES_OFF, _) => {
            info!("All Notes Off received");
            emit_off(with_sequencer(sequencer, |s| s.arpeggiator.clear()));
        }
        MidiMessage::ControlChange(_, function, value) => set_param_from_controller(function, value, sequencer),
        MidiMessage::SysExRealtime(SystemRealtime::TimingClock) => {
            if accepts_pulses_from(ClockSource::External) {
                let step = with_sequencer(sequencer, |s| {
                    if s.external_clock.clock() {
                        s.arpeggiator.tick()
                    } else {
                        None
                    }
                });
                if let Some(step) = step {
                    emit_step(step);
                }
            }
        }
        MidiMessage::SysExRealtime(SystemRealtime::Start | SystemRealtime::Continue) => {
            info!("Transport running");
            with_sequencer(sequencer, |s| {
                s.external_clock.restart();
                s.arpeggiator.restart();
            });
            TRANSPORT_SYNC.sender().send(Transport::Running);
        }
        MidiMessage::SysExRealtime(SystemRealtime::Stop) => {
            info!("Transport stopped");
            TRANSPORT_SYNC.sender().send(Transport::Stopped);
            emit_off(with_sequencer(sequencer, |s| s.arpeggiator.release()));
        }
        MidiMessage::SysExRealtime(SystemRealtime::Reset) => {
            info!("System Reset received");
            emit_off(with_sequencer(sequencer, |s| s.arpeggiator.clear()));
        }
        other => debug!("Ignoring {}", other),
    }
}

/// Controllers 20 through 24 set Mode, Speed, Pattern, Scale and Velocity, the 0-127 controller range spread over each
/// parameter's range.
fn set_param_from_controller(
    function: ControlFunction,
    value: U7,
    sequencer: &'static SharedSequencer,
) {
    let Some(param) = u8::from(function.0)
        .checked_sub(FIRST_PARAM_CONTROLLER)
        .and_then(|index| ArpeggiatorParam::ALL.get(usize::from(index)))
        .copied()
    else {
        return;
    };

    let (min, max) = param.range();
    let span = u16::from(max - min) + 1;
    let raw = min + (u16::from(u8::from(value)) * span / 128) as u8;

    let (value, off) = with_sequencer(sequencer, |s| {
        let value = s.arpeggiator.set_param(param, raw);
        // changing mode leaves no keys behind from the previous one
        let off = match param {
            ArpeggiatorParam::Mode => s.arpeggiator.clear(),
            _ => None,
        };
        (value, off)
    });
    emit_off(off);
    if param == ArpeggiatorParam::Speed {
        TEMPO_SYNC.sender().send(value);
    }
    info!("{} set to {}", param, value);
}
