//! Arpeggio is [Embassy](https://embassy.dev)-based firmware for a MIDI arpeggiator. The firmware runs on the
//! [Nucleo-F767ZI development board](https://www.st.com/en/evaluation-tools/nucleo-f767zi.html), which is powered by an
//! F7-series STM32 microcontroller.
//!
//! Notes played on a controller connected over DIN MIDI or USB are collected while held, arranged into a pattern, and
//! played back one at a time on the DIN MIDI output. Steps follow either the device's own tempo or the MIDI clock of
//! another device.

#![no_std]
#![no_main]

mod clock;
mod controls;
mod midi;
mod sequencer;

use crate::sequencer::{CLOCK_SOURCE_SYNC, Sequencer, SharedSequencer, TEMPO_SYNC};
use core::cell::RefCell;
use defmt::{panic, *};
use embassy_executor::Spawner;
use embassy_stm32::{
    Config, bind_interrupts,
    exti::ExtiInput,
    gpio::{Level, Output, Pull, Speed},
    peripherals,
    time::Hertz,
    usart::{self, Uart},
    usb,
};
use embassy_sync::blocking_mutex::Mutex;
use embassy_usb::{Builder, UsbDevice, class::midi::MidiClass, driver::EndpointError};
use static_cell::StaticCell;

#[cfg(feature = "debug")]
use {defmt_rtt as _, panic_probe as _};

#[cfg(not(feature = "debug"))]
use panic_halt as _;

bind_interrupts!(
    #[doc(hidden)]
    struct Irqs {
        OTG_FS => usb::InterruptHandler<peripherals::USB_OTG_FS>;
        USART2 => usart::InterruptHandler<peripherals::USART2>;
    }
);

type UsbDriver = usb::Driver<'static, peripherals::USB_OTG_FS>;

/// Baud rate of a MIDI 1.0 DIN connection.
const MIDI_BAUD_RATE: u32 = 31_250;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Initializing Arpeggio");

    let mut config = Config::default();
    {
        use embassy_stm32::rcc::*;
        // hse: high-speed external clock
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Bypass,
        });

        // pll: phase-locked loop, crucial for dividing clock
        config.rcc.pll_src = PllSource::HSE;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL216,
            divp: Some(PllPDiv::DIV2), // 8mhz / 4 * 216 / 2 = 216Mhz
            // per section 5.2 of RM0410: most peripheral clocks are derived from their bus clock, but the 48MHz clock used for USB OTG FS
            // is derived from main PLL VCO (PLLQ clock) or PLLSAI VCO (PLLSAI clock)
            divq: Some(PllQDiv::DIV9), // 8mhz / 4 * 216 / 9 = 48Mhz
            divr: None,
        });
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV4;
        config.rcc.apb2_pre = APBPrescaler::DIV2;
        config.rcc.sys = Sysclk::PLL1_P;
        config.rcc.mux.clk48sel = mux::Clk48sel::PLL1_Q;
    }
    let p = embassy_stm32::init(config);

    static SEQUENCER: StaticCell<SharedSequencer> = StaticCell::new();
    let sequencer = SEQUENCER.init(Mutex::new(RefCell::new(Sequencer::default())));

    let button = ExtiInput::new(p.PC13, p.EXTI13, Pull::None);
    unwrap!(spawner.spawn(controls::select_mode(button, sequencer)));

    let button = ExtiInput::new(p.PD1, p.EXTI1, Pull::Up);
    unwrap!(spawner.spawn(controls::select_pattern(button, sequencer)));

    let red_led = Output::new(p.PB14, Level::Low, Speed::Low);
    unwrap!(spawner.spawn(controls::display_pattern(red_led, sequencer)));

    let button = ExtiInput::new(p.PD0, p.EXTI0, Pull::Up);
    let blue_led = Output::new(p.PB7, Level::Low, Speed::Low);
    unwrap!(spawner.spawn(controls::select_clock_source(
        button,
        blue_led,
        CLOCK_SOURCE_SYNC.sender()
    )));

    // DIN MIDI on USART2: TX on PD5, RX on PD6
    let mut uart_config = usart::Config::default();
    uart_config.baudrate = MIDI_BAUD_RATE;
    let uart = Uart::new(
        p.USART2,
        p.PD6,
        p.PD5,
        Irqs,
        p.DMA1_CH6,
        p.DMA1_CH5,
        uart_config,
    )
    .expect("USART2 should accept the MIDI configuration");
    let (tx, rx) = uart.split();
    static DIN_RX_BUFFER: StaticCell<[u8; 64]> = StaticCell::new();
    let rx = rx.into_ring_buffered(DIN_RX_BUFFER.init([0; 64]));
    unwrap!(spawner.spawn(midi::din_midi_in(rx, sequencer)));
    unwrap!(spawner.spawn(midi::din_midi_out(tx)));

    // Create the driver, from the HAL.
    static ENDPOINT_OUT_BUFFER: StaticCell<[u8; 256]> = StaticCell::new();
    let mut config = embassy_stm32::usb::Config::default();

    // USB devices which are self-powered (i.e., that can stay powered on if unplugged from the host)
    // need to enable vbus_detection to comply with the USB standard. Per section 6.10 of the Nucleo board
    // manual (UM1974), CN13 (the USB port) cannot power the board; external power is necessary.
    // See docs on `vbus_detection` for details.
    config.vbus_detection = true;

    let driver = usb::Driver::new_fs(
        p.USB_OTG_FS,
        Irqs,
        p.PA12,
        p.PA11,
        ENDPOINT_OUT_BUFFER.init([0; 256]),
        config,
    );

    // per https://pid.codes, FOSS projects can apply to be listed under the vendor ID owned by InterBiometrics
    let vendor_id = 0x1209;
    let product_id = 0xA4BE;

    let mut config = embassy_usb::Config::new(vendor_id, product_id);
    config.manufacturer = Some("Pawpaw Works");
    config.product = Some("Arpeggio");
    config.self_powered = true;
    config.max_power = 0;

    // Create embassy-usb DeviceBuilder using the driver and config.
    // It needs some buffers for building the descriptors.
    static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUFFER: StaticCell<[u8; 64]> = StaticCell::new();

    let mut builder = Builder::new(
        driver,
        config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [], // no msos descriptors
        CONTROL_BUFFER.init([0; 64]),
    );

    // Create classes on the builder.
    let class = MidiClass::new(&mut builder, 0, 1, 64);

    // Build the builder.
    let usb = builder.build();

    unwrap!(spawner.spawn(usb_task(usb)));
    unwrap!(spawner.spawn(midi::usb_midi_in(class, sequencer)));

    let tempo = TEMPO_SYNC
        .receiver()
        .expect("Tempo synchronizer should have a receiver available");
    unwrap!(spawner.spawn(clock::internal_clock(sequencer, tempo)));
}

#[embassy_executor::task]
async fn usb_task(mut usb: UsbDevice<'static, UsbDriver>) -> ! {
    usb.run().await
}

#[doc(hidden)]
struct Disconnected {}

impl From<EndpointError> for Disconnected {
    fn from(val: EndpointError) -> Self {
        match val {
            EndpointError::BufferOverflow => panic!("Buffer overflow"),
            EndpointError::Disabled => Disconnected {},
        }
    }
}
