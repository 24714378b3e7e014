#![no_std]
#![no_main]

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_time::{Duration, Instant, Ticker};
use embassy_usb::class::hid::{HidReader, State};
use embassy_usb::{Builder, Config as UsbConfig, UsbDevice};
use psx_to_hid_rp2040::config::{
    HID_PACKET_SIZE, POLL_INTERVAL_MS, USB_MANUFACTURER, USB_MAX_POWER_MA, USB_PID, USB_PRODUCT,
    USB_SERIAL, USB_VID,
};
use psx_to_hid_rp2040::{
    configure_usb_hid, new_pad_bus, EchoRequestHandler, PadScheduler, UsbDriver,
    UsbHidOutput, UsbHidWriter, UsbStateHandler,
};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

/// USB device configuration buffer.
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// HID state.
static HID_STATE: StaticCell<State> = StaticCell::new();

static USB_STATE_HANDLER: StaticCell<UsbStateHandler> = StaticCell::new();
static CONTROL_ECHO_HANDLER: StaticCell<EchoRequestHandler> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("PSX-to-HID starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- Controller bus ---
    let pad_bus = new_pad_bus(p.SPI0, p.PIN_16, p.PIN_17, p.PIN_18, p.PIN_19, p.PIN_20);
    let mode_pin = Input::new(p.PIN_21, Pull::Up);
    let status_led = Output::new(p.PIN_25, Level::Low);

    // --- USB Setup ---
    let usb_driver = Driver::new(p.USB, Irqs);

    let mut usb_config = UsbConfig::new(USB_VID, USB_PID);
    usb_config.manufacturer = Some(USB_MANUFACTURER);
    usb_config.product = Some(USB_PRODUCT);
    usb_config.serial_number = Some(USB_SERIAL);
    usb_config.max_power = USB_MAX_POWER_MA;
    usb_config.max_packet_size_0 = 64;

    let config_descriptor = CONFIG_DESCRIPTOR.init([0; 256]);
    let bos_descriptor = BOS_DESCRIPTOR.init([0; 256]);
    let msos_descriptor = MSOS_DESCRIPTOR.init([0; 256]);
    let control_buf = CONTROL_BUF.init([0; 64]);

    let mut builder = Builder::new(
        usb_driver,
        usb_config,
        config_descriptor,
        bos_descriptor,
        msos_descriptor,
        control_buf,
    );
    builder.handler(USB_STATE_HANDLER.init(UsbStateHandler));

    // Configure HID class
    let hid_state = HID_STATE.init(State::new());
    let hid = configure_usb_hid(
        &mut builder,
        hid_state,
        CONTROL_ECHO_HANDLER.init(EchoRequestHandler),
    );
    let (hid_reader, hid_writer) = hid.split();

    // Build the USB device
    let usb_device = builder.build();

    let scheduler = PadScheduler::with_interval(
        pad_bus,
        UsbHidOutput,
        mode_pin,
        status_led,
        POLL_INTERVAL_MS,
    );

    // Spawn tasks (unwrap the SpawnToken, then spawn)
    spawner.spawn(usb_task(usb_device).unwrap());
    spawner.spawn(hid_in_task(UsbHidWriter::new(hid_writer)).unwrap());
    spawner.spawn(hid_out_task(hid_reader).unwrap());
    spawner.spawn(poll_task(scheduler).unwrap());

    info!("PSX-to-HID initialized, polling controller...");
}

/// USB device task - runs the USB stack.
#[embassy_executor::task]
async fn usb_task(mut device: UsbDevice<'static, UsbDriver>) {
    device.run().await;
}

/// HID input task - writes the latest report (or host echo) to the host.
#[embassy_executor::task]
async fn hid_in_task(mut writer: UsbHidWriter<'static>) {
    writer.run().await;
}

/// HID output task - receives host output reports and queues them for echo.
#[embassy_executor::task]
async fn hid_out_task(reader: HidReader<'static, UsbDriver, HID_PACKET_SIZE>) {
    let mut handler = EchoRequestHandler;
    reader.run(false, &mut handler).await;
}

/// Poll task - drives one scheduler cycle per tick.
#[embassy_executor::task]
async fn poll_task(mut scheduler: PadScheduler) {
    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));

    loop {
        ticker.next().await;
        // Outcomes are logged by the scheduler and shown on the status LED.
        scheduler.tick(Instant::now().as_millis());
    }
}
