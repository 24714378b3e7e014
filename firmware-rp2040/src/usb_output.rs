//! USB HID gamepad output implementation.
//!
//! The poll task hands reports to the USB writer task through a
//! [`Signal`], so only the most recent report is ever pending. Host
//! SET_REPORT payloads travel back the same way on a second signal.

use defmt::{debug, info, warn};
use embassy_futures::select::{select, Either};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_usb::class::hid::{
    HidBootProtocol, HidReaderWriter, HidSubclass, HidWriter, ReportId, RequestHandler, State,
};
use embassy_usb::control::OutResponse;
use embassy_usb::{Builder, Handler};
use portable_atomic::{AtomicBool, Ordering};
use psx_hid_core::{HidReport, HostEcho, OutputError, ReportSink};

use crate::config::{HID_PACKET_SIZE, HID_POLL_MS};

pub type UsbDriver = Driver<'static, USB>;

/// HID reader/writer pair as returned by [`configure_usb_hid`].
pub type PadHid<'d> =
    HidReaderWriter<'d, Driver<'d, USB>, HID_PACKET_SIZE, HID_PACKET_SIZE>;

/// Latest report waiting for the input endpoint.
static REPORT_SIGNAL: Signal<CriticalSectionRawMutex, HidReport> = Signal::new();

/// Latest host payload waiting to be echoed.
static ECHO_SIGNAL: Signal<CriticalSectionRawMutex, HostEcho> = Signal::new();

static USB_CONFIGURED: AtomicBool = AtomicBool::new(false);
static USB_SUSPENDED: AtomicBool = AtomicBool::new(false);
static WRITE_IN_FLIGHT: AtomicBool = AtomicBool::new(false);

/// HID Gamepad Report Descriptor.
///
/// This descriptor defines a gamepad with:
/// - 8 buttons
/// - 2 constant padding bytes
/// - 4 axes (X, Y, Z, Rz; unsigned 8-bit, 0x80 centre)
/// - a 7-byte vendor output report, echoed back unchanged
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Gamepad)
    0xA1, 0x01, // Collection (Application)
    //
    // --- Buttons (8 buttons) ---
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x08, //   Usage Maximum (Button 8)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x95, 0x08, //   Report Count (8)
    0x75, 0x01, //   Report Size (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Padding (2 bytes) ---
    0x95, 0x02, //   Report Count (2)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x01, //   Input (Constant)
    //
    // --- Stick and throttle ---
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x09, 0x32, //   Usage (Z)
    0x09, 0x35, //   Usage (Rz)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x95, 0x04, //   Report Count (4)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Host output (echoed) ---
    0x06, 0x00, 0xFF, //   Usage Page (Vendor Defined 0xFF00)
    0x09, 0x01, //   Usage (Vendor 1)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x95, 0x07, //   Report Count (7)
    0x75, 0x08, //   Report Size (8)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    //
    0xC0, // End Collection
];

#[inline]
fn link_up() -> bool {
    USB_CONFIGURED.load(Ordering::Acquire) && !USB_SUSPENDED.load(Ordering::Acquire)
}

#[inline]
fn report_pending() -> bool {
    REPORT_SIGNAL.signaled() || WRITE_IN_FLIGHT.load(Ordering::Acquire)
}

/// USB HID gamepad output.
///
/// Producer side of the report handoff. It never blocks: a report is
/// accepted only while the device is configured and the previous one has
/// already gone out.
#[derive(Clone, Copy, Default)]
pub struct UsbHidOutput;

impl ReportSink for UsbHidOutput {
    fn is_ready(&self) -> bool {
        link_up() && !report_pending()
    }

    fn submit(&mut self, report: &HidReport) -> Result<(), OutputError> {
        if !link_up() {
            return Err(OutputError::NotReady);
        }
        if report_pending() {
            return Err(OutputError::Busy);
        }
        REPORT_SIGNAL.signal(*report);
        Ok(())
    }
}

/// Consumer side: writes reports and host echoes to the input endpoint.
pub struct UsbHidWriter<'d> {
    writer: HidWriter<'d, Driver<'d, USB>, HID_PACKET_SIZE>,
}

impl<'d> UsbHidWriter<'d> {
    pub fn new(writer: HidWriter<'d, Driver<'d, USB>, HID_PACKET_SIZE>) -> Self {
        Self { writer }
    }

    /// Forward signalled reports and echoes forever.
    pub async fn run(&mut self) -> ! {
        self.writer.ready().await;
        info!("USB HID ready, forwarding pad reports...");

        loop {
            match select(REPORT_SIGNAL.wait(), ECHO_SIGNAL.wait()).await {
                Either::First(report) => self.write(&report.as_bytes()).await,
                Either::Second(echo) => {
                    debug!("Echoing {:?}", echo);
                    self.write(echo.as_slice()).await;
                }
            }
        }
    }

    async fn write(&mut self, bytes: &[u8]) {
        WRITE_IN_FLIGHT.store(true, Ordering::Release);
        let result = self.writer.write(bytes).await;
        WRITE_IN_FLIGHT.store(false, Ordering::Release);

        if let Err(e) = result {
            warn!("HID write failed: {:?}", e);
        }
    }
}

/// HID request handler.
///
/// Host output reports are not interpreted; they are queued for echo.
#[derive(Default)]
pub struct EchoRequestHandler;

impl RequestHandler for EchoRequestHandler {
    fn get_report(&mut self, _id: ReportId, _buf: &mut [u8]) -> Option<usize> {
        None
    }

    fn set_report(&mut self, _id: ReportId, data: &[u8]) -> OutResponse {
        ECHO_SIGNAL.signal(HostEcho::capture(data));
        OutResponse::Accepted
    }

    fn set_idle_ms(&mut self, _id: Option<ReportId>, _duration_ms: u32) {}

    fn get_idle_ms(&mut self, _id: Option<ReportId>) -> Option<u32> {
        None
    }
}

/// Tracks the USB device state that gates [`UsbHidOutput::is_ready`].
#[derive(Default)]
pub struct UsbStateHandler;

impl Handler for UsbStateHandler {
    fn reset(&mut self) {
        USB_CONFIGURED.store(false, Ordering::Release);
        USB_SUSPENDED.store(false, Ordering::Release);
        REPORT_SIGNAL.reset();
    }

    fn configured(&mut self, configured: bool) {
        USB_CONFIGURED.store(configured, Ordering::Release);
        if configured {
            info!("USB configured");
        } else {
            info!("USB deconfigured");
        }
    }

    fn suspended(&mut self, suspended: bool) {
        USB_SUSPENDED.store(suspended, Ordering::Release);
        debug!("USB suspended: {}", suspended);
    }
}

/// Configure the USB HID class in the USB builder.
///
/// `control_handler` receives SET_REPORT requests sent over the control
/// pipe; OUT endpoint reports are handled by the reader's own handler.
pub fn configure_usb_hid<'d>(
    builder: &mut Builder<'d, Driver<'d, USB>>,
    state: &'d mut State<'d>,
    control_handler: &'d mut EchoRequestHandler,
) -> PadHid<'d> {
    let config = embassy_usb::class::hid::Config {
        report_descriptor: REPORT_DESCRIPTOR,
        request_handler: Some(control_handler),
        poll_ms: HID_POLL_MS,
        max_packet_size: HID_PACKET_SIZE as u16,
        hid_subclass: HidSubclass::No,
        hid_boot_protocol: HidBootProtocol::None,
    };

    HidReaderWriter::new(builder, state, config)
}
