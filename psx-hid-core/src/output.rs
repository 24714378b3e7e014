//! Report sink trait and error types.

use crate::report::HidReport;

/// Error type for output operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// Device not ready (e.g., USB not enumerated).
    NotReady,
    /// A previous report has not been picked up yet.
    Busy,
    /// USB/communication I/O error.
    Io,
}

/// Destination for HID reports, usually the USB HID input endpoint.
///
/// The sink never queues: at most one report is in flight, and the scheduler
/// only submits when [`is_ready`](ReportSink::is_ready) says so.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait ReportSink {
    /// Check if the sink can take a new report right now.
    fn is_ready(&self) -> bool;

    /// Hand one report to the host-facing side.
    ///
    /// Returns an error if the report was rejected; the caller drops it.
    fn submit(&mut self, report: &HidReport) -> Result<(), OutputError>;
}

impl<T: ReportSink + ?Sized> ReportSink for &mut T {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn submit(&mut self, report: &HidReport) -> Result<(), OutputError> {
        (**self).submit(report)
    }
}
