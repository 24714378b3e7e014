//! PollScheduler: runs one poll-decode-translate-submit cycle per interval.

use crate::layout::ButtonLayout;
use crate::output::{OutputError, ReportSink};
use crate::translate::translate;
use embedded_hal::digital::{InputPin, OutputPin, PinState};
use psx_proto::{decode, BusError, ControllerType, DecodeError, PadBus};

/// Default minimum time between two poll cycles.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1;

/// Mutable state carried from one cycle to the next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollContext {
    /// Timestamp of the last cycle that was not throttled.
    pub last_poll_ms: Option<u64>,
    /// Number of cycles that were not throttled.
    pub ticks: u32,
    /// Controller type seen by the last successful decode.
    pub last_type: Option<ControllerType>,
    /// Whether the last completed cycle submitted a report.
    pub link_up: bool,
}

impl PollContext {
    /// Whether enough time has passed since the last cycle.
    #[must_use]
    pub fn is_due(&self, now_ms: u64, interval_ms: u64) -> bool {
        match self.last_poll_ms {
            Some(last) => now_ms.saturating_sub(last) >= interval_ms,
            None => true,
        }
    }
}

/// Why a cycle that ran did not submit a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleError {
    /// The bus exchange failed (usually no controller attached).
    Bus(BusError),
    /// The frame could not be decoded.
    Decode(DecodeError),
    /// The controller type has no HID translation.
    Untranslated(ControllerType),
    /// The sink refused the report.
    Output(OutputError),
}

impl From<BusError> for CycleError {
    fn from(err: BusError) -> Self {
        CycleError::Bus(err)
    }
}

impl From<DecodeError> for CycleError {
    fn from(err: DecodeError) -> Self {
        CycleError::Decode(err)
    }
}

impl From<OutputError> for CycleError {
    fn from(err: OutputError) -> Self {
        CycleError::Output(err)
    }
}

/// Result of one call to [`PollScheduler::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// Called again before the interval elapsed; nothing happened.
    Throttled,
    /// The sink could not take a report; the bus was left alone.
    NotReady,
    /// The cycle ran but produced no report.
    Skipped(CycleError),
    /// A report for this controller type was submitted.
    Submitted(ControllerType),
}

impl CycleOutcome {
    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        matches!(self, CycleOutcome::Submitted(_))
    }
}

/// Polls the controller and forwards translated reports to a sink.
///
/// The scheduler owns the bus, so no other code can clock it while a cycle
/// is running. Time is passed into [`tick`](Self::tick) rather than read
/// from a clock, which keeps the scheduler testable on the host.
///
/// # Error Handling
///
/// Every failure is recovered inside the cycle: no report is sent, the
/// status pin goes low and the next tick tries again. The previous report
/// stays latched on the host.
pub struct PollScheduler<B, O, M, L> {
    bus: B,
    output: O,
    mode_pin: M,
    status_pin: L,
    interval_ms: u64,
    context: PollContext,
}

impl<B, O, M, L> PollScheduler<B, O, M, L>
where
    B: PadBus,
    O: ReportSink,
    M: InputPin,
    L: OutputPin,
{
    /// Create a scheduler polling every [`DEFAULT_POLL_INTERVAL_MS`].
    pub fn new(bus: B, output: O, mode_pin: M, status_pin: L) -> Self {
        Self::with_interval(bus, output, mode_pin, status_pin, DEFAULT_POLL_INTERVAL_MS)
    }

    /// Create a scheduler with a custom poll interval.
    pub fn with_interval(bus: B, output: O, mode_pin: M, status_pin: L, interval_ms: u64) -> Self {
        Self {
            bus,
            output,
            mode_pin,
            status_pin,
            interval_ms,
            context: PollContext::default(),
        }
    }

    /// Run one cycle if the interval has elapsed and the sink is ready.
    ///
    /// Calling faster than the interval is a no-op. A late call runs a
    /// single cycle; missed cycles are not made up.
    pub fn tick(&mut self, now_ms: u64) -> CycleOutcome {
        if !self.context.is_due(now_ms, self.interval_ms) {
            return CycleOutcome::Throttled;
        }
        self.context.last_poll_ms = Some(now_ms);
        self.context.ticks = self.context.ticks.wrapping_add(1);

        if !self.output.is_ready() {
            return CycleOutcome::NotReady;
        }

        let outcome = match self.run_cycle() {
            Ok(kind) => CycleOutcome::Submitted(kind),
            Err(e) => {
                trace!("cycle skipped: {:?}", e);
                CycleOutcome::Skipped(e)
            }
        };
        self.set_link(outcome);
        outcome
    }

    fn run_cycle(&mut self) -> Result<ControllerType, CycleError> {
        let frame = self.bus.poll()?;
        let reading = decode(frame.as_slice())?;

        if self.context.last_type != Some(reading.kind) {
            debug!("controller type: {:?}", reading.kind);
        }
        self.context.last_type = Some(reading.kind);

        let report = translate(reading.kind, &reading.payload, self.layout())
            .ok_or(CycleError::Untranslated(reading.kind))?;
        self.output.submit(&report)?;

        Ok(reading.kind)
    }

    /// Read the mode switch. Not cached, so the layout can change between polls.
    fn layout(&mut self) -> ButtonLayout {
        // An unreadable pin counts as the pulled-up idle level.
        ButtonLayout::from_mode_pin(self.mode_pin.is_high().unwrap_or(true))
    }

    fn set_link(&mut self, outcome: CycleOutcome) {
        let up = outcome.is_submitted();
        if up != self.context.link_up {
            match outcome {
                CycleOutcome::Submitted(kind) => debug!("pad link up: {:?}", kind),
                other => debug!("pad link down: {:?}", other),
            }
        }
        self.context.link_up = up;
        // The status pin is cosmetic; a failure to drive it is ignored.
        let _ = self.status_pin.set_state(PinState::from(up));
    }

    /// State carried across cycles.
    pub fn context(&self) -> &PollContext {
        &self.context
    }

    /// Controller type seen by the last successful decode.
    pub fn last_type(&self) -> Option<ControllerType> {
        self.context.last_type
    }

    /// Get a reference to the bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Get a reference to the report sink.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Get a mutable reference to the report sink.
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Decompose the scheduler into its bus, sink and pins.
    pub fn into_parts(self) -> (B, O, M, L) {
        (self.bus, self.output, self.mode_pin, self.status_pin)
    }
}
