//! Bus transport: clocks one poll exchange and observes the acknowledge line.
//!
//! The transport is generic over the `embedded-hal` 1.0 traits so it runs on
//! any MCU with a blocking SPI master, two GPIOs and a delay source.

use crate::command::poll_command_byte;
use crate::types::{payload_len_for_id, RawFrame, HEADER_LEN, MAX_FRAME_LEN};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;

/// Error type for bus operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// The controller did not pulse the acknowledge line after `byte`.
    ///
    /// Expected when no controller is plugged in.
    NoAck { byte: usize },
    /// The SPI peripheral reported an error.
    Spi,
    /// Driving the select line or sampling the acknowledge line failed.
    Pin,
}

/// Something that can run one complete poll exchange with a controller.
pub trait PadBus {
    /// Run one poll exchange and return the bytes the controller sent back.
    ///
    /// Must return within a bounded time even if nothing is attached.
    fn poll(&mut self) -> Result<RawFrame, BusError>;
}

/// Timing and bit-order settings for [`PsxBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    /// Delay between asserting select and the first clock edge.
    pub select_setup_us: u32,
    /// How long to wait for the acknowledge pulse after each byte.
    pub ack_timeout_us: u32,
    /// Interval between acknowledge line samples.
    pub ack_poll_ns: u32,
    /// Bit-reverse every byte. Needed when the SPI block only shifts MSB first.
    pub lsb_first: bool,
}

impl BusConfig {
    /// Settings that work with first-party digital and DualShock pads.
    pub const DEFAULT: Self = Self {
        select_setup_us: 20,
        ack_timeout_us: 100,
        ack_poll_ns: 500,
        lsb_first: true,
    };
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// PSX controller bus built from a SPI master, a select pin, an acknowledge
/// pin and a delay source.
///
/// Select and acknowledge are both active low. The SPI bus must be set up
/// for mode 3 (clock idle high, sample on the second edge) at a few hundred
/// kHz; the controller is not reliable much above 500 kHz.
pub struct PsxBus<SPI, CS, ACK, D> {
    spi: SPI,
    select: CS,
    ack: ACK,
    delay: D,
    config: BusConfig,
}

impl<SPI, CS, ACK, D> PsxBus<SPI, CS, ACK, D>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    ACK: InputPin,
    D: DelayNs,
{
    /// Create a bus with [`BusConfig::DEFAULT`] timing.
    pub fn new(spi: SPI, select: CS, ack: ACK, delay: D) -> Self {
        Self::with_config(spi, select, ack, delay, BusConfig::DEFAULT)
    }

    /// Create a bus with custom timing.
    pub fn with_config(spi: SPI, select: CS, ack: ACK, delay: D, config: BusConfig) -> Self {
        Self {
            spi,
            select,
            ack,
            delay,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Decompose the bus into its peripherals.
    pub fn release(self) -> (SPI, CS, ACK, D) {
        (self.spi, self.select, self.ack, self.delay)
    }

    #[inline]
    fn wire_order(&self, byte: u8) -> u8 {
        if self.config.lsb_first {
            byte.reverse_bits()
        } else {
            byte
        }
    }

    /// Clock one byte out and the controller's answer in.
    fn transfer_byte(&mut self, tx: u8) -> Result<u8, BusError> {
        let mut word = [self.wire_order(tx)];
        self.spi
            .transfer_in_place(&mut word)
            .map_err(|_| BusError::Spi)?;
        self.spi.flush().map_err(|_| BusError::Spi)?;
        Ok(self.wire_order(word[0]))
    }

    /// Wait for the acknowledge pulse, giving up once the deadline passes.
    fn wait_ack(&mut self, byte: usize) -> Result<(), BusError> {
        let deadline_ns = self.config.ack_timeout_us.saturating_mul(1_000);
        let step_ns = self.config.ack_poll_ns.max(1);
        let mut waited_ns: u32 = 0;

        loop {
            if self.ack.is_low().map_err(|_| BusError::Pin)? {
                return Ok(());
            }
            if waited_ns >= deadline_ns {
                return Err(BusError::NoAck { byte });
            }
            self.delay.delay_ns(step_ns);
            waited_ns = waited_ns.saturating_add(step_ns);
        }
    }

    /// Run the exchange with select already asserted.
    fn exchange(&mut self) -> Result<RawFrame, BusError> {
        let mut frame = RawFrame::new();
        let mut total = HEADER_LEN;
        let mut index = 0;

        while index < total {
            let rx = self.transfer_byte(poll_command_byte(index))?;
            frame.push(rx);

            if index == 1 {
                // The ID byte announces how much payload follows the marker.
                total = (HEADER_LEN + payload_len_for_id(rx)).min(MAX_FRAME_LEN);
            }

            // The controller does not acknowledge the last byte of a frame.
            if index + 1 < total {
                self.wait_ack(index)?;
            }
            index += 1;
        }

        Ok(frame)
    }
}

impl<SPI, CS, ACK, D> PadBus for PsxBus<SPI, CS, ACK, D>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    ACK: InputPin,
    D: DelayNs,
{
    fn poll(&mut self) -> Result<RawFrame, BusError> {
        self.select.set_low().map_err(|_| BusError::Pin)?;
        self.delay.delay_us(self.config.select_setup_us);

        let result = self.exchange();

        // Release select on every path so the bus is never left held.
        let released = self.select.set_high().map_err(|_| BusError::Pin);

        match &result {
            Ok(frame) => trace!("pad frame: {=[u8]:02x}", frame.as_slice()),
            Err(e) => trace!("pad poll aborted: {:?}", e),
        }

        let frame = result?;
        released?;
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use embedded_hal::digital::ErrorKind as PinErrorKind;
    use embedded_hal::spi::ErrorKind;
    use std::rc::Rc;
    use std::vec;
    use std::vec::Vec;

    /// Simulated controller shared by the mock SPI, pins and delay.
    struct PadSim {
        /// Bytes the pad answers with, in logical (LSB-first) order.
        response: Vec<u8>,
        /// Number of leading bytes the pad acknowledges.
        acks: usize,
        /// Whether bytes travel bit-reversed on the wire.
        reversed: bool,
        /// Logical command bytes received from the host.
        received: Vec<u8>,
        /// Raw wire bytes as the SPI block shifted them out.
        wire: Vec<u8>,
        ack_pending: bool,
        spi_fails: bool,
        select_fails: bool,
        release_fails: bool,
        ack_fails: bool,
        select_history: Vec<bool>,
        delayed_ns: u64,
    }

    type Shared = Rc<RefCell<PadSim>>;

    fn pad(response: &[u8], acks: usize) -> Shared {
        Rc::new(RefCell::new(PadSim {
            response: response.to_vec(),
            acks,
            reversed: true,
            received: Vec::new(),
            wire: Vec::new(),
            ack_pending: false,
            spi_fails: false,
            select_fails: false,
            release_fails: false,
            ack_fails: false,
            select_history: Vec::new(),
            delayed_ns: 0,
        }))
    }

    struct MockSpi(Shared);
    struct MockSelect(Shared);
    struct MockAck(Shared);
    struct MockDelay(Shared);

    impl embedded_hal::spi::ErrorType for MockSpi {
        type Error = ErrorKind;
    }

    impl SpiBus<u8> for MockSpi {
        fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            words.fill(0xFF);
            Ok(())
        }

        fn write(&mut self, _words: &[u8]) -> Result<(), Self::Error> {
            Ok(())
        }

        fn transfer(&mut self, read: &mut [u8], _write: &[u8]) -> Result<(), Self::Error> {
            read.fill(0xFF);
            Ok(())
        }

        fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            let mut sim = self.0.borrow_mut();
            if sim.spi_fails {
                return Err(ErrorKind::Overrun);
            }
            for word in words.iter_mut() {
                sim.wire.push(*word);
                let logical = if sim.reversed { word.reverse_bits() } else { *word };
                let index = sim.received.len();
                sim.received.push(logical);
                let answer = sim.response.get(index).copied().unwrap_or(0xFF);
                *word = if sim.reversed { answer.reverse_bits() } else { answer };
                sim.ack_pending = index < sim.acks;
            }
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    impl embedded_hal::digital::ErrorType for MockSelect {
        type Error = PinErrorKind;
    }

    impl OutputPin for MockSelect {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            let mut sim = self.0.borrow_mut();
            if sim.select_fails {
                return Err(PinErrorKind::Other);
            }
            sim.select_history.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            let mut sim = self.0.borrow_mut();
            if sim.release_fails {
                return Err(PinErrorKind::Other);
            }
            sim.select_history.push(true);
            Ok(())
        }
    }

    impl embedded_hal::digital::ErrorType for MockAck {
        type Error = PinErrorKind;
    }

    impl InputPin for MockAck {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            self.is_low().map(|low| !low)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            let mut sim = self.0.borrow_mut();
            if sim.ack_fails {
                return Err(PinErrorKind::Other);
            }
            let low = sim.ack_pending;
            sim.ack_pending = false;
            Ok(low)
        }
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.0.borrow_mut().delayed_ns += u64::from(ns);
        }
    }

    fn bus(sim: &Shared) -> PsxBus<MockSpi, MockSelect, MockAck, MockDelay> {
        PsxBus::new(
            MockSpi(sim.clone()),
            MockSelect(sim.clone()),
            MockAck(sim.clone()),
            MockDelay(sim.clone()),
        )
    }

    const DIGITAL_FRAME: [u8; 5] = [0xFF, 0x41, 0x5A, 0xF7, 0xFF];
    const ANALOG_FRAME: [u8; 9] = [0xFF, 0x73, 0x5A, 0xFF, 0xFF, 0x11, 0x22, 0x33, 0x44];

    #[test]
    fn test_poll_digital_frame() {
        let sim = pad(&DIGITAL_FRAME, 4);
        let frame = bus(&sim).poll().unwrap();

        assert_eq!(frame.as_slice(), &DIGITAL_FRAME);
        let sim = sim.borrow();
        assert_eq!(sim.received, vec![0x01, 0x42, 0x00, 0x00, 0x00]);
        assert_eq!(sim.select_history, vec![false, true]);
    }

    #[test]
    fn test_poll_length_follows_id() {
        let sim = pad(&ANALOG_FRAME, 8);
        let frame = bus(&sim).poll().unwrap();

        assert_eq!(frame.as_slice(), &ANALOG_FRAME);
        assert_eq!(sim.borrow().received.len(), 9);
    }

    #[test]
    fn test_last_byte_is_not_acknowledged() {
        // Pad acknowledges bytes 0..=3 only; byte 4 closes the frame.
        let sim = pad(&DIGITAL_FRAME, 4);
        assert!(bus(&sim).poll().is_ok());
        assert_eq!(sim.borrow().delayed_ns, 20_000); // select setup only
    }

    #[test]
    fn test_no_controller_times_out() {
        let sim = pad(&[0xFF; 8], 0);
        let result = bus(&sim).poll();

        assert_eq!(result, Err(BusError::NoAck { byte: 0 }));
        let sim = sim.borrow();
        assert_eq!(sim.received.len(), 1);
        assert_eq!(sim.select_history, vec![false, true]);

        // Bounded: select setup plus one acknowledge deadline.
        let timeout_ns = u64::from(BusConfig::DEFAULT.ack_timeout_us) * 1_000;
        assert_eq!(sim.delayed_ns, 20_000 + timeout_ns);
    }

    #[test]
    fn test_ack_lost_mid_frame_releases_select() {
        let sim = pad(&ANALOG_FRAME, 3);
        let result = bus(&sim).poll();

        assert_eq!(result, Err(BusError::NoAck { byte: 3 }));
        let sim = sim.borrow();
        assert_eq!(sim.received.len(), 4);
        assert_eq!(sim.select_history.last(), Some(&true));
    }

    #[test]
    fn test_spi_error_releases_select() {
        let sim = pad(&DIGITAL_FRAME, 4);
        sim.borrow_mut().spi_fails = true;

        assert_eq!(bus(&sim).poll(), Err(BusError::Spi));
        assert_eq!(sim.borrow().select_history, vec![false, true]);
    }

    #[test]
    fn test_select_failure_aborts_before_clocking() {
        let sim = pad(&DIGITAL_FRAME, 4);
        sim.borrow_mut().select_fails = true;

        assert_eq!(bus(&sim).poll(), Err(BusError::Pin));
        assert!(sim.borrow().received.is_empty());
    }

    #[test]
    fn test_select_release_failure_drops_frame() {
        let sim = pad(&DIGITAL_FRAME, 4);
        sim.borrow_mut().release_fails = true;

        assert_eq!(bus(&sim).poll(), Err(BusError::Pin));
        // The exchange itself completed.
        assert_eq!(sim.borrow().received.len(), 5);
    }

    #[test]
    fn test_ack_read_failure_releases_select() {
        let sim = pad(&DIGITAL_FRAME, 4);
        sim.borrow_mut().ack_fails = true;

        assert_eq!(bus(&sim).poll(), Err(BusError::Pin));
        let sim = sim.borrow();
        assert_eq!(sim.received.len(), 1);
        assert_eq!(sim.select_history, vec![false, true]);
    }

    #[test]
    fn test_bytes_are_bit_reversed_on_the_wire() {
        let sim = pad(&DIGITAL_FRAME, 4);
        bus(&sim).poll().unwrap();
        assert_eq!(&sim.borrow().wire[..2], &[0x80, 0x42]);
    }

    #[test]
    fn test_msb_first_config_sends_bytes_unchanged() {
        let sim = pad(&DIGITAL_FRAME, 4);
        sim.borrow_mut().reversed = false;
        let config = BusConfig {
            lsb_first: false,
            ..BusConfig::DEFAULT
        };
        let mut bus = PsxBus::with_config(
            MockSpi(sim.clone()),
            MockSelect(sim.clone()),
            MockAck(sim.clone()),
            MockDelay(sim.clone()),
            config,
        );

        assert_eq!(bus.poll().unwrap().as_slice(), &DIGITAL_FRAME);
        assert_eq!(&sim.borrow().wire[..2], &[0x01, 0x42]);
    }

    #[test]
    fn test_oversized_id_is_clamped_to_frame_capacity() {
        // 0x7F announces 15 words, more than the frame can hold.
        let mut response = vec![0xFF, 0x7F, 0x5A];
        response.extend(core::iter::repeat(0x00).take(40));
        let sim = pad(&response, 64);

        let frame = bus(&sim).poll().unwrap();
        assert_eq!(frame.len(), MAX_FRAME_LEN);
    }
}
