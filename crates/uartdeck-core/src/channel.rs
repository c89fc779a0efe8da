//! Owned channel handle: configuration and blocking byte I/O.

use core::fmt;

use crate::config::{baud_divisor, LineSettings, DEFAULT_CLOCK_HZ};
use crate::device::{ChannelDevice, ControlB, StatusA};
use crate::error::Result;

/// One serial channel and the device behind it.
///
/// Send and receive busy-wait on the device status with no timeout. The
/// relax hook runs on every poll and defaults to a spin-loop hint; hosted
/// callers can install a yield instead.
pub struct Channel<D> {
    index: u8,
    device: D,
    clock_hz: u32,
    settings: Option<LineSettings>,
    relax: fn(),
}

impl<D: ChannelDevice> Channel<D> {
    pub fn new(index: u8, device: D) -> Self {
        Self::with_clock(index, device, DEFAULT_CLOCK_HZ)
    }

    pub fn with_clock(index: u8, device: D, clock_hz: u32) -> Self {
        Self {
            index,
            device,
            clock_hz,
            settings: None,
            relax: core::hint::spin_loop,
        }
    }

    pub fn set_relax(&mut self, relax: fn()) {
        self.relax = relax;
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    /// Settings of the last successful [`configure`](Self::configure).
    pub fn settings(&self) -> Option<&LineSettings> {
        self.settings.as_ref()
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn into_device(self) -> D {
        self.device
    }

    /// Programs baud divisor, double-speed mode, transmitter and receiver
    /// enables and the frame format. Rejected settings leave every
    /// register untouched.
    pub fn configure(&mut self, settings: &LineSettings) -> Result<()> {
        let divisor = baud_divisor(self.clock_hz, settings.baud_rate)?;
        let frame = settings.framing().to_frame_bits();
        let mut control = ControlB::RXEN | ControlB::TXEN;
        if settings.rx_interrupt {
            control |= ControlB::RXCIE;
        }

        let status = self.device.read_status();
        self.device.write_status(status | StatusA::U2X);
        self.device.write_control(control);
        self.device.write_baud_divisor(divisor);
        self.device.write_frame(frame);

        log::debug!(
            "channel {}: divisor {} for {} baud, frame {:?}, control {:?}",
            self.index,
            divisor,
            settings.baud_rate,
            frame,
            control
        );
        self.settings = Some(*settings);
        Ok(())
    }

    /// Blocks until the transmitter is ready, then writes `byte`.
    pub fn send(&mut self, byte: u8) {
        while !self.device.tx_ready() {
            (self.relax)();
        }
        self.device.write_data(byte);
    }

    /// Blocks until a byte has been received and returns it.
    pub fn receive(&mut self) -> u8 {
        while !self.device.rx_ready() {
            (self.relax)();
        }
        self.device.read_data()
    }

    pub fn available(&mut self) -> bool {
        self.device.rx_ready()
    }

    pub fn send_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.send(byte);
        }
    }

    /// Sends the text up to, not including, its first NUL.
    pub fn send_str(&mut self, text: &str) {
        for byte in text.bytes().take_while(|&b| b != 0) {
            self.send(byte);
        }
    }
}

impl<D: ChannelDevice> fmt::Write for Channel<D> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.send_str(s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FrameSize, Parity, StopBits};
    use crate::device::FrameBits;
    use crate::sim::SimDevice;
    use core::fmt::Write;
    use std::cell::RefCell;

    fn sim_channel() -> (Channel<SimDevice>, crate::sim::SimHandle) {
        let dev = SimDevice::new();
        let handle = dev.handle();
        (Channel::new(0, dev), handle)
    }

    #[test]
    fn configure_programs_every_register() {
        let (mut ch, sim) = sim_channel();
        let settings = LineSettings::new(12_345, FrameSize::Eight, Parity::Odd, StopBits::Two);
        ch.configure(&settings).unwrap();

        assert!(sim.status().contains(StatusA::U2X));
        assert_eq!(sim.control(), ControlB::RXEN | ControlB::TXEN | ControlB::RXCIE);
        assert_eq!(sim.divisor(), 161);
        assert_eq!(sim.framing(), Some(settings.framing()));
        assert_eq!(ch.settings(), Some(&settings));
    }

    #[test]
    fn rx_interrupt_bit_is_optional() {
        let (mut ch, sim) = sim_channel();
        let settings = LineSettings {
            rx_interrupt: false,
            ..LineSettings::default()
        };
        ch.configure(&settings).unwrap();
        assert_eq!(sim.control(), ControlB::RXEN | ControlB::TXEN);
        assert_eq!(sim.frame(), FrameBits::UCSZ1 | FrameBits::UCSZ0);
    }

    #[test]
    fn rejected_settings_touch_nothing() {
        let (mut ch, sim) = sim_channel();
        let settings = LineSettings {
            baud_rate: 0,
            ..LineSettings::default()
        };
        assert!(ch.configure(&settings).is_err());
        assert_eq!(sim.register_writes(), 0);
        assert!(ch.settings().is_none());
    }

    #[test]
    fn send_str_stops_at_nul() {
        let (mut ch, sim) = sim_channel();
        ch.send_str("ab\0cd");
        assert_eq!(sim.transmitted(), b"ab");
    }

    #[test]
    fn formatted_writes_reach_the_device() {
        let (mut ch, sim) = sim_channel();
        write!(ch, "{}-{}", 4, "x").unwrap();
        assert_eq!(sim.transmitted_text(), "4-x");
    }

    #[test]
    fn receive_returns_queued_bytes_in_order() {
        let (mut ch, sim) = sim_channel();
        assert!(!ch.available());
        sim.feed(b"ok");
        assert!(ch.available());
        assert_eq!(ch.receive(), b'o');
        assert_eq!(ch.receive(), b'k');
        assert!(!ch.available());
    }

    thread_local! {
        static LATE_INPUT: RefCell<Option<crate::sim::SimHandle>> = const { RefCell::new(None) };
    }

    fn deliver_late_input() {
        LATE_INPUT.with(|slot| {
            if let Some(sim) = slot.borrow_mut().take() {
                sim.feed(b"z");
            }
        });
    }

    #[test]
    fn installed_relax_runs_while_waiting() {
        let (mut ch, sim) = sim_channel();
        LATE_INPUT.with(|slot| *slot.borrow_mut() = Some(sim.clone()));
        ch.set_relax(deliver_late_input);

        assert_eq!(ch.receive(), b'z');
        assert!(LATE_INPUT.with(|slot| slot.borrow().is_none()));
        assert_eq!(sim.pending_input(), 0);
    }
}
