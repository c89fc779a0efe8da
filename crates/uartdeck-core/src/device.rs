//! The channel device capability: what the platform must provide for one
//! serial channel, expressed in terms of its register set.

use bitflags::bitflags;

bitflags! {
    /// Status register A.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StatusA: u8 {
        /// Receive complete: a byte is waiting in the data register.
        const RXC = 1 << 7;
        const TXC = 1 << 6;
        /// Data register empty: the transmitter accepts a byte.
        const UDRE = 1 << 5;
        const FE = 1 << 4;
        const DOR = 1 << 3;
        const UPE = 1 << 2;
        /// Double transmission speed.
        const U2X = 1 << 1;
        const MPCM = 1 << 0;
    }
}

bitflags! {
    /// Control register B.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ControlB: u8 {
        /// Receive-complete interrupt enable.
        const RXCIE = 1 << 7;
        const TXCIE = 1 << 6;
        const UDRIE = 1 << 5;
        const RXEN = 1 << 4;
        const TXEN = 1 << 3;
        const UCSZ2 = 1 << 2;
        const RXB8 = 1 << 1;
        const TXB8 = 1 << 0;
    }
}

bitflags! {
    /// Control register C: frame format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FrameBits: u8 {
        const UMSEL1 = 1 << 7;
        const UMSEL0 = 1 << 6;
        const UPM1 = 1 << 5;
        const UPM0 = 1 << 4;
        const USBS = 1 << 3;
        const UCSZ1 = 1 << 2;
        const UCSZ0 = 1 << 1;
        const UCPOL = 1 << 0;
    }
}

/// Largest value the 12-bit baud divisor register holds.
pub const MAX_BAUD_DIVISOR: u16 = 0x0FFF;

/// Register-level access to one serial channel.
///
/// Implementations are owned by exactly one [`Channel`](crate::Channel);
/// nothing here is expected to be reentrant.
pub trait ChannelDevice {
    fn read_status(&mut self) -> StatusA;

    fn write_status(&mut self, status: StatusA);

    fn write_control(&mut self, control: ControlB);

    fn write_frame(&mut self, frame: FrameBits);

    fn write_baud_divisor(&mut self, divisor: u16);

    /// Reads the data register, consuming the received byte.
    fn read_data(&mut self) -> u8;

    /// Writes the data register, starting transmission of `byte`.
    fn write_data(&mut self, byte: u8);

    fn tx_ready(&mut self) -> bool {
        self.read_status().contains(StatusA::UDRE)
    }

    fn rx_ready(&mut self) -> bool {
        self.read_status().contains(StatusA::RXC)
    }
}

impl<D: ChannelDevice + ?Sized> ChannelDevice for Box<D> {
    fn read_status(&mut self) -> StatusA {
        (**self).read_status()
    }

    fn write_status(&mut self, status: StatusA) {
        (**self).write_status(status)
    }

    fn write_control(&mut self, control: ControlB) {
        (**self).write_control(control)
    }

    fn write_frame(&mut self, frame: FrameBits) {
        (**self).write_frame(frame)
    }

    fn write_baud_divisor(&mut self, divisor: u16) {
        (**self).write_baud_divisor(divisor)
    }

    fn read_data(&mut self) -> u8 {
        (**self).read_data()
    }

    fn write_data(&mut self, byte: u8) {
        (**self).write_data(byte)
    }

    fn tx_ready(&mut self) -> bool {
        (**self).tx_ready()
    }

    fn rx_ready(&mut self) -> bool {
        (**self).rx_ready()
    }
}
