//! Core functionalities: channel devices, configuration, blocking I/O, line
//! editing, terminal control and numeric conversion.

pub mod bank;
pub mod channel;
pub mod config;
pub mod convert;
pub mod descriptor;
pub mod device;
pub mod error;
pub mod line;
pub mod port;
pub mod sim;
pub mod terminal;
pub mod traffic;

pub use bank::{SerialBank, MAX_CHANNELS};
pub use channel::Channel;
pub use config::{FrameSize, Framing, LineSettings, Parity, StopBits, DEFAULT_CLOCK_HZ};
pub use convert::{format_radix, parse_int, parse_int_bytes, to_string_radix, Radix};
pub use descriptor::{ChannelDescriptor, MmioDevice, REFERENCE_CHANNELS};
pub use device::{ChannelDevice, ControlB, FrameBits, StatusA};
pub use error::{Result, UartError};
pub use line::{LineBuffer, LINE_CAPACITY};
pub use port::{list_ports, PortDevice, PortInfo};
pub use sim::{SimDevice, SimHandle};
pub use terminal::{Color, EscapeSequence};
pub use traffic::{Direction, TrafficEntry, TrafficLog};
