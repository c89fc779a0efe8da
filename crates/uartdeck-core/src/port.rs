//! Host serial port presented as a channel device.
//!
//! A worker thread owns the port. Register writes made by the configurator
//! are decoded back into host port settings and sent to the worker; bytes
//! the worker reads arrive over a channel and back the receive-ready flag.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use serialport::{SerialPort, SerialPortInfo};

use crate::config::{effective_baud, FrameSize, Framing, Parity, StopBits, DEFAULT_CLOCK_HZ};
use crate::device::{ChannelDevice, ControlB, FrameBits, StatusA};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct PortInfo {
    pub port_name: String,
    pub port_type: String,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let (port_type, vid, pid, serial_number, manufacturer, product) = match &info.port_type {
            serialport::SerialPortType::UsbPort(usb) => (
                "USB".to_string(),
                Some(usb.vid),
                Some(usb.pid),
                usb.serial_number.clone(),
                usb.manufacturer.clone(),
                usb.product.clone(),
            ),
            serialport::SerialPortType::PciPort => ("PCI".to_string(), None, None, None, None, None),
            serialport::SerialPortType::BluetoothPort => ("Bluetooth".to_string(), None, None, None, None, None),
            serialport::SerialPortType::Unknown => ("Unknown".to_string(), None, None, None, None, None),
        };
        Self {
            port_name: info.port_name,
            port_type,
            vid,
            pid,
            serial_number,
            manufacturer,
            product,
        }
    }
}

pub fn list_ports() -> Vec<PortInfo> {
    serialport::available_ports()
        .unwrap_or_default()
        .into_iter()
        .map(PortInfo::from)
        .collect()
}

/// Host port settings derived from the channel registers.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HostSettings {
    baud_rate: u32,
    data_bits: serialport::DataBits,
    parity: serialport::Parity,
    stop_bits: serialport::StopBits,
}

impl HostSettings {
    fn from_framing(baud_rate: u32, framing: Framing) -> Self {
        Self {
            baud_rate,
            data_bits: match framing.frame_size {
                FrameSize::Six => serialport::DataBits::Six,
                FrameSize::Seven => serialport::DataBits::Seven,
                FrameSize::Eight => serialport::DataBits::Eight,
            },
            parity: match framing.parity {
                Parity::None => serialport::Parity::None,
                Parity::Even => serialport::Parity::Even,
                Parity::Odd => serialport::Parity::Odd,
            },
            stop_bits: match framing.stop_bits {
                StopBits::One => serialport::StopBits::One,
                StopBits::Two => serialport::StopBits::Two,
            },
        }
    }

    fn apply(&self, port: &mut dyn SerialPort) -> serialport::Result<()> {
        port.set_baud_rate(self.baud_rate)?;
        port.set_data_bits(self.data_bits)?;
        port.set_parity(self.parity)?;
        port.set_stop_bits(self.stop_bits)
    }
}

enum Command {
    Send(u8),
    Apply(HostSettings),
    Close,
}

enum PortEvent {
    Rx(Vec<u8>),
    Error(String),
    Closed,
}

pub struct PortDevice {
    port_name: String,
    clock_hz: u32,
    status: StatusA,
    control: ControlB,
    frame: FrameBits,
    divisor: u16,
    pending: VecDeque<u8>,
    closed: bool,
    tx_cmd: Sender<Command>,
    rx_evt: Receiver<PortEvent>,
}

impl PortDevice {
    pub fn open(port_name: &str) -> Result<Self> {
        Self::open_with_clock(port_name, DEFAULT_CLOCK_HZ)
    }

    /// Opens `port_name` at 9600 8-N-1; the channel configurator then
    /// reprograms it. `clock_hz` converts divisors back into baud rates.
    pub fn open_with_clock(port_name: &str, clock_hz: u32) -> Result<Self> {
        let port = serialport::new(port_name, 9600)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(Duration::from_millis(50))
            .open()?;

        let (tx_cmd, rx_cmd) = unbounded::<Command>();
        let (tx_evt, rx_evt) = unbounded::<PortEvent>();
        std::thread::spawn(move || run_worker(port, rx_cmd, tx_evt));
        log::info!("opened {port_name}");

        Ok(Self {
            port_name: port_name.to_string(),
            clock_hz,
            status: StatusA::empty(),
            control: ControlB::empty(),
            frame: FrameBits::empty(),
            divisor: 0,
            pending: VecDeque::new(),
            closed: false,
            tx_cmd,
            rx_evt,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.rx_evt.try_recv() {
            match event {
                PortEvent::Rx(data) => {
                    if self.control.contains(ControlB::RXEN) {
                        self.pending.extend(data);
                    }
                }
                PortEvent::Error(e) => log::warn!("{}: {}", self.port_name, e),
                PortEvent::Closed => self.closed = true,
            }
        }
    }

    fn push_settings(&mut self) {
        let Some(framing) = Framing::from_frame_bits(self.frame) else {
            return;
        };
        let baud_rate = effective_baud(self.clock_hz, self.divisor, self.status.contains(StatusA::U2X));
        let settings = HostSettings::from_framing(baud_rate, framing);
        log::debug!("{}: applying {:?}", self.port_name, settings);
        if self.tx_cmd.send(Command::Apply(settings)).is_err() {
            self.closed = true;
        }
    }
}

impl ChannelDevice for PortDevice {
    fn read_status(&mut self) -> StatusA {
        self.drain_events();
        let mut status = self.status | StatusA::UDRE;
        status.set(StatusA::RXC, !self.pending.is_empty());
        status
    }

    fn write_status(&mut self, status: StatusA) {
        self.status = status & (StatusA::U2X | StatusA::MPCM);
    }

    fn write_control(&mut self, control: ControlB) {
        self.control = control;
        if !control.contains(ControlB::RXEN) {
            self.pending.clear();
        }
    }

    fn write_frame(&mut self, frame: FrameBits) {
        self.frame = frame;
        self.push_settings();
    }

    fn write_baud_divisor(&mut self, divisor: u16) {
        self.divisor = divisor;
        self.push_settings();
    }

    fn read_data(&mut self) -> u8 {
        self.drain_events();
        self.pending.pop_front().unwrap_or(0)
    }

    fn write_data(&mut self, byte: u8) {
        if self.closed || self.tx_cmd.send(Command::Send(byte)).is_err() {
            self.closed = true;
            log::warn!("{}: port closed, dropped {:#04x}", self.port_name, byte);
        }
    }
}

impl Drop for PortDevice {
    fn drop(&mut self) {
        let _ = self.tx_cmd.send(Command::Close);
    }
}

fn run_worker(mut port: Box<dyn SerialPort>, rx_cmd: Receiver<Command>, tx_evt: Sender<PortEvent>) {
    let mut buf = [0u8; 4096];
    loop {
        match port.read(&mut buf) {
            Ok(n) if n > 0 => {
                let _ = tx_evt.send(PortEvent::Rx(buf[..n].to_vec()));
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(e) => {
                let _ = tx_evt.send(PortEvent::Error(format!("read failed: {e}")));
            }
        }
        while let Ok(cmd) = rx_cmd.try_recv() {
            match cmd {
                Command::Send(byte) => {
                    if let Err(e) = port.write_all(&[byte]) {
                        let _ = tx_evt.send(PortEvent::Error(e.to_string()));
                    }
                }
                Command::Apply(settings) => {
                    if let Err(e) = settings.apply(port.as_mut()) {
                        let _ = tx_evt.send(PortEvent::Error(e.to_string()));
                    }
                }
                Command::Close => {
                    let _ = tx_evt.send(PortEvent::Closed);
                    return;
                }
            }
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}
