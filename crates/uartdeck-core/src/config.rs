//! Line settings and their encoding into the baud divisor and frame bits.

use serde::{Deserialize, Serialize};

use crate::device::{FrameBits, MAX_BAUD_DIVISOR};
use crate::error::{Result, UartError};

/// System clock of the reference board.
pub const DEFAULT_CLOCK_HZ: u32 = 16_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FrameSize {
    Six,
    Seven,
    Eight,
}

impl TryFrom<u8> for FrameSize {
    type Error = UartError;

    fn try_from(bits: u8) -> Result<Self> {
        match bits {
            6 => Ok(Self::Six),
            7 => Ok(Self::Seven),
            8 => Ok(Self::Eight),
            other => Err(UartError::invalid(format!("frame size {other}"))),
        }
    }
}

impl From<FrameSize> for u8 {
    fn from(size: FrameSize) -> u8 {
        match size {
            FrameSize::Six => 6,
            FrameSize::Seven => 7,
            FrameSize::Eight => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    None,
    Even,
    Odd,
}

impl Parity {
    /// Maps the numeric parity code used by the raw API: 0 none, 1 odd,
    /// 2 even.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Odd),
            2 => Ok(Self::Even),
            other => Err(UartError::invalid(format!("parity code {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum StopBits {
    One,
    Two,
}

impl TryFrom<u8> for StopBits {
    type Error = UartError;

    fn try_from(bits: u8) -> Result<Self> {
        match bits {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(UartError::invalid(format!("stop bits {other}"))),
        }
    }
}

impl From<StopBits> for u8 {
    fn from(stop: StopBits) -> u8 {
        match stop {
            StopBits::One => 1,
            StopBits::Two => 2,
        }
    }
}

/// Data bits, parity and stop bits of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framing {
    pub frame_size: FrameSize,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl Framing {
    pub fn to_frame_bits(&self) -> FrameBits {
        let mut bits = match self.frame_size {
            FrameSize::Six => FrameBits::UCSZ0,
            FrameSize::Seven => FrameBits::UCSZ1,
            FrameSize::Eight => FrameBits::UCSZ1 | FrameBits::UCSZ0,
        };
        match self.parity {
            Parity::None => {}
            Parity::Even => bits |= FrameBits::UPM1,
            Parity::Odd => bits |= FrameBits::UPM1 | FrameBits::UPM0,
        }
        if self.stop_bits == StopBits::Two {
            bits |= FrameBits::USBS;
        }
        bits
    }

    /// Decodes a frame register value. Returns `None` for encodings this
    /// layer never produces (5-bit frames, reserved parity mode).
    pub fn from_frame_bits(bits: FrameBits) -> Option<Self> {
        let frame_size = match (
            bits.contains(FrameBits::UCSZ1),
            bits.contains(FrameBits::UCSZ0),
        ) {
            (false, true) => FrameSize::Six,
            (true, false) => FrameSize::Seven,
            (true, true) => FrameSize::Eight,
            (false, false) => return None,
        };
        let parity = match (
            bits.contains(FrameBits::UPM1),
            bits.contains(FrameBits::UPM0),
        ) {
            (false, false) => Parity::None,
            (true, false) => Parity::Even,
            (true, true) => Parity::Odd,
            (false, true) => return None,
        };
        let stop_bits = if bits.contains(FrameBits::USBS) {
            StopBits::Two
        } else {
            StopBits::One
        };
        Some(Self {
            frame_size,
            parity,
            stop_bits,
        })
    }
}

/// Everything the configurator programs into one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineSettings {
    pub baud_rate: u32,
    pub frame_size: FrameSize,
    pub parity: Parity,
    pub stop_bits: StopBits,
    /// Sets the receive-complete interrupt enable bit. No handler is
    /// installed by this crate; the bit only shapes the register image.
    pub rx_interrupt: bool,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            frame_size: FrameSize::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            rx_interrupt: true,
        }
    }
}

impl LineSettings {
    pub fn new(baud_rate: u32, frame_size: FrameSize, parity: Parity, stop_bits: StopBits) -> Self {
        Self {
            baud_rate,
            frame_size,
            parity,
            stop_bits,
            ..Default::default()
        }
    }

    /// Builds settings from the numeric arguments of the raw configure call.
    pub fn from_raw(baud_rate: u32, frame_size: u8, parity: u8, stop_bits: u8) -> Result<Self> {
        Ok(Self::new(
            baud_rate,
            FrameSize::try_from(frame_size)?,
            Parity::from_code(parity)?,
            StopBits::try_from(stop_bits)?,
        ))
    }

    pub fn framing(&self) -> Framing {
        Framing {
            frame_size: self.frame_size,
            parity: self.parity,
            stop_bits: self.stop_bits,
        }
    }
}

/// Divisor for double-speed mode: `clock / (8 * baud) - 1`.
pub fn baud_divisor(clock_hz: u32, baud_rate: u32) -> Result<u16> {
    if baud_rate == 0 {
        return Err(UartError::invalid("baud rate 0"));
    }
    let quotient = u64::from(clock_hz) / (8 * u64::from(baud_rate));
    if quotient == 0 {
        return Err(UartError::invalid(format!(
            "baud rate {baud_rate} is too fast for a {clock_hz} Hz clock"
        )));
    }
    let divisor = quotient - 1;
    if divisor > u64::from(MAX_BAUD_DIVISOR) {
        return Err(UartError::invalid(format!(
            "baud rate {baud_rate} is too slow for a {clock_hz} Hz clock"
        )));
    }
    Ok(divisor as u16)
}

/// Baud rate a divisor actually produces.
pub fn effective_baud(clock_hz: u32, divisor: u16, double_speed: bool) -> u32 {
    let per_bit = if double_speed { 8 } else { 16 };
    clock_hz / (per_bit * (u32::from(divisor) + 1))
}
