//! Index-addressed access to a fixed set of channels.

use crate::channel::Channel;
use crate::config::{LineSettings, DEFAULT_CLOCK_HZ};
use crate::descriptor::{MmioDevice, REFERENCE_CHANNELS};
use crate::device::ChannelDevice;
use crate::error::{Result, UartError};
use crate::line::LineBuffer;

/// Largest number of channels a bank can address.
pub const MAX_CHANNELS: usize = u8::MAX as usize + 1;

/// The channels of one microcontroller, addressed by index.
///
/// Every operation on an index outside the set fails with
/// [`UartError::InvalidChannel`] before any device is touched.
pub struct SerialBank<D> {
    channels: Vec<Channel<D>>,
}

impl<D: ChannelDevice> SerialBank<D> {
    pub fn new(devices: impl IntoIterator<Item = D>) -> Self {
        Self::with_clock(devices, DEFAULT_CLOCK_HZ)
    }

    /// Channel indices are `u8`, so at most [`MAX_CHANNELS`] devices are
    /// taken; any further devices are dropped.
    pub fn with_clock(devices: impl IntoIterator<Item = D>, clock_hz: u32) -> Self {
        let mut devices = devices.into_iter();
        let channels: Vec<_> = (0..=u8::MAX)
            .zip(devices.by_ref())
            .map(|(i, dev)| Channel::with_clock(i, dev, clock_hz))
            .collect();
        if devices.next().is_some() {
            log::warn!("only the first {MAX_CHANNELS} devices are addressable, the rest were dropped");
        }
        Self { channels }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn channel_mut(&mut self, index: u8) -> Result<&mut Channel<D>> {
        let present = self.channels.len();
        self.channels.get_mut(index as usize).ok_or_else(|| {
            log::warn!("channel {index} rejected, {present} channels present");
            UartError::InvalidChannel(index)
        })
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut Channel<D>> {
        self.channels.iter_mut()
    }

    pub fn into_channels(self) -> Vec<Channel<D>> {
        self.channels
    }

    pub fn configure(&mut self, index: u8, settings: &LineSettings) -> Result<()> {
        let channel = self.channel_mut(index)?;
        channel.configure(settings).map_err(|e| {
            log::warn!("channel {index}: configuration rejected: {e}");
            e
        })
    }

    /// Configure from numeric arguments: frame size 6..=8, parity code
    /// 0 none / 1 odd / 2 even, stop bits 1 or 2.
    pub fn configure_raw(
        &mut self,
        index: u8,
        baud_rate: u32,
        frame_size: u8,
        parity: u8,
        stop_bits: u8,
    ) -> Result<()> {
        self.channel_mut(index)?;
        let settings = LineSettings::from_raw(baud_rate, frame_size, parity, stop_bits)?;
        self.configure(index, &settings)
    }

    pub fn send(&mut self, index: u8, byte: u8) -> Result<()> {
        self.channel_mut(index)?.send(byte);
        Ok(())
    }

    pub fn send_bytes(&mut self, index: u8, bytes: &[u8]) -> Result<()> {
        self.channel_mut(index)?.send_bytes(bytes);
        Ok(())
    }

    /// Sends `text`; `None` stands for absent text and sends nothing.
    pub fn send_str<'a>(&mut self, index: u8, text: impl Into<Option<&'a str>>) -> Result<()> {
        let channel = self.channel_mut(index)?;
        let text = text.into().ok_or(UartError::NullInput)?;
        channel.send_str(text);
        Ok(())
    }

    pub fn receive(&mut self, index: u8) -> Result<u8> {
        Ok(self.channel_mut(index)?.receive())
    }

    pub fn available(&mut self, index: u8) -> Result<bool> {
        Ok(self.channel_mut(index)?.available())
    }

    pub fn read_line(&mut self, index: u8, max_len: usize) -> Result<Vec<u8>> {
        Ok(self.channel_mut(index)?.read_line(max_len))
    }

    pub fn read_line_into<const N: usize>(&mut self, index: u8, line: &mut LineBuffer<N>) -> Result<usize> {
        Ok(self.channel_mut(index)?.read_line_into(line))
    }

    /// See [`Channel::read_line_received`].
    pub fn read_line_received<const N: usize>(
        &mut self,
        index: u8,
        line: &mut LineBuffer<N>,
    ) -> Result<Option<usize>> {
        Ok(self.channel_mut(index)?.read_line_received(line))
    }

    pub fn clear_screen(&mut self, index: u8) -> Result<()> {
        self.channel_mut(index)?.clear_screen();
        Ok(())
    }

    pub fn move_cursor(&mut self, index: u8, col: u8, row: u8) -> Result<()> {
        self.channel_mut(index)?.move_cursor(col, row);
        Ok(())
    }

    pub fn set_color(&mut self, index: u8, code: u8) -> Result<()> {
        self.channel_mut(index)?.set_color(code);
        Ok(())
    }
}

impl SerialBank<MmioDevice> {
    /// The four memory-mapped channels of the reference part.
    ///
    /// # Safety
    /// Must run on that part, and only one bank may exist at a time.
    pub unsafe fn reference() -> Self {
        Self::new(
            REFERENCE_CHANNELS
                .iter()
                .map(|desc| unsafe { MmioDevice::new(desc) }),
        )
    }
}
