//! Channel descriptors and the memory-mapped device built from them.
//!
//! Each channel of the reference part has the same register layout at a
//! different base address, so the table below carries only data and the
//! access code is written once.

use core::ptr::{read_volatile, write_volatile};

use crate::device::{ChannelDevice, ControlB, FrameBits, StatusA};

/// Register offsets relative to a channel's base address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterOffsets {
    pub status: usize,
    pub control: usize,
    pub frame: usize,
    pub divisor_low: usize,
    pub divisor_high: usize,
    pub data: usize,
}

pub const STANDARD_OFFSETS: RegisterOffsets = RegisterOffsets {
    status: 0,
    control: 1,
    frame: 2,
    divisor_low: 4,
    divisor_high: 5,
    data: 6,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelDescriptor {
    pub index: u8,
    pub base: usize,
    pub offsets: RegisterOffsets,
}

impl ChannelDescriptor {
    pub const fn new(index: u8, base: usize) -> Self {
        Self {
            index,
            base,
            offsets: STANDARD_OFFSETS,
        }
    }
}

/// The four channels of the reference microcontroller, by data-space address.
pub const REFERENCE_CHANNELS: [ChannelDescriptor; 4] = [
    ChannelDescriptor::new(0, 0xC0),
    ChannelDescriptor::new(1, 0xC8),
    ChannelDescriptor::new(2, 0xD0),
    ChannelDescriptor::new(3, 0x130),
];

/// A channel whose registers are memory mapped.
pub struct MmioDevice {
    base: usize,
    offsets: RegisterOffsets,
}

impl MmioDevice {
    /// # Safety
    /// `descriptor.base` plus every offset must address the channel's
    /// registers, and no other owner may access them while this value lives.
    pub const unsafe fn new(descriptor: &ChannelDescriptor) -> Self {
        Self {
            base: descriptor.base,
            offsets: descriptor.offsets,
        }
    }

    #[inline]
    fn read_reg(&self, offset: usize) -> u8 {
        // SAFETY: guaranteed by the contract of `new`.
        unsafe { read_volatile((self.base + offset) as *const u8) }
    }

    #[inline]
    fn write_reg(&mut self, offset: usize, value: u8) {
        // SAFETY: guaranteed by the contract of `new`.
        unsafe { write_volatile((self.base + offset) as *mut u8, value) }
    }
}

impl ChannelDevice for MmioDevice {
    fn read_status(&mut self) -> StatusA {
        StatusA::from_bits_retain(self.read_reg(self.offsets.status))
    }

    fn write_status(&mut self, status: StatusA) {
        self.write_reg(self.offsets.status, status.bits());
    }

    fn write_control(&mut self, control: ControlB) {
        self.write_reg(self.offsets.control, control.bits());
    }

    fn write_frame(&mut self, frame: FrameBits) {
        self.write_reg(self.offsets.frame, frame.bits());
    }

    fn write_baud_divisor(&mut self, divisor: u16) {
        // Writing the low byte latches the divisor, so it goes last.
        let [low, high] = divisor.to_le_bytes();
        self.write_reg(self.offsets.divisor_high, high);
        self.write_reg(self.offsets.divisor_low, low);
    }

    fn read_data(&mut self) -> u8 {
        self.read_reg(self.offsets.data)
    }

    fn write_data(&mut self, byte: u8) {
        self.write_reg(self.offsets.data, byte);
    }
}

// Only the owning Channel touches the registers.
unsafe impl Send for MmioDevice {}
