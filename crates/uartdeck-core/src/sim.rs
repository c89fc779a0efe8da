//! In-memory channel device for tests and for running without hardware.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::{effective_baud, Framing};
use crate::device::{ChannelDevice, ControlB, FrameBits, StatusA};
use crate::traffic::{Direction, TrafficLog};

const TRAFFIC_ENTRIES: usize = 1024;

struct SimState {
    status: StatusA,
    control: ControlB,
    frame: FrameBits,
    divisor: u16,
    rx: VecDeque<u8>,
    traffic: TrafficLog,
    transmitted: Vec<u8>,
    register_writes: usize,
    peer: Option<Arc<Mutex<SimState>>>,
}

impl SimState {
    fn new() -> Self {
        Self {
            status: StatusA::UDRE,
            control: ControlB::empty(),
            frame: FrameBits::empty(),
            divisor: 0,
            rx: VecDeque::new(),
            traffic: TrafficLog::new(TRAFFIC_ENTRIES),
            transmitted: Vec::new(),
            register_writes: 0,
            peer: None,
        }
    }
}

/// Simulated channel. Always ready to transmit; ready to receive whenever
/// its input queue is non-empty.
#[derive(Clone)]
pub struct SimDevice {
    state: Arc<Mutex<SimState>>,
}

impl Default for SimDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDevice {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState::new())),
        }
    }

    /// A second view of the same device, kept by the test or app while the
    /// device itself is owned by a channel.
    pub fn handle(&self) -> SimHandle {
        SimHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Routes every byte transmitted by `self` into the input queue of `to`.
    pub fn wire_to(&self, to: &SimDevice) {
        self.state.lock().peer = Some(Arc::clone(&to.state));
    }
}

impl ChannelDevice for SimDevice {
    fn read_status(&mut self) -> StatusA {
        let state = self.state.lock();
        let mut status = state.status | StatusA::UDRE;
        status.set(StatusA::RXC, !state.rx.is_empty());
        status
    }

    fn write_status(&mut self, status: StatusA) {
        let mut state = self.state.lock();
        state.status = status & !(StatusA::RXC | StatusA::TXC);
        state.register_writes += 1;
    }

    fn write_control(&mut self, control: ControlB) {
        let mut state = self.state.lock();
        state.control = control;
        state.register_writes += 1;
    }

    fn write_frame(&mut self, frame: FrameBits) {
        let mut state = self.state.lock();
        state.frame = frame;
        state.register_writes += 1;
    }

    fn write_baud_divisor(&mut self, divisor: u16) {
        let mut state = self.state.lock();
        state.divisor = divisor;
        state.register_writes += 1;
    }

    fn read_data(&mut self) -> u8 {
        let mut state = self.state.lock();
        match state.rx.pop_front() {
            Some(byte) => {
                state.traffic.push(Direction::Rx, &[byte]);
                byte
            }
            None => 0,
        }
    }

    fn write_data(&mut self, byte: u8) {
        let peer = {
            let mut state = self.state.lock();
            state.traffic.push(Direction::Tx, &[byte]);
            state.transmitted.push(byte);
            state.peer.clone()
        };
        if let Some(peer) = peer {
            peer.lock().rx.push_back(byte);
        }
    }
}

/// Inspection and input side of a [`SimDevice`].
#[derive(Clone)]
pub struct SimHandle {
    state: Arc<Mutex<SimState>>,
}

impl SimHandle {
    /// Queues bytes as if they had arrived on the wire.
    pub fn feed(&self, bytes: &[u8]) {
        self.state.lock().rx.extend(bytes.iter().copied());
    }

    pub fn pending_input(&self) -> usize {
        self.state.lock().rx.len()
    }

    /// Every byte transmitted since creation or the last
    /// [`clear_traffic`](Self::clear_traffic). Unlike [`traffic`](Self::traffic),
    /// nothing is dropped.
    pub fn transmitted(&self) -> Vec<u8> {
        self.state.lock().transmitted.clone()
    }

    pub fn transmitted_text(&self) -> String {
        String::from_utf8_lossy(&self.transmitted()).into_owned()
    }

    pub fn traffic(&self) -> TrafficLog {
        self.state.lock().traffic.clone()
    }

    pub fn clear_traffic(&self) {
        let mut state = self.state.lock();
        state.traffic.clear();
        state.transmitted.clear();
    }

    pub fn status(&self) -> StatusA {
        self.state.lock().status
    }

    pub fn control(&self) -> ControlB {
        self.state.lock().control
    }

    pub fn frame(&self) -> FrameBits {
        self.state.lock().frame
    }

    pub fn framing(&self) -> Option<Framing> {
        Framing::from_frame_bits(self.frame())
    }

    pub fn divisor(&self) -> u16 {
        self.state.lock().divisor
    }

    pub fn baud_rate(&self, clock_hz: u32) -> u32 {
        let state = self.state.lock();
        effective_baud(clock_hz, state.divisor, state.status.contains(StatusA::U2X))
    }

    /// Number of control, status, frame and divisor register writes.
    pub fn register_writes(&self) -> usize {
        self.state.lock().register_writes
    }
}
