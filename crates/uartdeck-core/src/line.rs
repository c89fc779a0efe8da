//! Interactive line editing on top of a channel.

use crate::channel::Channel;
use crate::device::ChannelDevice;

/// Usable characters of the reference line buffer.
pub const LINE_CAPACITY: usize = 19;

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;
const ERASE: &str = "\x08 \x08";

/// Fixed-capacity line storage. Never holds more than `N` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer<const N: usize = LINE_CAPACITY> {
    buffer: [u8; N],
    len: usize,
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LineBuffer<N> {
    pub const fn new() -> Self {
        Self {
            buffer: [0; N],
            len: 0,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// The line as text, one `char` per stored byte (bytes above 0x7F map
    /// to U+0080..U+00FF), so the char count always equals [`len`](Self::len).
    pub fn text(&self) -> String {
        self.as_bytes().iter().map(|&b| char::from(b)).collect()
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

/// Storage the editor accumulates into.
trait EditBuffer {
    fn len(&self) -> usize;
    fn is_full(&self) -> bool;
    fn push(&mut self, byte: u8);
    fn pop(&mut self);
}

impl<const N: usize> EditBuffer for LineBuffer<N> {
    fn len(&self) -> usize {
        self.len
    }

    fn is_full(&self) -> bool {
        self.len == N
    }

    fn push(&mut self, byte: u8) {
        if self.len < N {
            self.buffer[self.len] = byte;
            self.len += 1;
        }
    }

    fn pop(&mut self) {
        self.len = self.len.saturating_sub(1);
    }
}

struct Bounded {
    bytes: Vec<u8>,
    limit: usize,
}

impl EditBuffer for Bounded {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn is_full(&self) -> bool {
        self.bytes.len() >= self.limit
    }

    fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    fn pop(&mut self) {
        self.bytes.pop();
    }
}

impl<D: ChannelDevice> Channel<D> {
    /// Reads one edited line into `line`, replacing its contents.
    ///
    /// Received bytes are echoed as they are stored. Backspace and delete
    /// erase the last stored byte; CR or LF ends the line and is neither
    /// echoed nor stored. Once the buffer is full, further bytes are
    /// dropped without echo until the terminator arrives. Returns the
    /// line length.
    pub fn read_line_into<const N: usize>(&mut self, line: &mut LineBuffer<N>) -> usize {
        line.clear();
        self.edit(line, |ch| Some(ch.receive()));
        line.len()
    }

    /// Same editing rules as [`read_line_into`](Self::read_line_into) with a
    /// limit of `max_len` bytes. The received bytes are returned unchanged.
    pub fn read_line(&mut self, max_len: usize) -> Vec<u8> {
        let mut line = Bounded {
            bytes: Vec::with_capacity(max_len),
            limit: max_len,
        };
        self.edit(&mut line, |ch| Some(ch.receive()));
        line.bytes
    }

    /// Edits a line from bytes that have already arrived, without waiting.
    ///
    /// Returns `None` if the input runs dry before a terminator; what was
    /// typed so far stays in `line`.
    pub fn read_line_received<const N: usize>(&mut self, line: &mut LineBuffer<N>) -> Option<usize> {
        line.clear();
        let ended = self.edit(line, |ch| ch.available().then(|| ch.receive()));
        ended.then(|| line.len())
    }

    /// Returns `false` when `next` runs out of bytes before a terminator.
    fn edit<B: EditBuffer>(&mut self, line: &mut B, mut next: impl FnMut(&mut Self) -> Option<u8>) -> bool {
        loop {
            let Some(byte) = next(self) else {
                return false;
            };
            match byte {
                BACKSPACE | DELETE => {
                    if line.len() > 0 {
                        line.pop();
                        self.send_str(ERASE);
                    }
                }
                b'\r' | b'\n' => return true,
                byte if !line.is_full() => {
                    self.send(byte);
                    line.push(byte);
                }
                byte => log::trace!("channel {}: line full, dropped {:#04x}", self.index(), byte),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimDevice, SimHandle};

    fn channel_with_input(input: &[u8]) -> (Channel<SimDevice>, SimHandle) {
        let dev = SimDevice::new();
        let handle = dev.handle();
        handle.feed(input);
        (Channel::new(0, dev), handle)
    }

    #[test]
    fn backspace_erases_previous_character() {
        let (mut ch, sim) = channel_with_input(b"AB\x08C\r");
        let mut line = LineBuffer::<LINE_CAPACITY>::new();
        assert_eq!(ch.read_line_into(&mut line), 2);
        assert_eq!(line.as_bytes(), b"AC");
        assert_eq!(sim.transmitted(), b"AB\x08 \x08C");
    }

    #[test]
    fn delete_behaves_like_backspace() {
        let (mut ch, _sim) = channel_with_input(b"xy\x7f\n");
        assert_eq!(ch.read_line(8), b"x");
    }

    #[test]
    fn backspace_on_empty_line_is_ignored() {
        let (mut ch, sim) = channel_with_input(b"\x08\x7fz\r");
        assert_eq!(ch.read_line(8), b"z");
        assert_eq!(sim.transmitted(), b"z");
    }

    #[test]
    fn overflow_is_dropped_without_echo() {
        let (mut ch, sim) = channel_with_input(b"abcdef\r");
        let mut line = LineBuffer::<4>::new();
        assert_eq!(ch.read_line_into(&mut line), 4);
        assert_eq!(line.text(), "abcd");
        assert_eq!(sim.transmitted(), b"abcd");
    }

    #[test]
    fn erasing_after_overflow_makes_room_again() {
        let (mut ch, _sim) = channel_with_input(b"abcX\x08d\r");
        assert_eq!(ch.read_line(3), b"abd");
    }

    #[test]
    fn high_bytes_count_once_against_the_limit() {
        let (mut ch, sim) = channel_with_input(b"\xff\xfe\xe9\x80\r");
        let line = ch.read_line(3);
        assert_eq!(line, [0xff, 0xfe, 0xe9]);
        assert_eq!(sim.transmitted(), [0xff, 0xfe, 0xe9]);
    }

    #[test]
    fn text_has_one_char_per_stored_byte() {
        let (mut ch, _sim) = channel_with_input(b"a\xff\xe9\r");
        let mut line = LineBuffer::<3>::new();
        ch.read_line_into(&mut line);
        let text = line.text();
        assert_eq!(text.chars().count(), line.len());
        assert_eq!(text, "a\u{ff}\u{e9}");
    }

    #[test]
    fn received_line_waits_for_terminator() {
        let (mut ch, sim) = channel_with_input(b"12");
        let mut line = LineBuffer::<LINE_CAPACITY>::new();
        assert_eq!(ch.read_line_received(&mut line), None);
        assert_eq!(line.as_bytes(), b"12");

        sim.feed(b"3\r");
        assert_eq!(ch.read_line_received(&mut line), Some(1));
        assert_eq!(line.as_bytes(), b"3");
    }

    #[test]
    fn received_line_on_empty_input_is_none() {
        let (mut ch, _sim) = channel_with_input(b"");
        let mut line = LineBuffer::<LINE_CAPACITY>::new();
        assert_eq!(ch.read_line_received(&mut line), None);
        assert!(line.is_empty());
    }

    #[test]
    fn terminator_is_not_stored_and_next_read_starts_fresh() {
        let (mut ch, sim) = channel_with_input(b"one\r\ntwo\r");
        let mut line = LineBuffer::<LINE_CAPACITY>::new();
        ch.read_line_into(&mut line);
        assert_eq!(line.as_bytes(), b"one");
        ch.read_line_into(&mut line);
        assert!(line.is_empty());
        ch.read_line_into(&mut line);
        assert_eq!(line.as_bytes(), b"two");
        assert_eq!(sim.pending_input(), 0);
    }

    #[test]
    fn reference_capacity_truncates_long_input() {
        let mut input = vec![b'9'; 30];
        input.push(b'\r');
        let (mut ch, _sim) = channel_with_input(&input);
        let mut line = LineBuffer::<LINE_CAPACITY>::new();
        ch.read_line_into(&mut line);
        assert!(line.is_full());
        assert_eq!(line.len(), 19);
    }
}
