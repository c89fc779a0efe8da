use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub struct TrafficEntry {
    pub timestamp: u64,
    pub direction: Direction,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Direction {
    Rx,
    Tx,
}

pub const DEFAULT_ENTRY_BYTES: usize = 256;

/// Bounded record of the bytes that crossed a channel.
///
/// Consecutive bytes in the same direction share an entry until it holds
/// `max_entry_bytes`, so a transcript reads as alternating runs of RX and
/// TX and the log never holds more than `max_entries * max_entry_bytes`
/// bytes.
#[derive(Debug, Clone)]
pub struct TrafficLog {
    entries: Vec<TrafficEntry>,
    max_entries: usize,
    max_entry_bytes: usize,
}

impl TrafficLog {
    pub fn new(max_entries: usize) -> Self {
        Self::with_entry_limit(max_entries, DEFAULT_ENTRY_BYTES)
    }

    pub fn with_entry_limit(max_entries: usize, max_entry_bytes: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries,
            max_entry_bytes: max_entry_bytes.max(1),
        }
    }

    pub fn push(&mut self, direction: Direction, mut data: &[u8]) {
        if let Some(last) = self.entries.last_mut() {
            if last.direction == direction {
                let room = self.max_entry_bytes.saturating_sub(last.data.len());
                let (head, rest) = data.split_at(room.min(data.len()));
                last.data.extend_from_slice(head);
                data = rest;
            }
        }

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        for chunk in data.chunks(self.max_entry_bytes) {
            self.entries.push(TrafficEntry {
                timestamp,
                direction,
                data: chunk.to_vec(),
            });
        }

        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
        }
    }

    pub fn entries(&self) -> &[TrafficEntry] {
        &self.entries
    }

    /// All bytes seen in one direction, in order.
    pub fn bytes(&self, direction: Direction) -> Vec<u8> {
        self.entries
            .iter()
            .filter(|e| e.direction == direction)
            .flat_map(|e| e.data.iter().copied())
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn to_text(&self, show_hex: bool) -> String {
        let mut result = String::new();
        for entry in &self.entries {
            result.push_str(match entry.direction {
                Direction::Rx => "RX: ",
                Direction::Tx => "TX: ",
            });
            if show_hex {
                for byte in &entry.data {
                    let _ = write!(result, "{byte:02X} ");
                }
            } else {
                result.extend(entry.data.iter().flat_map(|b| b.escape_ascii()).map(char::from));
            }
            result.push('\n');
        }
        result
    }
}
