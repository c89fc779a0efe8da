//! Integer/text conversion helpers. These never touch a channel.

use crate::error::{Result, UartError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Radix {
    Binary = 2,
    Octal = 8,
    Decimal = 10,
    Hex = 16,
}

impl TryFrom<u8> for Radix {
    type Error = UartError;

    fn try_from(base: u8) -> Result<Self> {
        match base {
            2 => Ok(Self::Binary),
            8 => Ok(Self::Octal),
            10 => Ok(Self::Decimal),
            16 => Ok(Self::Hex),
            other => Err(UartError::invalid(format!("base {other}"))),
        }
    }
}

/// Formats `value` in `radix`, upper-case digits above 9.
pub fn format_radix(mut value: u16, radix: Radix) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let base = radix as u16;
    // 16 binary digits is the longest a u16 gets.
    let mut scratch = [0u8; 16];
    let mut len = 0;
    while value > 0 {
        let digit = (value % base) as u8;
        scratch[len] = if digit < 10 {
            b'0' + digit
        } else {
            b'A' + digit - 10
        };
        len += 1;
        value /= base;
    }
    scratch[..len].reverse();

    scratch[..len].iter().map(|&b| char::from(b)).collect()
}

/// Formats `value` in a numeric base from {2, 8, 10, 16}.
pub fn to_string_radix(value: u16, base: u8) -> Result<String> {
    Radix::try_from(base).map(|radix| format_radix(value, radix))
}

/// Accumulates decimal digits left to right, stopping at the first '.'.
///
/// Other characters are skipped, so "7x9" gives 79. Overflow wraps.
pub fn parse_int(text: &str) -> u16 {
    parse_int_bytes(text.as_bytes())
}

pub fn parse_int_bytes(bytes: &[u8]) -> u16 {
    let mut value: u16 = 0;
    for &b in bytes {
        match b {
            b'0'..=b'9' => value = value.wrapping_mul(10).wrapping_add(u16::from(b - b'0')),
            b'.' => break,
            _ => {}
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_a_single_digit_in_every_base() {
        for base in [2, 8, 10, 16] {
            assert_eq!(to_string_radix(0, base).unwrap(), "0");
        }
    }

    #[test]
    fn known_values() {
        assert_eq!(format_radix(255, Radix::Hex), "FF");
        assert_eq!(format_radix(5, Radix::Binary), "101");
        assert_eq!(format_radix(8, Radix::Octal), "10");
        assert_eq!(format_radix(u16::MAX, Radix::Binary), "1".repeat(16));
        assert_eq!(format_radix(u16::MAX, Radix::Decimal), "65535");
        assert_eq!(format_radix(0xBEEF, Radix::Hex), "BEEF");
    }

    #[test]
    fn unsupported_base_is_rejected() {
        for base in [0, 1, 3, 7, 9, 12, 36] {
            assert!(to_string_radix(10, base).is_err());
        }
    }

    #[test]
    fn parse_stops_at_point_and_skips_other_characters() {
        assert_eq!(parse_int("123.45"), 123);
        assert_eq!(parse_int(""), 0);
        assert_eq!(parse_int("7x9"), 79);
        assert_eq!(parse_int("-12"), 12);
        assert_eq!(parse_int(".5"), 0);
    }

    #[test]
    fn parse_wraps_on_overflow() {
        assert_eq!(parse_int("65536"), 0);
        assert_eq!(parse_int("70000"), 70000u32 as u16);
    }

    #[test]
    fn decimal_round_trip_holds_for_every_value() {
        for v in 0..=u16::MAX {
            assert_eq!(parse_int(&format_radix(v, Radix::Decimal)), v);
        }
    }

    #[test]
    fn other_bases_do_not_round_trip() {
        assert_ne!(parse_int(&format_radix(255, Radix::Hex)), 255);
        assert_ne!(parse_int(&format_radix(5, Radix::Binary)), 5);
    }
}
