//! Text wire format for price-level updates.
//!
//! Messages are ASCII and concatenated with no separator:
//!
//! ```text
//! t=<10-digit unix timestamp>|i=<7-char symbol>|p=<decimal>|q=<decimal>|s=<b|s>
//! ```
//!
//! Timestamp and instrument have fixed widths, so their offsets are fixed.
//! Price and quantity carry up to nine integer digits followed by a decimal
//! point and exactly two fractional digits; everything after the price is
//! located relative to where the price ends.
//!
//! All readers here work on a borrowed slice and never allocate. They return
//! `Ok(None)` when the slice ends before the message does, so callers can wait
//! for more bytes.

use crate::error::{Error, Field, Result};

/// Shortest well-formed message.
pub const SHORTEST_UPDATE: &[u8] = b"t=1638848595|i=BTC-USD|p=0.01|q=0.00|s=b";

/// Minimum message length in bytes.
pub const MIN_MESSAGE_LEN: usize = SHORTEST_UPDATE.len();

/// Offset of the first timestamp digit.
pub const TIMESTAMP_OFFSET: usize = 2;
/// Number of timestamp digits.
pub const TIMESTAMP_LEN: usize = 10;
/// Offset of the first instrument byte.
pub const INSTRUMENT_OFFSET: usize = 15;
/// Number of instrument bytes.
pub const INSTRUMENT_LEN: usize = 7;
/// Offset of the first price byte.
pub const PRICE_OFFSET: usize = 25;
/// Bytes scanned for a decimal point in a numeric field.
pub const NUMERIC_SCAN_WINDOW: usize = 10;
/// Width of the `|q=` and `|s=` key markers.
pub const KEY_MARKER_LEN: usize = 3;

/// Widest numeric field: nine integer digits, the point and two decimals.
const MAX_NUMERIC_LEN: usize = NUMERIC_SCAN_WINDOW + 2;

/// Largest timestamp that fits the ten-digit field.
pub const MAX_TIMESTAMP: u64 = 9_999_999_999;

/// Largest scaled value a numeric field can carry (`999999999.99`).
pub const MAX_FIXED_POINT: i64 = 99_999_999_999;

/// Maximum message length in bytes.
pub const MAX_MESSAGE_LEN: usize =
    PRICE_OFFSET + MAX_NUMERIC_LEN + KEY_MARKER_LEN + MAX_NUMERIC_LEN + KEY_MARKER_LEN + 1;

/// Earliest index at which the final `=` of a message can appear.
pub const EARLIEST_LAST_EQUALS_INDEX: usize = MIN_MESSAGE_LEN - 2;

/// How the decoder decides that a buffered message is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramingMode {
    /// Treat any `=` at or beyond [`EARLIEST_LAST_EQUALS_INDEX`] as a sign that
    /// the message is complete. Assumes well-formed input; key markers are
    /// not checked.
    #[default]
    Heuristic,
    /// Check every key marker and the side flag before accepting a message.
    Strict,
}

/// Fixed-point number read from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPoint {
    /// Value scaled by 100.
    pub value: i64,
    /// Index of the byte after the second fractional digit.
    pub next: usize,
}

/// One message parsed from a borrowed buffer.
///
/// The instrument is still raw bytes; interning is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawUpdate<'a> {
    /// Seconds since the unix epoch.
    pub timestamp: u64,
    /// Raw instrument bytes.
    pub instrument: &'a [u8],
    /// Price × 100.
    pub price: i64,
    /// Quantity × 100.
    pub quantity: i64,
    /// True for `s=b`.
    pub is_buy: bool,
    /// Number of bytes the message occupies.
    pub len: usize,
}

#[inline(always)]
fn digit(byte: u8, field: Field, offset: usize) -> Result<i64> {
    if byte.is_ascii_digit() {
        Ok(i64::from(byte - b'0'))
    } else {
        Err(Error::malformed_field(field, offset))
    }
}

/// Returns true once the buffered bytes look like they hold a whole message.
///
/// This only checks for an `=` at or past the earliest position the final key
/// can take. It does not validate length or field order.
#[inline]
#[must_use]
pub fn frame_candidate(bytes: &[u8]) -> bool {
    bytes.len() >= MIN_MESSAGE_LEN && bytes[EARLIEST_LAST_EQUALS_INDEX..].contains(&b'=')
}

/// Reads the fixed-width timestamp.
///
/// # Errors
/// Returns [`Error::MalformedField`] if any of the ten bytes is not a digit.
#[inline]
pub fn read_timestamp(bytes: &[u8]) -> Result<Option<u64>> {
    let Some(window) = bytes.get(TIMESTAMP_OFFSET..TIMESTAMP_OFFSET + TIMESTAMP_LEN) else {
        return Ok(None);
    };
    let mut timestamp: i64 = 0;
    for (i, &byte) in window.iter().enumerate() {
        timestamp = timestamp * 10 + digit(byte, Field::Timestamp, TIMESTAMP_OFFSET + i)?;
    }
    Ok(Some(timestamp as u64))
}

/// Reads a two-decimal number starting at `start` as an integer scaled by 100.
///
/// Scans up to [`NUMERIC_SCAN_WINDOW`] bytes for the decimal point, then reads
/// exactly two fractional digits.
///
/// # Arguments
/// * `bytes` - Message bytes
/// * `start` - Offset of the first byte of the number
/// * `field` - Field being read, for error reporting
///
/// # Errors
/// Returns [`Error::MalformedField`] if no decimal point appears within the
/// scan window or a non-digit is found.
#[inline]
pub fn read_fixed_point(bytes: &[u8], start: usize, field: Field) -> Result<Option<FixedPoint>> {
    let mut value: i64 = 0;
    for i in start..start + NUMERIC_SCAN_WINDOW {
        let Some(&byte) = bytes.get(i) else {
            return Ok(None);
        };
        if byte == b'.' {
            let Some(&[tens, ones]) = bytes.get(i + 1..i + 3) else {
                return Ok(None);
            };
            let fraction = digit(tens, field, i + 1)? * 10 + digit(ones, field, i + 2)?;
            return Ok(Some(FixedPoint {
                value: value * 100 + fraction,
                next: i + 3,
            }));
        }
        value = value * 10 + digit(byte, field, i)?;
    }
    Err(Error::malformed_field(field, start))
}

/// Counts the leading bytes that cannot start a message.
///
/// Returns the offset of the first `t=` and `true`, or, when there is none,
/// the number of bytes that can be dropped and `false`. A trailing `t` is
/// never counted since it may begin the next message.
#[must_use]
pub fn leading_garbage(bytes: &[u8]) -> (usize, bool) {
    match bytes.windows(2).position(|pair| pair == b"t=") {
        Some(index) => (index, true),
        None if bytes.last() == Some(&b't') => (bytes.len() - 1, false),
        None => (bytes.len(), false),
    }
}

/// Number of leading bytes to drop after the message at `bytes[0]` failed to
/// parse.
///
/// Skips to the next `t=` past the first byte, so a following message that is
/// already buffered survives. At least 1 for a non-empty slice.
#[must_use]
pub fn resync_len(bytes: &[u8]) -> usize {
    match bytes.split_first() {
        None => 0,
        Some((_, rest)) => 1 + leading_garbage(rest).0,
    }
}

#[inline]
fn expect_marker(bytes: &[u8], offset: usize, marker: &'static str) -> Result<Option<()>> {
    match bytes.get(offset..offset + marker.len()) {
        None => Ok(None),
        Some(found) if found == marker.as_bytes() => Ok(Some(())),
        Some(_) => Err(Error::malformed_frame(offset, marker)),
    }
}

/// Parses one message from the start of `bytes`.
///
/// Returns `Ok(None)` if `bytes` ends before the message does.
///
/// # Errors
/// Returns [`Error::MalformedField`] for bad numeric fields and, under
/// [`FramingMode::Strict`], [`Error::MalformedFrame`] for bad key markers or
/// side flags.
pub fn parse_message(bytes: &[u8], mode: FramingMode) -> Result<Option<RawUpdate<'_>>> {
    let strict = mode == FramingMode::Strict;
    if strict {
        for (offset, marker) in [(0, "t="), (12, "|i="), (22, "|p=")] {
            if expect_marker(bytes, offset, marker)?.is_none() {
                return Ok(None);
            }
        }
    }

    let Some(timestamp) = read_timestamp(bytes)? else {
        return Ok(None);
    };
    let Some(instrument) = bytes.get(INSTRUMENT_OFFSET..INSTRUMENT_OFFSET + INSTRUMENT_LEN) else {
        return Ok(None);
    };
    let Some(price) = read_fixed_point(bytes, PRICE_OFFSET, Field::Price)? else {
        return Ok(None);
    };
    if strict && expect_marker(bytes, price.next, "|q=")?.is_none() {
        return Ok(None);
    }
    let Some(quantity) = read_fixed_point(bytes, price.next + KEY_MARKER_LEN, Field::Quantity)?
    else {
        return Ok(None);
    };
    if strict && expect_marker(bytes, quantity.next, "|s=")?.is_none() {
        return Ok(None);
    }

    let side_index = quantity.next + KEY_MARKER_LEN;
    let Some(&flag) = bytes.get(side_index) else {
        return Ok(None);
    };
    if strict && flag != b'b' && flag != b's' {
        return Err(Error::malformed_frame(side_index, "b|s"));
    }

    Ok(Some(RawUpdate {
        timestamp,
        instrument,
        price: price.value,
        quantity: quantity.value,
        is_buy: flag == b'b',
        len: side_index + 1,
    }))
}
