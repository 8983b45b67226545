//! Wire encoding of update events.
//!
//! The inverse of [`crate::wire::parse_message`]: numbers are written with
//! exactly two fractional digits, so any event whose instrument is seven
//! bytes long and whose timestamp has ten digits round-trips through the
//! decoder.

use crate::event::{PRICE_SCALE, UpdateEvent};
use std::io::Write;

/// Writes a scaled value as `<integer>.<two digits>`.
fn write_fixed_point(out: &mut Vec<u8>, scaled: i64) {
    let integer = scaled / PRICE_SCALE;
    let fraction = scaled % PRICE_SCALE;
    // Writing into a Vec cannot fail.
    let _ = write!(out, "{integer}.{fraction:02}");
}

/// Appends the wire form of `event` to `out`.
///
/// # Arguments
/// * `event` - Event to encode
/// * `out` - Destination buffer
///
/// # Returns
/// The number of bytes appended.
pub fn encode_update(event: &UpdateEvent, out: &mut Vec<u8>) -> usize {
    let start = out.len();
    let _ = write!(out, "t={:010}|i={}|p=", event.timestamp, event.instrument);
    write_fixed_point(out, event.price);
    out.extend_from_slice(b"|q=");
    write_fixed_point(out, event.quantity);
    out.extend_from_slice(b"|s=");
    out.push(event.side.wire_flag());
    out.len() - start
}

/// Returns the wire form of `event` as a new buffer.
#[must_use]
pub fn encode_to_vec(event: &UpdateEvent) -> Vec<u8> {
    let mut out = Vec::with_capacity(crate::wire::MAX_MESSAGE_LEN);
    encode_update(event, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Side;

    #[test]
    fn test_encode_shortest() {
        let event = UpdateEvent::new(1_638_848_595, "BTC-USD", 1, 0, Side::Bid);
        assert_eq!(
            encode_to_vec(&event),
            b"t=1638848595|i=BTC-USD|p=0.01|q=0.00|s=b"
        );
    }

    #[test]
    fn test_encode_longest() {
        let event = UpdateEvent::new(1_638_848_595, "BTC-USD", 99999, 1_073_741_823, Side::Ask);
        let mut out = Vec::new();
        let written = encode_update(&event, &mut out);
        assert_eq!(out, b"t=1638848595|i=BTC-USD|p=999.99|q=10737418.23|s=s");
        assert_eq!(written, out.len());
    }

    #[test]
    fn test_encode_appends() {
        let event = UpdateEvent::new(1_638_848_595, "ETH-USD", 1050, 200, Side::Bid);
        let mut out = b"prefix".to_vec();
        encode_update(&event, &mut out);
        assert!(out.starts_with(b"prefix"));
        assert!(out.ends_with(b"p=10.50|q=2.00|s=b"));
    }
}
