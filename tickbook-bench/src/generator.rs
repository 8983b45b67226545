//! Deterministic synthetic update streams.

use tickbook_core::{Side, UpdateEvent, encode_update};

/// Symbols used by generated streams.
pub const SYMBOLS: [&str; 4] = ["BTC-USD", "ETH-USD", "SOL-USD", "ADA-USD"];

/// Xorshift-driven generator of price-level updates around a drifting mid.
///
/// The same seed always yields the same stream. Roughly one update in eight
/// is a level delete.
#[derive(Debug, Clone)]
pub struct UpdateGenerator {
    state: u64,
    timestamp: u64,
    mid: i64,
    symbols: usize,
}

impl UpdateGenerator {
    /// Creates a generator.
    ///
    /// # Arguments
    /// * `seed` - Non-zero seed; zero is replaced by a fixed constant
    /// * `symbols` - Number of distinct instruments, clamped to `1..=SYMBOLS.len()`
    #[must_use]
    pub fn new(seed: u64, symbols: usize) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
            timestamp: 1_638_848_595,
            mid: 4_800_000,
            symbols: symbols.clamp(1, SYMBOLS.len()),
        }
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Produces the next update.
    pub fn next_event(&mut self) -> UpdateEvent {
        let r = self.next_u64();
        self.timestamp += r & 1;
        self.mid += ((r >> 1) % 5) as i64 - 2;

        let side = if (r >> 4) & 1 == 0 { Side::Bid } else { Side::Ask };
        let offset = 1 + ((r >> 5) % 150) as i64;
        let price = match side {
            Side::Bid => self.mid - offset,
            Side::Ask => self.mid + offset,
        };
        let quantity = if (r >> 13) % 8 == 0 {
            0
        } else {
            1 + ((r >> 16) % 1_000_000) as i64
        };
        let symbol = SYMBOLS[((r >> 40) % self.symbols as u64) as usize];

        UpdateEvent::new(self.timestamp, symbol, price, quantity, side)
    }

    /// Produces `count` updates.
    pub fn events(&mut self, count: usize) -> Vec<UpdateEvent> {
        (0..count).map(|_| self.next_event()).collect()
    }

    /// Produces `count` updates already encoded as one concatenated stream.
    pub fn wire(&mut self, count: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(count * 48);
        for _ in 0..count {
            let event = self.next_event();
            encode_update(&event, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickbook_core::TickDecoder;

    #[test]
    fn test_deterministic() {
        let a = UpdateGenerator::new(42, 2).events(100);
        let b = UpdateGenerator::new(42, 2).events(100);
        assert_eq!(a, b);
    }

    #[test]
    fn test_wire_decodes() {
        let wire = UpdateGenerator::new(7, 4).wire(500);
        let mut decoder = TickDecoder::new();
        let mut count = 0;
        decoder.feed(&wire, |_| count += 1).unwrap();
        assert_eq!(count, 500);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_prices_stay_on_their_side() {
        let mut generator = UpdateGenerator::new(3, 1);
        for _ in 0..1000 {
            let event = generator.next_event();
            match event.side {
                Side::Bid => assert!(event.price < generator.mid),
                Side::Ask => assert!(event.price > generator.mid),
            }
            assert_eq!(&*event.instrument, "BTC-USD");
        }
    }
}
