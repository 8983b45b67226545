//! Throughput measurement over the full decode and apply path.

use std::time::{Duration, Instant};

use tickbook_core::{ByteSource, TickDecoder};
use tickbook_marketdata::{BookConfig, BookRegistry};

/// Result of a throughput run.
#[derive(Debug, Clone)]
pub struct ThroughputResult {
    /// Total messages processed.
    pub messages: u64,
    /// Total bytes processed.
    pub bytes: u64,
    /// Updates rejected by a full book side.
    pub rejected: u64,
    /// Total duration.
    pub duration: Duration,
}

impl ThroughputResult {
    /// Returns messages per second.
    #[must_use]
    pub fn messages_per_second(&self) -> f64 {
        self.messages as f64 / self.duration.as_secs_f64()
    }

    /// Returns bytes per second.
    #[must_use]
    pub fn bytes_per_second(&self) -> f64 {
        self.bytes as f64 / self.duration.as_secs_f64()
    }

    /// Returns megabytes per second.
    #[must_use]
    pub fn mb_per_second(&self) -> f64 {
        self.bytes_per_second() / (1024.0 * 1024.0)
    }
}

/// Decodes `source` to exhaustion, applying every update to `registry`.
///
/// # Errors
/// Returns the first decoding error.
pub fn run_pipeline<S>(
    decoder: &mut TickDecoder,
    registry: &mut BookRegistry,
    source: &mut S,
) -> tickbook_core::Result<ThroughputResult>
where
    S: ByteSource + ?Sized,
{
    let before = decoder.stats();
    let mut rejected = 0u64;
    let start = Instant::now();

    decoder.parse(source, |event| {
        if registry.apply(event).is_err() {
            rejected += 1;
        }
    })?;

    let duration = start.elapsed();
    let after = decoder.stats();
    Ok(ThroughputResult {
        messages: after.messages - before.messages,
        bytes: after.bytes_consumed - before.bytes_consumed,
        rejected,
        duration,
    })
}

/// Runs [`run_pipeline`] over `wire` with a fresh decoder and registry.
///
/// # Errors
/// Returns the first decoding error.
pub fn measure_wire(wire: &[u8], config: BookConfig) -> tickbook_core::Result<ThroughputResult> {
    let mut decoder = TickDecoder::new();
    let mut registry = BookRegistry::new(config);
    let mut source = wire;
    let result = run_pipeline(&mut decoder, &mut registry, &mut source)?;
    tracing::debug!(
        messages = result.messages,
        books = registry.len(),
        rate = result.messages_per_second(),
        "pipeline run complete"
    );
    Ok(result)
}
