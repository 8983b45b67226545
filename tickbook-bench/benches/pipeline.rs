//! Decode-and-apply pipeline benchmark with a latency report.
//!
//! Run with: cargo bench -p tickbook-bench --bench pipeline

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tickbook_bench::generator::UpdateGenerator;
use tickbook_bench::latency::LatencyRecorder;
use tickbook_bench::throughput::{measure_wire, run_pipeline};
use tickbook_core::TickDecoder;
use tickbook_marketdata::{BookConfig, BookRegistry};

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let count = 20_000;

    for symbols in [1usize, 4] {
        let wire = UpdateGenerator::new(17, symbols).wire(count);
        group.throughput(Throughput::Bytes(wire.len() as u64));
        group.bench_with_input(BenchmarkId::new("symbols", symbols), &wire, |b, wire| {
            let mut decoder = TickDecoder::new();
            let mut registry = BookRegistry::new(BookConfig::default());
            b.iter(|| {
                let mut source = &wire[..];
                black_box(run_pipeline(&mut decoder, &mut registry, &mut source).map(|r| r.messages))
            })
        });
    }

    group.finish();
}

/// Prints per-message latency percentiles once, outside criterion's sampling.
fn report_latency(_c: &mut Criterion) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let Ok(mut recorder) = LatencyRecorder::new() else {
        return;
    };
    let mut generator = UpdateGenerator::new(23, 4);
    let mut decoder = TickDecoder::new();
    let mut registry = BookRegistry::new(BookConfig::default());

    for _ in 0..100_000 {
        let message = generator.wire(1);
        let _ = recorder.measure(|| {
            decoder.feed(&message, |event| {
                let _ = registry.apply(event);
            })
        });
    }
    if let Some(stats) = recorder.stats() {
        println!("decode+apply latency: {stats}");
    }

    if let Ok(result) = measure_wire(&generator.wire(100_000), BookConfig::default()) {
        println!(
            "decode+apply throughput: {:.0} msg/s, {:.1} MB/s",
            result.messages_per_second(),
            result.mb_per_second()
        );
    }
}

criterion_group!(benches, bench_pipeline, report_latency);
criterion_main!(benches);
