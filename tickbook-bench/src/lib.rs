//! # TickBook Bench
//!
//! Benchmarking utilities for TickBook performance testing.

pub mod generator;
pub mod latency;
pub mod throughput;
