//! Benchmarks for wired processor graphs.

mod graph;

pub use graph::bench_graph;
