//! transport - Terminal front panel for the clock and step sequencer
//!
//! Run with: cargo run --bin transport
//! Log with: RUST_LOG=pulse_transport=debug cargo run --bin transport 2>transport.log

mod app;
mod ui;

use app::Transport;
use pulse_transport::sequencing::{PatternUpdate, Step};
use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Sixteenth-note acid line, values in semitones above A2
    let line = vec![
        Step::on(0.0).with_accent(true),
        Step::on(12.0).with_length(30.0),
        Step::rest(),
        Step::on(0.0),
        Step::on(3.0).with_slide(true),
        Step::on(7.0).with_slide(true),
        Step::on(0.0).with_length(80.0),
        Step::rest(),
        Step::on(10.0).with_accent(true),
        Step::on(12.0).with_slide(true),
        Step::on(0.0),
        Step::on(0.0).with_length(20.0),
        Step::on(5.0).with_accent(true),
        Step::rest(),
        Step::on(3.0),
        Step::on(15.0).with_slide(true).with_length(100.0),
    ];

    Transport::new()
        .bpm(124.0)
        .pattern(PatternUpdate::new(line).division(16).swing(12.0))
        .run()
}
