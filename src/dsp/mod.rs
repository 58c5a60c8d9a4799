//! Low-level per-sample primitives used by the render-thread processors.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside processor structs. They stay focused on one sample at
//! a time so the processors can layer scheduling and messaging on top.

/// Threshold crossings, Schmitt triggers and cooldown windows.
pub mod edge;
/// Fixed-width one-shot pulses and phase-driven pulse trains.
pub mod pulse;
/// Linear glide between control-voltage values.
pub mod ramp;

pub use edge::{Cooldown, RisingEdge, SchmittTrigger, Transition};
pub use pulse::{OneShot, PulseTrain};
pub use ramp::LinearRamp;

/// Replace NaN and infinities with silence.
#[inline]
pub(crate) fn finite_or_zero(x: f32) -> f32 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Sample `i` of an optional input; unconnected or short inputs read as 0.
#[inline]
pub(crate) fn input_at(input: Option<&&[f32]>, i: usize) -> f32 {
    input.and_then(|buf| buf.get(i)).copied().unwrap_or(0.0)
}
