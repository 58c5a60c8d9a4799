/*
Linear CV Glide
===============

A slide between two sequencer steps is a straight line from the current CV to
the target, covering `slide_time` seconds.

    CV
   5.0 ┤              ┌──────────
       │            ╱
       │          ╱
       │        ╱
   0.0 ┼──────╱
       └──────┬───────┬──────────→ samples
            start   start + N

The increment is computed once, when the glide starts:

    N         = round(slide_time * sample_rate)   (at least 1)
    increment = (target - start) / N

Each sample adds one increment while samples remain. On the last sample the
value snaps to the target so float error never leaves the CV short of it.
*/

/// A control value that either holds or glides linearly to a target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearRamp {
    value: f32,
    target: f32,
    increment: f32,
    remaining: u32,
}

impl LinearRamp {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            target: value,
            increment: 0.0,
            remaining: 0,
        }
    }

    /// Set the value immediately, cancelling any glide.
    pub fn jump(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.increment = 0.0;
        self.remaining = 0;
    }

    /// Glide from the current value to `target` over `samples` samples.
    pub fn glide_to(&mut self, target: f32, samples: u32) {
        if samples == 0 {
            self.jump(target);
            return;
        }
        self.target = target;
        self.increment = (target - self.value) / samples as f32;
        self.remaining = samples;
    }

    /// Apply one increment of an active glide and return the value.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.value = self.target;
            } else {
                self.value += self.increment;
            }
        }
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_gliding(&self) -> bool {
        self.remaining > 0
    }
}
