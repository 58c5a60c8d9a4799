/// A fixed-width pulse fired on demand.
///
/// Outputs 1.0 for `width` samples after `fire`, then 0.0. Firing again while
/// high restarts the count.
#[derive(Debug, Clone, Copy)]
pub struct OneShot {
    width: u32,
    remaining: u32,
}

impl OneShot {
    pub fn new(width: u32) -> Self {
        Self {
            width: width.max(1),
            remaining: 0,
        }
    }

    pub fn fire(&mut self) {
        self.remaining = self.width;
    }

    /// Produce the next sample.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            1.0
        } else {
            0.0
        }
    }
}

/// Phase counter producing a rectangular pulse train.
///
/// The phase counts samples since the train started; a sample is high while
/// `phase mod period` is below the pulse width.
#[derive(Debug, Clone, Copy, Default)]
pub struct PulseTrain {
    phase: u64,
}

impl PulseTrain {
    pub fn new() -> Self {
        Self { phase: 0 }
    }

    /// Produce the next sample of a train with the given period and width.
    #[inline]
    pub fn next_sample(&mut self, period: u64, width: u64) -> f32 {
        let period = period.max(1);
        let out = if self.phase % period < width { 1.0 } else { 0.0 };
        self.phase = self.phase.wrapping_add(1);
        out
    }

    pub fn reset(&mut self) {
        self.phase = 0;
    }
}
