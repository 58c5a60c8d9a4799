use super::finite_or_zero;

/// Detects upward crossings of a fixed threshold.
///
/// A crossing is reported on the first sample at or above the threshold that
/// follows a sample below it. Non-finite input reads as zero.
#[derive(Debug, Clone, Copy)]
pub struct RisingEdge {
    threshold: f32,
    last: f32,
}

impl RisingEdge {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            last: 0.0,
        }
    }

    /// Feed one sample, returning true on a rising crossing.
    #[inline]
    pub fn process(&mut self, x: f32) -> bool {
        let x = finite_or_zero(x);
        let rose = x >= self.threshold && self.last < self.threshold;
        self.last = x;
        rose
    }
}

/// Minimum spacing between accepted events, counted in samples.
///
/// Starts out ready so the very first event is never suppressed.
#[derive(Debug, Clone, Copy)]
pub struct Cooldown {
    window: u32,
    elapsed: u32,
}

impl Cooldown {
    pub fn new(window: u32) -> Self {
        Self {
            window,
            elapsed: window,
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.elapsed >= self.window
    }

    /// Start a new window; call when an event is accepted.
    #[inline]
    pub fn arm(&mut self) {
        self.elapsed = 0;
    }

    /// Advance one sample.
    #[inline]
    pub fn tick(&mut self) {
        self.elapsed = self.elapsed.saturating_add(1);
    }
}

/// Direction of a Schmitt trigger state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Rise,
    Fall,
}

/// Two-threshold comparator.
///
/// Goes high once the input reaches `rise` and low once it drops below `fall`;
/// anything between the two keeps the previous state, so noise around a single
/// crossing point cannot toggle the output.
#[derive(Debug, Clone, Copy)]
pub struct SchmittTrigger {
    rise: f32,
    fall: f32,
    high: bool,
}

impl SchmittTrigger {
    pub fn new(rise: f32, fall: f32) -> Self {
        // An inverted pair would oscillate on every sample
        let fall = fall.min(rise);
        Self {
            rise,
            fall,
            high: false,
        }
    }

    /// Feed one sample, returning the transition it caused, if any.
    #[inline]
    pub fn process(&mut self, x: f32) -> Option<Transition> {
        let x = finite_or_zero(x);
        if !self.high && x >= self.rise {
            self.high = true;
            Some(Transition::Rise)
        } else if self.high && x < self.fall {
            self.high = false;
            Some(Transition::Fall)
        } else {
            None
        }
    }

    pub fn is_high(&self) -> bool {
        self.high
    }
}
