/// Step length expressed as clock pulses per step.
///
/// The selector is a note-value denominator (4 = quarter, 8 = eighth, ...).
/// Known selectors map through an exact rational table; anything else falls
/// back to `16 / selector`. Non-integer results give triplet and dotted
/// feels; results below one pulse ratchet several steps per pulse.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Division {
    selector: i32,
    dotted: bool,
}

/// (selector, numerator, denominator) of pulses per step.
const TABLE: [(i32, u32, u32); 11] = [
    (1, 16, 1),
    (2, 8, 1),
    (3, 16, 3), // half-note triplet
    (4, 4, 1),
    (6, 8, 3), // quarter triplet
    (8, 2, 1),
    (12, 4, 3), // eighth triplet
    (16, 1, 1),
    (24, 2, 3), // sixteenth triplet
    (32, 1, 2),
    (48, 1, 3),
];

impl Division {
    pub const WHOLE: Division = Division::new(1);
    pub const HALF: Division = Division::new(2);
    pub const QUARTER: Division = Division::new(4);
    pub const EIGHTH: Division = Division::new(8);
    pub const SIXTEENTH: Division = Division::new(16);
    pub const THIRTY_SECOND: Division = Division::new(32);

    pub const QUARTER_TRIPLET: Division = Division::new(6);
    pub const EIGHTH_TRIPLET: Division = Division::new(12);

    pub const DOTTED_QUARTER: Division = Division::QUARTER.dotted();
    pub const DOTTED_EIGHTH: Division = Division::EIGHTH.dotted();

    /// Zero and negative selectors select the default, one pulse per step.
    pub const fn new(selector: i32) -> Self {
        let selector = if selector <= 0 { 16 } else { selector };
        Division {
            selector,
            dotted: false,
        }
    }

    /// Lengthen the step by half.
    pub const fn dotted(self) -> Self {
        Division {
            selector: self.selector,
            dotted: true,
        }
    }

    pub fn selector(&self) -> i32 {
        self.selector
    }

    pub fn is_dotted(&self) -> bool {
        self.dotted
    }

    pub fn pulses_per_step(&self) -> f64 {
        let base = TABLE
            .iter()
            .find(|(selector, _, _)| *selector == self.selector)
            .map(|&(_, num, den)| num as f64 / den as f64)
            .unwrap_or_else(|| 16.0 / self.selector as f64);

        if self.dotted {
            base * 1.5
        } else {
            base
        }
    }
}

impl Default for Division {
    fn default() -> Self {
        Division::SIXTEENTH
    }
}
