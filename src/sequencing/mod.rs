pub mod division;
pub mod pattern;
pub mod tempo_map;
pub mod timeline;

pub use division::Division;
pub use pattern::{Pattern, PatternUpdate, Step, MAX_STEPS};
pub use tempo_map::{TempoEvent, TempoMap};
pub use timeline::{EventList, TimedEvent};
