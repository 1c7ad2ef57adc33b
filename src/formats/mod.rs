//! Localization table formats understood by stringsgen.

pub mod strings;

// Reexporting the formats for easier access
pub use strings::{Format as StringsFormat, Pair as StringsPair};
