mod catalog;
mod definition;

pub use catalog::{InMemoryCatalog, WorkoutCatalog};
pub use definition::{PaceClass, Segment, SegmentMetadata, WorkoutDefinition};
