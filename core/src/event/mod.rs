pub mod label;
pub mod record;

pub use label::ClassificationLabel;
pub use record::{ClassifiedEvent, EventRecord, Position};
