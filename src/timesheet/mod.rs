//! # Extra-hours classification
//!
//! Projection of a timesheet onto its five columns and the split of the
//! projected rows into time bands.
pub mod band;
pub mod classifier;
pub mod projector;
pub mod time;

pub use band::Band;
pub use classifier::classify;
pub use classifier::Classification;
pub use projector::project;
pub use projector::Columns;
pub use projector::ProjectedRecord;
pub use projector::ProjectedTable;
pub use time::TimeOfDay;
