//! # Rusty Timesheet
//!
//! A small office utility around timesheet exports.
//!
//! ## Features
//!
//! - **Extra-hours filtering**: read a `.csv`, `.txt` (tab separated) or `.xlsx`
//!   timesheet, keep the five columns that matter and split the rows into
//!   extra-hours bands (02:00 to 02:59, 03:00 to 03:59, above 04:00)
//! - **Date-stamped export**: any band saved as `Tabela_Filtrada[_N]_DD-MM-YYYY.csv`
//! - **CSV concatenation**: several exports glued into one file, unreadable
//!   inputs reported and skipped
//! - **Attachment export**: CSV attachments copied out of the local Maildir inbox
//!
//! ## Pipeline
//!
//! ```text
//! bytes -> spreadsheet::parse -> Table -> timesheet::classify -> Classification
//!       -> Session::select -> export::export -> ExportArtifact
//! ```
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
mod helpers;
pub mod mailbox;
pub mod merge;
pub mod shell;
pub mod spreadsheet;
pub mod table;
pub mod timesheet;

pub use crate::config::Config;
pub use crate::error::TimesheetError;
pub use crate::export::ExportArtifact;
pub use crate::helpers::reader::Upload;
pub use crate::shell::Session;
pub use crate::spreadsheet::FileFormat;
pub use crate::table::Table;
pub use crate::timesheet::Band;
pub use crate::timesheet::Classification;
