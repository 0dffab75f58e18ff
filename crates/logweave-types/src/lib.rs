//! Foundation types for logweave.
//!
//! The merge engine works in terms of three small pieces defined here:
//!
//! - [`TimestampFormat`] / [`FormatCatalog`] -- the fixed-width timestamp
//!   encodings a log source may use, and their compiled patterns
//! - [`Record`] -- one timestamped unit of log text
//! - [`component_id`] -- the short label derived from a log file's name

pub mod component;
pub mod error;
pub mod format;
pub mod record;

pub use component::component_id;
pub use error::{FormatError, FormatResult};
pub use format::{FormatCatalog, TimestampFormat};
pub use record::Record;
