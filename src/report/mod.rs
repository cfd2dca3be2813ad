//! Reporting: console table, CSV export, run metadata
//!
//! Everything here only reads summaries; nothing feeds back into the run.

mod export;
mod metadata;
mod table;

pub use export::{CsvExporter, CSV_HEADER};
pub use metadata::{RunMetadata, METADATA_FILE};
pub use table::render_table;
