//! # lead-engine
//!
//! The lead console's pipeline: import rows from a spreadsheet, resolve each
//! one (cache check, then a remote lookup), record the run in history, and
//! render, export or sync the results.
//!
//! Everything is sequential. A batch resolves rows in order with a fixed
//! pause after each lookup, and history bookkeeping never fails a run that
//! already produced results.

pub mod error;
pub mod export;
pub mod history;
pub mod ids;
pub mod legacy;
pub mod processor;
pub mod sheet;
pub mod stats;
pub mod sync;

mod test_support;

pub use error::EngineError;
pub use export::{ExportFormat, ExportTable};
pub use history::{Finalized, HistoryBook, SessionView, SignedIn};
pub use processor::{BatchObserver, BatchSummary, Processor, Resolution, SingleInput, SingleOutcome};
pub use sheet::{Handoff, Sheet};
pub use stats::StatusCount;
pub use sync::SyncReport;
