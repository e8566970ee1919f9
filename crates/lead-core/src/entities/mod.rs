//! Entity structs for the lead console domain.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` for JSON
//! roundtrip and schema validation.

mod history;
mod mapping;
mod result;
mod row;

pub use history::{HistoryBuckets, HistoryEntry, MinimalStub, Snapshot};
pub use mapping::{ColumnMapping, MappedFields};
pub use result::{CacheProvenance, EnrichResult, LinkedinResult, ModeResult, VerifyResult};
pub use row::{Record, Row, RowUpdate};
