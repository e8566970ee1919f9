//! Repository modules, one per table group.

pub mod cache;
pub mod history;
pub mod profile;
pub mod results;
pub mod sync;
