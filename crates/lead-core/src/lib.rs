//! # lead-core
//!
//! Core types shared across the lead console crates:
//! - Feature modes, input kinds, and per-mode row status labels
//! - Row, per-mode result union, and cache provenance
//! - History entries and their stored snapshot forms
//! - Column mapping from spreadsheet headers to lookup fields
//! - ID prefixes for store-assigned identifiers
//! - Display masking for history listings
//! - Cross-cutting error types

pub mod display;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod ids;
