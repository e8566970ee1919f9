//! ID prefixes for store-assigned identifiers.
//!
//! Store IDs look like `his-a3f8b2c1`: a three-letter prefix, a dash, and
//! eight lowercase hex characters generated by the store.

pub const PREFIX_HISTORY: &str = "his";
pub const PREFIX_PROSPECT_RESULT: &str = "prs";
pub const PREFIX_VERIFICATION_RESULT: &str = "ver";
pub const PREFIX_LINKEDIN_RESULT: &str = "lnk";
pub const PREFIX_SYNC_RESULT: &str = "syn";

pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_HISTORY,
    PREFIX_PROSPECT_RESULT,
    PREFIX_VERIFICATION_RESULT,
    PREFIX_LINKEDIN_RESULT,
    PREFIX_SYNC_RESULT,
];

/// Whether `id` has the shape of a store-assigned history ID.
///
/// Client-generated IDs (`bulk-…`, `single-…`) are never store IDs.
#[must_use]
pub fn is_stored_history_id(id: &str) -> bool {
    id.strip_prefix(PREFIX_HISTORY)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|hex| hex.len() == 8 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
