//! Masking for history list views.
//!
//! Single-run inputs show only the person's name; emails keep their first
//! two characters and the domain.

use crate::entities::HistoryEntry;
use crate::enums::InputKind;

/// Label for an entry's input column.
#[must_use]
pub fn history_input(entry: &HistoryEntry) -> String {
    if entry.kind == InputKind::Bulk {
        return entry.input.clone();
    }
    if let Some((name, _)) = entry.input.split_once(" @ ") {
        return name.trim().to_owned();
    }
    mask_email(&entry.input, 3, "***").unwrap_or_else(|| entry.input.clone())
}

/// Label for an entry's result column.
#[must_use]
pub fn history_result(result: &str) -> String {
    mask_email(result, 2, "**").unwrap_or_else(|| result.to_owned())
}

/// Split `Name @ Company` back into its parts.
#[must_use]
pub fn split_single_label(label: &str) -> Option<(&str, &str)> {
    label
        .split_once(" @ ")
        .map(|(name, company)| (name.trim(), company.trim()))
}

fn mask_email(value: &str, min_local: usize, stars: &str) -> Option<String> {
    if value.contains(' ') {
        return None;
    }
    let (local, domain) = value.split_once('@')?;
    if local.chars().count() <= min_local {
        return None;
    }
    let head: String = local.chars().take(2).collect();
    Some(format!("{head}{stars}@{domain}"))
}
