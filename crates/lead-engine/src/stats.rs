//! Status breakdown of a session's rows.

use serde::Serialize;

use lead_core::entities::Row;
use lead_core::enums::{Mode, RowStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub label: &'static str,
    pub count: usize,
}

const VERIFY_LABELS: [(RowStatus, &str); 7] = [
    (RowStatus::Deliverable, "Valid"),
    (RowStatus::Undeliverable, "Invalid"),
    (RowStatus::Risky, "Risky"),
    (RowStatus::Unknown, "Unknown"),
    (RowStatus::Failed, "Failed"),
    (RowStatus::Pending, "Pending"),
    (RowStatus::Processing, "Processing"),
];

/// Count rows per display bucket; empty buckets are left out.
///
/// Enrich and LinkedIn fold in-flight labels into "Pending"; verify keeps
/// one bucket per status.
#[must_use]
pub fn breakdown(mode: Mode, rows: &[Row]) -> Vec<StatusCount> {
    let count = |pred: &dyn Fn(RowStatus) -> bool| rows.iter().filter(|r| pred(r.status)).count();

    let buckets: Vec<StatusCount> = match mode {
        Mode::Verify => VERIFY_LABELS
            .iter()
            .map(|(status, label)| StatusCount {
                label,
                count: count(&|s| s == *status),
            })
            .collect(),
        Mode::Enrich | Mode::Linkedin => {
            let found = if mode == Mode::Enrich { "Email Found" } else { "Found" };
            vec![
                StatusCount {
                    label: found,
                    count: count(&|s| matches!(s, RowStatus::Completed | RowStatus::Found)),
                },
                StatusCount {
                    label: "Not Found",
                    count: count(&|s| s == RowStatus::NotFound),
                },
                StatusCount {
                    label: "Failed",
                    count: count(&|s| s == RowStatus::Failed),
                },
                StatusCount {
                    label: "Pending",
                    count: count(&RowStatus::is_unresolved),
                },
            ]
        }
    };
    buckets.into_iter().filter(|b| b.count > 0).collect()
}
