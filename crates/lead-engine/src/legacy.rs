//! Feature inference for history rows stored before entries carried a mode.

use serde_json::Value;

use lead_core::enums::{InputKind, Mode};

/// Guess the mode of an untagged history row.
///
/// Bulk rows are LinkedIn runs when their first stored row has a profile URL
/// and enrich runs otherwise. Single rows are verify runs when the input is
/// a bare address, LinkedIn runs when the result is a profile URL, and
/// enrich runs otherwise.
#[must_use]
pub fn classify(kind: InputKind, input: &str, result: &str, first_item: Option<&Value>) -> Mode {
    match kind {
        InputKind::Bulk => {
            let has_url = first_item.is_some_and(|item| {
                ["linkedinUrl", "linkedin_url"]
                    .iter()
                    .filter_map(|key| item.get(*key).and_then(Value::as_str))
                    .any(|url| !url.trim().is_empty())
            });
            if has_url { Mode::Linkedin } else { Mode::Enrich }
        }
        InputKind::Single => {
            if input.contains('@') && !input.contains(' ') {
                Mode::Verify
            } else if result.contains("linkedin.com") {
                Mode::Linkedin
            } else {
                Mode::Enrich
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("ada@analytical.io", "deliverable", Mode::Verify)]
    #[case("Ada @ Analytical", "https://www.linkedin.com/in/ada", Mode::Linkedin)]
    #[case("Ada @ Analytical", "ada@analytical.io", Mode::Enrich)]
    #[case("ada@analytical.io", "https://www.linkedin.com/in/ada", Mode::Verify)]
    fn single_rows(#[case] input: &str, #[case] result: &str, #[case] expected: Mode) {
        assert_eq!(classify(InputKind::Single, input, result, None), expected);
    }

    #[test]
    fn bulk_rows_follow_first_item() {
        let linkedin = json!({"name": "Ada", "linkedinUrl": "https://linkedin.com/in/ada"});
        let blank = json!({"name": "Ada", "linkedinUrl": ""});
        let stub = json!({"user_id": "u1", "hasCached": false});
        assert_eq!(
            classify(InputKind::Bulk, "leads.csv", "3 Records processed", Some(&linkedin)),
            Mode::Linkedin
        );
        assert_eq!(classify(InputKind::Bulk, "leads.csv", "", Some(&blank)), Mode::Enrich);
        assert_eq!(classify(InputKind::Bulk, "leads.csv", "", Some(&stub)), Mode::Enrich);
        assert_eq!(classify(InputKind::Bulk, "leads.csv", "", None), Mode::Enrich);
    }
}
