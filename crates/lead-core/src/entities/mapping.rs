use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::row::Record;
use crate::enums::Mode;

/// Which source column supplies name, company, and email.
///
/// Serialized with camelCase keys so stored mappings stay readable by
/// earlier clients (`nameHeader`, `companyHeader`, `emailHeader`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_header: Option<String>,
}

/// Row fields extracted from a source record through a mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedFields {
    pub name: String,
    pub company: String,
    pub email: Option<String>,
}

impl ColumnMapping {
    #[must_use]
    pub fn new(
        name_header: Option<&str>,
        company_header: Option<&str>,
        email_header: Option<&str>,
    ) -> Self {
        let own = |h: Option<&str>| h.filter(|h| !h.is_empty()).map(str::to_owned);
        Self {
            name_header: own(name_header),
            company_header: own(company_header),
            email_header: own(email_header),
        }
    }

    /// Extract (name, company, email) from `record`.
    ///
    /// Unmapped or blank cells yield an empty name/company and no email.
    /// In verify mode a name column that is also the email column is ignored.
    #[must_use]
    pub fn apply(&self, mode: Mode, record: &Record) -> MappedFields {
        let cell = |header: &Option<String>| {
            header
                .as_deref()
                .and_then(|h| record.get(h))
                .unwrap_or_default()
                .to_owned()
        };
        let email = Some(cell(&self.email_header)).filter(|e| !e.is_empty());
        let (name, company) = if mode == Mode::Verify && self.name_header == self.email_header {
            (String::new(), cell(&self.company_header))
        } else {
            (cell(&self.name_header), cell(&self.company_header))
        };
        MappedFields {
            name,
            company,
            email,
        }
    }

    /// Mapping used when handing enrich results over to verification.
    #[must_use]
    pub fn handoff() -> Self {
        Self::new(Some("Found Name"), Some("Found Company"), Some("Found Email"))
    }
}
