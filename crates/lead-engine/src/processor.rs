//! Row resolution: missing-data check, cache lookup, remote call, status.
//!
//! Batches run strictly in order with a fixed pause after each resolved row.
//! Nothing here fails a whole run: remote problems land on the row as a
//! `failed` status with the service's message, and cache read errors count
//! as misses.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use lead_core::entities::{
    ColumnMapping, EnrichResult, LinkedinResult, ModeResult, Record, Row, RowUpdate, VerifyResult,
};
use lead_core::enums::{Mode, RowStatus};
use lead_db::{CacheKey, LeadStore};
use lead_remote::{Lookup, ProspectServices};

use crate::error::EngineError;
use crate::ids;

pub const MISSING_DATA: &str = "Missing data";
pub const NO_EMAIL_FOUND: &str = lead_remote::prospect::NO_EMAIL_FOUND;
pub const RETRY_FAILED: &str = "Retry failed";
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred.";
pub const ALREADY_PROCESSED: &str = "Already Processed";
pub const NAME_AND_COMPANY_REQUIRED: &str = "Name and Company/Domain are required.";
pub const EMAIL_REQUIRED: &str = "Email is required.";

const DEFAULT_ROW_DELAY: Duration = Duration::from_millis(300);

/// How a row got its final status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Failed the missing-data check; no lookup and no pause.
    Skipped,
    Cached,
    Remote,
}

/// Receives per-row progress from a batch.
pub trait BatchObserver {
    /// The row has been marked in progress.
    fn on_start(&mut self, _index: usize, _row: &Row) {}

    /// The row has its final status.
    fn on_update(&mut self, _index: usize, _row: &Row, _resolution: Resolution) {}
}

impl BatchObserver for () {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub cached: usize,
    pub skipped: usize,
}

/// Form fields of a single lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleInput {
    pub name: String,
    pub company: String,
    pub email: String,
}

impl SingleInput {
    #[must_use]
    pub fn person(name: &str, company: &str) -> Self {
        Self {
            name: name.trim().to_owned(),
            company: company.trim().to_owned(),
            email: String::new(),
        }
    }

    #[must_use]
    pub fn email(email: &str) -> Self {
        Self {
            email: email.trim().to_owned(),
            ..Self::default()
        }
    }

    /// Restore the form from a history label (`Name @ Company`, or the email
    /// for verify).
    #[must_use]
    pub fn from_label(mode: Mode, label: &str) -> Self {
        if mode == Mode::Verify {
            return Self::email(label);
        }
        match lead_core::display::split_single_label(label) {
            Some((name, company)) => Self::person(name, company),
            None => Self::person(label, ""),
        }
    }

    /// # Errors
    ///
    /// Returns `EngineError::Validation` when a required field is blank.
    pub fn validate(&self, mode: Mode) -> Result<(), EngineError> {
        if mode == Mode::Verify {
            if self.email.trim().is_empty() {
                return Err(EngineError::Validation(EMAIL_REQUIRED.into()));
            }
        } else if self.name.trim().is_empty() || self.company.trim().is_empty() {
            return Err(EngineError::Validation(NAME_AND_COMPANY_REQUIRED.into()));
        }
        Ok(())
    }

    /// History label: the email for verify, `Name @ Company` otherwise.
    #[must_use]
    pub fn label(&self, mode: Mode) -> String {
        if mode == Mode::Verify {
            self.email.trim().to_owned()
        } else {
            format!("{} @ {}", self.name.trim(), self.company.trim())
        }
    }

    fn to_row(&self, mode: Mode) -> Row {
        let email = (mode == Mode::Verify).then(|| self.email.trim().to_owned());
        Row::pending(
            ids::single_row_id(Utc::now()),
            self.name.trim(),
            self.company.trim(),
            email,
            Record::new(),
        )
    }
}

/// A resolved single lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleOutcome {
    pub row: Row,
    /// Shown next to the result: "Already Processed" for cache hits, the
    /// service message for misses and failures.
    pub message: Option<String>,
    pub cached: bool,
}

impl SingleOutcome {
    /// History summary: the found email or URL, else the status label.
    #[must_use]
    pub fn result_label(&self, mode: Mode) -> String {
        let found = match mode {
            Mode::Enrich => self.row.email(),
            Mode::Linkedin => self.row.linkedin_url.as_deref(),
            Mode::Verify => None,
        };
        found.map_or_else(|| self.row.status.as_str().to_owned(), str::to_owned)
    }
}

/// Fill name/company/email from the mapped columns and reset every row.
///
/// Enrich without a mapped email column drops any email the row carried;
/// verify and LinkedIn keep it.
pub fn prepare_rows(mode: Mode, rows: &mut [Row], mapping: &ColumnMapping) {
    for row in rows {
        let fields = mapping.apply(mode, &row.source);
        row.name = fields.name;
        row.company = fields.company;
        row.email = if mapping.email_header.is_some() {
            fields.email
        } else if mode == Mode::Enrich {
            None
        } else {
            row.email.take()
        };
        row.reset();
    }
}

pub struct Processor<'a> {
    services: &'a dyn ProspectServices,
    /// Present only for a signed-in user; enables the cache.
    store: Option<&'a LeadStore>,
    row_delay: Duration,
}

impl<'a> Processor<'a> {
    #[must_use]
    pub fn new(services: &'a dyn ProspectServices) -> Self {
        Self {
            services,
            store: None,
            row_delay: DEFAULT_ROW_DELAY,
        }
    }

    #[must_use]
    pub const fn with_store(mut self, store: Option<&'a LeadStore>) -> Self {
        self.store = store;
        self
    }

    #[must_use]
    pub const fn with_row_delay(mut self, delay: Duration) -> Self {
        self.row_delay = delay;
        self
    }

    /// Resolve one row in place.
    pub async fn process_row(&self, mode: Mode, row: &mut Row, use_cache: bool) -> Resolution {
        row.status = mode.in_progress();

        if mode != Mode::Verify
            && row.name.trim().is_empty()
            && row.company.trim().is_empty()
            && row.email().is_none()
        {
            commit(mode, row, RowUpdate::failed(MISSING_DATA), MISSING_DATA);
            return Resolution::Skipped;
        }

        if use_cache && let Some(update) = self.cached(mode, row).await {
            commit(mode, row, update, UNEXPECTED_ERROR);
            return Resolution::Cached;
        }

        let update = self.lookup(mode, row).await;
        commit(mode, row, update, UNEXPECTED_ERROR);
        Resolution::Remote
    }

    /// Run every row in order, pausing after each one that was looked up.
    pub async fn process_batch(
        &self,
        mode: Mode,
        rows: &mut [Row],
        observer: &mut dyn BatchObserver,
    ) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for (index, row) in rows.iter_mut().enumerate() {
            row.status = mode.in_progress();
            observer.on_start(index, row);

            let resolution = self.process_row(mode, row, true).await;
            observer.on_update(index, row, resolution);

            summary.processed += 1;
            match resolution {
                Resolution::Skipped => {
                    summary.skipped += 1;
                    continue;
                }
                Resolution::Cached => summary.cached += 1,
                Resolution::Remote => {}
            }
            self.pause().await;
        }
        tracing::debug!(%mode, ?summary, "batch finished");
        summary
    }

    /// Look up again every row whose status is retryable, skipping the cache.
    ///
    /// Returns how many rows were retried; other rows are left untouched.
    pub async fn retry_failed(
        &self,
        mode: Mode,
        rows: &mut [Row],
        observer: &mut dyn BatchObserver,
    ) -> usize {
        let targets: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.status.is_retryable())
            .map(|(index, _)| index)
            .collect();

        for &index in &targets {
            let row = &mut rows[index];
            row.reset();
            row.status = mode.in_progress();
            observer.on_start(index, row);

            let update = self.lookup(mode, row).await;
            commit(mode, row, update, RETRY_FAILED);
            observer.on_update(index, row, Resolution::Remote);
            self.pause().await;
        }
        targets.len()
    }

    /// Validate the form, then answer from the cache or the remote service.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` before any lookup when a required
    /// field is blank.
    pub async fn run_single(&self, mode: Mode, input: &SingleInput) -> Result<SingleOutcome, EngineError> {
        input.validate(mode)?;
        let mut row = input.to_row(mode);

        if let Some(update) = self.cached(mode, &row).await {
            commit(mode, &mut row, update, UNEXPECTED_ERROR);
            return Ok(SingleOutcome {
                row,
                message: Some(ALREADY_PROCESSED.into()),
                cached: true,
            });
        }

        let update = self.lookup(mode, &row).await;
        commit(mode, &mut row, update, UNEXPECTED_ERROR);
        let message = row.error.clone();
        Ok(SingleOutcome {
            row,
            message,
            cached: false,
        })
    }

    /// Like [`Processor::run_single`] but always calls the remote service.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` when a required field is blank.
    pub async fn retry_single(&self, mode: Mode, input: &SingleInput) -> Result<SingleOutcome, EngineError> {
        input.validate(mode)?;
        let mut row = input.to_row(mode);
        let update = self.lookup(mode, &row).await;
        commit(mode, &mut row, update, RETRY_FAILED);
        let message = row.error.clone();
        Ok(SingleOutcome {
            row,
            message,
            cached: false,
        })
    }

    async fn cached(&self, mode: Mode, row: &Row) -> Option<RowUpdate> {
        let store = self.store?;
        let key = CacheKey::for_row(mode, row)?;
        match store.find_cached(mode, &key).await {
            Ok(Some(hit)) => {
                tracing::debug!(%mode, ?key, status = %hit.status, "cache hit");
                let mut update = hit.to_update();
                update.status = mode.normalize(update.status);
                Some(update)
            }
            Ok(None) => {
                tracing::debug!(%mode, ?key, "cache miss");
                None
            }
            Err(error) => {
                tracing::warn!(%mode, %error, "cache lookup failed; calling the service");
                None
            }
        }
    }

    /// Ask the remote service about `row` and map the answer to a status.
    pub async fn lookup(&self, mode: Mode, row: &Row) -> RowUpdate {
        match mode {
            Mode::Enrich => match self.services.find_email(&row.name, &row.company).await {
                Lookup::Found(email) => RowUpdate::status(RowStatus::Completed)
                    .with_result(ModeResult::Enrich(EnrichResult { email: Some(email) })),
                Lookup::NotFound { message } => {
                    RowUpdate::status(RowStatus::NotFound).with_error(message)
                }
                Lookup::Failed { message } => RowUpdate::failed(message),
            },
            Mode::Linkedin => {
                match self.services.find_linkedin_url(&row.name, &row.company).await {
                    Lookup::Found(url) => RowUpdate::status(RowStatus::Found)
                        .with_result(ModeResult::Linkedin(LinkedinResult { url: Some(url) })),
                    Lookup::NotFound { message } => {
                        RowUpdate::status(RowStatus::NotFound).with_error(message)
                    }
                    Lookup::Failed { message } => RowUpdate::failed(message),
                }
            }
            Mode::Verify => {
                let Some(email) = row.email() else {
                    return RowUpdate::failed(NO_EMAIL_FOUND);
                };
                match self.services.verify_email(email).await {
                    Lookup::Found(verdict) => {
                        let status = RowStatus::parse_stored(&verdict.status)
                            .map_or(RowStatus::Unknown, |s| mode.normalize(s));
                        RowUpdate::status(status).with_result(ModeResult::Verify(VerifyResult {
                            verdict: Some(verdict.status),
                            raw: Some(verdict.raw),
                        }))
                    }
                    Lookup::NotFound { message } | Lookup::Failed { message } => {
                        RowUpdate::failed(message)
                    }
                }
            }
        }
    }

    async fn pause(&self) {
        if !self.row_delay.is_zero() {
            tokio::time::sleep(self.row_delay).await;
        }
    }
}

/// Apply `update`, falling back to `failed` if its status is foreign to the mode.
fn commit(mode: Mode, row: &mut Row, update: RowUpdate, fallback: &str) {
    if let Err(error) = update.apply(mode, row) {
        tracing::warn!(%error, row = %row.id, "discarding out-of-mode status");
        row.status = RowStatus::Failed;
        row.error = Some(fallback.to_owned());
        row.result = None;
        row.cache = None;
    }
}
