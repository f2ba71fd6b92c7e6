use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Bank-agnostic row produced by the normalizer, before it is stored.
/// `label`, `category` and `additional_labels` are always `None` here;
/// only a user ever sets them, after the row is stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRow {
    pub id: String,
    pub date: NaiveDate,
    pub concept: String,
    pub account: String,
    pub amount: Decimal,
    pub label: Option<String>,
    pub category: Option<String>,
    pub additional_labels: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub format_key: String,
    pub institution: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredTransaction {
    pub id: String,
    pub account_id: i64,
    pub account_name: String,
    pub date: NaiveDate,
    pub concept: String,
    pub amount: Decimal,
    pub label: Option<String>,
    pub category: Option<String>,
    pub additional_labels: Option<String>,
    pub imported_at: String,
}

/// Counts from one reconcile call. `total == inserted + skipped` always.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileResult {
    pub inserted: usize,
    pub skipped: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub filename: String,
    pub account: String,
    pub format_key: String,
    pub result: ReconcileResult,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

/// Per-file outcome of a directory import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileImportResult {
    pub filename: String,
    pub inserted: usize,
    pub skipped: usize,
    pub total: usize,
    pub error: Option<String>,
}

impl FileImportResult {
    pub fn failed(filename: impl Into<String>, error: impl ToString) -> Self {
        Self {
            filename: filename.into(),
            inserted: 0,
            skipped: 0,
            total: 0,
            error: Some(error.to_string()),
        }
    }
}

impl From<&ImportSummary> for FileImportResult {
    fn from(summary: &ImportSummary) -> Self {
        Self {
            filename: summary.filename.clone(),
            inserted: summary.result.inserted,
            skipped: summary.result.skipped,
            total: summary.result.total,
            error: None,
        }
    }
}
