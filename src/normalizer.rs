use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use md5::{Digest, Md5};
use tracing::{debug, warn};

use crate::amount::negate;
use crate::error::{Result, TallyError};
use crate::format::FormatDescriptor;
use crate::models::CanonicalRow;

/// A format descriptor bound to its stable key, ready to parse files.
#[derive(Debug, Clone)]
pub struct RowNormalizer {
    key: &'static str,
    descriptor: FormatDescriptor,
}

impl RowNormalizer {
    pub fn new(key: &'static str, descriptor: FormatDescriptor) -> Self {
        Self { key, descriptor }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn descriptor(&self) -> &FormatDescriptor {
        &self.descriptor
    }

    pub fn normalize(&self, raw: &[u8]) -> Result<Vec<CanonicalRow>> {
        normalize(raw, &self.descriptor)
    }

    pub fn normalize_file(&self, file_path: &Path) -> Result<Vec<CanonicalRow>> {
        self.normalize(&read_source(file_path)?)
    }
}

/// Read a statement file whole. A missing file is `NotFound`, not `Io`.
pub fn read_source(file_path: &Path) -> Result<Vec<u8>> {
    std::fs::read(file_path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TallyError::NotFound {
            path: file_path.to_path_buf(),
        },
        _ => TallyError::Io(e),
    })
}

/// Content-derived identifier: MD5 over every raw cell joined with `_`.
/// Columns later dropped (balances, reference numbers) still count, so
/// rows that only differ there get distinct ids.
pub fn row_id<'a>(cells: impl IntoIterator<Item = &'a str>) -> String {
    let joined = cells.into_iter().collect::<Vec<_>>().join("_");
    hex::encode(Md5::digest(joined.as_bytes()))
}

/// Parse raw CSV bytes into canonical rows. Any bad row fails the whole batch.
pub fn normalize(raw: &[u8], descriptor: &FormatDescriptor) -> Result<Vec<CanonicalRow>> {
    let (text, _, had_errors) = descriptor.encoding.decode(raw);
    // replacement characters would leak into the concept and the id
    if had_errors {
        let line = text
            .lines()
            .position(|l| l.contains('\u{FFFD}'))
            .map_or(0, |i| i as u64 + 1);
        warn!(format = descriptor.display_name, line, "input is not valid {}", descriptor.encoding.name());
        return Err(TallyError::ParseFailure {
            line,
            reason: format!("invalid {} byte sequence", descriptor.encoding.name()),
        });
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = rdr.records();

    let columns: Vec<String> = match descriptor.headerless_columns {
        Some(slots) => slots.iter().map(|s| s.name().to_string()).collect(),
        None => match records.next() {
            Some(header) => header.map_err(csv_failure)?.iter().map(str::to_string).collect(),
            None => return Err(TallyError::EmptyInput),
        },
    };

    let mut index: HashMap<&str, usize> = HashMap::new();
    for (i, name) in columns.iter().enumerate() {
        if !name.is_empty() {
            index.entry(name.as_str()).or_insert(i);
        }
    }
    for column in descriptor.required_columns() {
        if !index.contains_key(column) {
            return Err(TallyError::SchemaMismatch {
                column: column.to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    for result in records {
        let record = result.map_err(csv_failure)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.len() > columns.len() {
            return Err(TallyError::ParseFailure {
                line,
                reason: format!("expected {} fields, found {}", columns.len(), record.len()),
            });
        }

        let id = row_id((0..columns.len()).map(|i| record.get(i).unwrap_or("")));
        let cell = |name: &str| index.get(name).and_then(|&i| record.get(i)).unwrap_or("");

        let raw_date = cell(descriptor.date_column).trim();
        let date = NaiveDate::parse_from_str(raw_date, descriptor.date_format).map_err(|_| {
            TallyError::ParseFailure {
                line,
                reason: format!("invalid date {raw_date:?} for format {}", descriptor.date_format),
            }
        })?;

        let amount = descriptor
            .amount_derivation
            .derive(descriptor.amount_column, cell)
            .map_err(|reason| TallyError::ParseFailure { line, reason })?;
        let amount = if descriptor.negate_amount { negate(amount) } else { amount };

        rows.push(CanonicalRow {
            id,
            date,
            concept: cell(descriptor.concept_column).trim().to_string(),
            account: descriptor.display_name.to_string(),
            amount,
            label: None,
            category: None,
            additional_labels: None,
        });
    }

    if rows.is_empty() {
        return Err(TallyError::EmptyInput);
    }
    debug!(format = descriptor.display_name, rows = rows.len(), "normalized");
    Ok(rows)
}

fn csv_failure(e: csv::Error) -> TallyError {
    TallyError::ParseFailure {
        line: e.position().map(|p| p.line()).unwrap_or(0),
        reason: e.to_string(),
    }
}
