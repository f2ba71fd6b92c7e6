use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::db::{accounts_for_format, find_account, record_import, ImportRecord};
use crate::detect::detect;
use crate::error::{Result, TallyError};
use crate::models::{Account, FileImportResult, ImportSummary};
use crate::normalizer::read_source;
use crate::reconcile::reconcile;
use crate::registry::FormatRegistry;
use crate::store::{SqliteStore, DEFAULT_MAX_RETRIES};

pub struct Importer<'a> {
    conn: &'a Connection,
    registry: &'a FormatRegistry,
    max_retries: u32,
}

impl<'a> Importer<'a> {
    pub fn new(conn: &'a Connection, registry: &'a FormatRegistry) -> Self {
        Self {
            conn,
            registry,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Import one file into the named account. The account's format key,
    /// not the filename, decides how the file is parsed. Failures carry
    /// the filename.
    pub fn import_file(&self, file_path: &Path, account_name: &str) -> Result<ImportSummary> {
        let filename = display_name(file_path);
        self.import_inner(file_path, &filename, account_name)
            .map_err(|e| TallyError::import_failed(filename, e))
    }

    fn import_inner(&self, file_path: &Path, filename: &str, account_name: &str) -> Result<ImportSummary> {
        let account = find_account(self.conn, account_name)?;
        let normalizer = self.registry.get(&account.format_key)?;

        let raw = read_source(file_path)?;
        let rows = normalizer.normalize(&raw)?;

        let store = SqliteStore::new(self.conn).with_max_retries(self.max_retries);
        let result = reconcile(&store, &rows, account.id)?;

        let date_range = rows
            .iter()
            .map(|r| r.date)
            .min()
            .zip(rows.iter().map(|r| r.date).max());
        let checksum = hex::encode(Sha256::digest(&raw));
        let history = ImportRecord {
            filename,
            account_id: account.id,
            checksum: &checksum,
            inserted: result.inserted,
            skipped: result.skipped,
            total: result.total,
            date_range,
        };
        // rows are already committed; losing the history entry is not fatal
        if let Err(e) = record_import(self.conn, &history) {
            warn!(filename, error = %e, "could not record import history");
        }

        info!(
            filename,
            account = %account.name,
            format = %account.format_key,
            inserted = result.inserted,
            skipped = result.skipped,
            "import complete"
        );
        Ok(ImportSummary {
            filename: filename.to_string(),
            account: account.name,
            format_key: account.format_key,
            result,
            date_range,
        })
    }

    /// Pick the target account for a file: the explicit override, or the
    /// single account bound to the format the filename suggests.
    pub fn resolve_account(&self, filename: &str, account_override: Option<&str>) -> Result<Account> {
        if let Some(name) = account_override {
            return find_account(self.conn, name);
        }
        let key = detect(filename).ok_or_else(|| {
            TallyError::Other(format!("cannot detect a format from {filename:?}; pass --account"))
        })?;
        let mut candidates = accounts_for_format(self.conn, key)?;
        match candidates.len() {
            1 => Ok(candidates.remove(0)),
            0 => Err(TallyError::Other(format!(
                "no account uses format {key} (detected from {filename:?})"
            ))),
            _ => Err(TallyError::Other(format!(
                "several accounts use format {key}; pass --account"
            ))),
        }
    }

    /// Import every CSV in `dir`, in filename order. One file failing does
    /// not stop the others.
    pub fn import_dir(&self, dir: &Path, account_override: Option<&str>) -> Result<Vec<FileImportResult>> {
        let entries = std::fs::read_dir(dir).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TallyError::NotFound {
                path: dir.to_path_buf(),
            },
            _ => TallyError::Io(e),
        })?;
        let mut paths = entries
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        paths.retain(|p| p.is_file());
        paths.sort();

        let mut results = Vec::new();
        for path in paths {
            let filename = display_name(&path);
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if !is_csv {
                warn!(filename = %filename, "skipping non-CSV file");
                results.push(FileImportResult::failed(filename, "unsupported file type, expected .csv"));
                continue;
            }
            let outcome = self
                .resolve_account(&filename, account_override)
                .and_then(|account| self.import_file(&path, &account.name));
            match outcome {
                Ok(summary) => results.push(FileImportResult::from(&summary)),
                Err(e) => {
                    warn!(filename = %filename, error = %e, "import failed");
                    results.push(FileImportResult::failed(filename, e));
                }
            }
        }
        Ok(results)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
