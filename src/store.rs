use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

use rusqlite::types::Value;
use rusqlite::{Connection, ErrorCode};
use tracing::warn;

use crate::error::{Result, TallyError};
use crate::models::CanonicalRow;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// What reconciliation needs from persistent storage.
pub trait TransactionStore {
    /// Which of `ids` are already stored. One round trip.
    fn existing_ids(&self, ids: &[&str]) -> Result<HashSet<String>>;

    /// Insert rows for `account_id` with classification fields left null.
    /// Rows whose id is already present are ignored, not an error.
    /// All-or-nothing; returns the number of rows actually written.
    fn insert_new(&self, account_id: i64, rows: &[&CanonicalRow]) -> Result<usize>;
}

pub struct SqliteStore<'c> {
    conn: &'c Connection,
    max_retries: u32,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn with_retry<T>(&self, op: &str, mut f: impl FnMut() -> rusqlite::Result<T>) -> Result<T> {
        let mut attempt = 0;
        loop {
            match f() {
                Ok(value) => return Ok(value),
                Err(e) if is_transient(&e) && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(op, attempt, error = %e, "storage busy, retrying");
                    std::thread::sleep(Duration::from_millis(50 * u64::from(attempt)));
                }
                Err(e) => return Err(TallyError::StorageUnavailable(format!("{op}: {e}"))),
            }
        }
    }
}

fn is_transient(e: &rusqlite::Error) -> bool {
    matches!(
        e.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked)
    )
}

impl TransactionStore for SqliteStore<'_> {
    fn existing_ids(&self, ids: &[&str]) -> Result<HashSet<String>> {
        let values: Rc<Vec<Value>> = Rc::new(ids.iter().map(|id| Value::from(id.to_string())).collect());
        self.with_retry("existing_ids", || {
            let mut stmt = self
                .conn
                .prepare_cached("SELECT id FROM transactions WHERE id IN rarray(?1)")?;
            let found = stmt
                .query_map([Rc::clone(&values)], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<HashSet<_>>>()?;
            Ok(found)
        })
    }

    fn insert_new(&self, account_id: i64, rows: &[&CanonicalRow]) -> Result<usize> {
        self.with_retry("insert_new", || {
            let tx = self.conn.unchecked_transaction()?;
            let mut written = 0;
            {
                let mut stmt = tx.prepare_cached(
                    "INSERT OR IGNORE INTO transactions \
                     (id, account_id, date, concept, amount, label, category, additional_labels) \
                     VALUES (?1, ?2, ?3, ?4, ?5, NULL, NULL, NULL)",
                )?;
                for row in rows {
                    written += stmt.execute(rusqlite::params![
                        row.id,
                        account_id,
                        row.date,
                        row.concept,
                        row.amount.to_string(),
                    ])?;
                }
            }
            tx.commit()?;
            Ok(written)
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::db::{add_account, get_connection, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn row(id: &str) -> CanonicalRow {
        CanonicalRow {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            concept: "TRADER JOES".to_string(),
            account: "SoFi Savings".to_string(),
            amount: dec!(-45.50),
            label: Some("ignored".to_string()),
            category: None,
            additional_labels: None,
        }
    }

    #[test]
    fn test_existing_ids_single_query() {
        let (_dir, conn) = test_db();
        let account = add_account(&conn, "Savings", "sofi-savings", None).unwrap();
        let store = SqliteStore::new(&conn);
        let (a, b) = (row("a"), row("b"));
        store.insert_new(account, &[&a, &b]).unwrap();
        let found = store.existing_ids(&["a", "c", "b"]).unwrap();
        assert_eq!(found, HashSet::from(["a".to_string(), "b".to_string()]));
        assert!(store.existing_ids(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_insert_ignores_conflicts() {
        let (_dir, conn) = test_db();
        let account = add_account(&conn, "Savings", "sofi-savings", None).unwrap();
        let store = SqliteStore::new(&conn);
        let a = row("a");
        assert_eq!(store.insert_new(account, &[&a]).unwrap(), 1);
        assert_eq!(store.insert_new(account, &[&a, &a]).unwrap(), 0);
        let count: i64 = conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_insert_forces_null_classification() {
        let (_dir, conn) = test_db();
        let account = add_account(&conn, "Savings", "sofi-savings", None).unwrap();
        SqliteStore::new(&conn).insert_new(account, &[&row("a")]).unwrap();
        let (label, amount): (Option<String>, String) = conn
            .query_row("SELECT label, amount FROM transactions WHERE id = 'a'", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(label, None);
        assert_eq!(amount, "-45.50");
    }

    #[test]
    fn test_failed_insert_is_atomic() {
        let (_dir, conn) = test_db();
        let store = SqliteStore::new(&conn).with_max_retries(0);
        // no such account: the foreign key fails the batch
        let err = store.insert_new(999, &[&row("a"), &row("b")]).unwrap_err();
        assert!(matches!(err, TallyError::StorageUnavailable(_)));
        let count: i64 = conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_busy_database_is_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let conn = get_connection(&path).unwrap();
        init_db(&conn).unwrap();
        let account = add_account(&conn, "Savings", "sofi-savings", None).unwrap();

        let locker = get_connection(&path).unwrap();
        locker.execute_batch("BEGIN EXCLUSIVE").unwrap();
        conn.busy_timeout(Duration::from_millis(1)).unwrap();

        let store = SqliteStore::new(&conn).with_max_retries(1);
        let err = store.insert_new(account, &[&row("a")]).unwrap_err();
        assert!(matches!(err, TallyError::StorageUnavailable(_)));

        locker.execute_batch("ROLLBACK").unwrap();
        assert_eq!(store.insert_new(account, &[&row("a")]).unwrap(), 1);
    }
}
