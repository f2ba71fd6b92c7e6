use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::error::{Result, TallyError};
use crate::models::{Account, StoredTransaction};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    format_key TEXT NOT NULL,
    institution TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS transactions (
    id TEXT PRIMARY KEY,
    account_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    concept TEXT NOT NULL,
    amount TEXT NOT NULL,
    label TEXT,
    category TEXT,
    additional_labels TEXT,
    imported_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (account_id) REFERENCES accounts(id)
);

CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
CREATE INDEX IF NOT EXISTS idx_transactions_label ON transactions(label);
CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    account_id INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    inserted INTEGER NOT NULL,
    skipped INTEGER NOT NULL,
    total INTEGER NOT NULL,
    date_range_start TEXT,
    date_range_end TEXT,
    imported_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (account_id) REFERENCES accounts(id)
);
";

pub const DB_FILENAME: &str = "tally.db";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    // rarray() for single-query id membership checks
    rusqlite::vtab::array::load_module(&conn)?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

fn account_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        format_key: row.get(2)?,
        institution: row.get(3)?,
    })
}

pub fn add_account(
    conn: &Connection,
    name: &str,
    format_key: &str,
    institution: Option<&str>,
) -> Result<i64> {
    if find_account(conn, name).is_ok() {
        return Err(TallyError::DuplicateAccount(name.to_string()));
    }
    conn.execute(
        "INSERT INTO accounts (name, format_key, institution) VALUES (?1, ?2, ?3)",
        rusqlite::params![name, format_key, institution],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_account(conn: &Connection, name: &str) -> Result<Account> {
    conn.query_row(
        "SELECT id, name, format_key, institution FROM accounts WHERE name = ?1",
        [name],
        account_from_row,
    )
    .optional()?
    .ok_or_else(|| TallyError::UnknownAccount(name.to_string()))
}

pub fn list_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare("SELECT id, name, format_key, institution FROM accounts ORDER BY name")?;
    let accounts = stmt
        .query_map([], account_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(accounts)
}

pub fn accounts_for_format(conn: &Connection, format_key: &str) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, format_key, institution FROM accounts WHERE format_key = ?1 ORDER BY name",
    )?;
    let accounts = stmt
        .query_map([format_key], account_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(accounts)
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct TransactionFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub account: Option<String>,
}

pub fn query_transactions(conn: &Connection, filter: &TransactionFilter) -> Result<Vec<StoredTransaction>> {
    let mut sql = String::from(
        "SELECT t.id, t.account_id, a.name, t.date, t.concept, t.amount, t.label, t.category, \
         t.additional_labels, t.imported_at \
         FROM transactions t JOIN accounts a ON a.id = t.account_id WHERE 1=1",
    );
    let mut params: Vec<String> = Vec::new();
    if let Some(year) = filter.year {
        params.push(format!("{year:04}"));
        sql.push_str(&format!(" AND strftime('%Y', t.date) = ?{}", params.len()));
    }
    if let Some(month) = filter.month {
        params.push(format!("{month:02}"));
        sql.push_str(&format!(" AND strftime('%m', t.date) = ?{}", params.len()));
    }
    if let Some(account) = &filter.account {
        params.push(account.clone());
        sql.push_str(&format!(" AND a.name = ?{}", params.len()));
    }
    sql.push_str(" ORDER BY t.date ASC, a.name ASC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            let amount: String = row.get(5)?;
            Ok(StoredTransaction {
                id: row.get(0)?,
                account_id: row.get(1)?,
                account_name: row.get(2)?,
                date: row.get(3)?,
                concept: row.get(4)?,
                amount: amount.parse::<Decimal>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
                })?,
                label: row.get(6)?,
                category: row.get(7)?,
                additional_labels: row.get(8)?,
                imported_at: row.get(9)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// The user's manual classification. `Some("")` clears a field, `None`
/// leaves it alone. Date, concept and amount are never touched.
pub fn set_classification(
    conn: &Connection,
    id: &str,
    label: Option<&str>,
    category: Option<&str>,
    additional_labels: Option<&str>,
) -> Result<()> {
    let exists: bool = conn
        .prepare("SELECT 1 FROM transactions WHERE id = ?1")?
        .exists([id])?;
    if !exists {
        return Err(TallyError::UnknownTransaction(id.to_string()));
    }
    for (column, value) in [
        ("label", label),
        ("category", category),
        ("additional_labels", additional_labels),
    ] {
        if let Some(value) = value {
            let value = if value.is_empty() { None } else { Some(value) };
            conn.execute(
                &format!("UPDATE transactions SET {column} = ?1 WHERE id = ?2"),
                rusqlite::params![value, id],
            )?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Import history
// ---------------------------------------------------------------------------

pub struct ImportRecord<'a> {
    pub filename: &'a str,
    pub account_id: i64,
    pub checksum: &'a str,
    pub inserted: usize,
    pub skipped: usize,
    pub total: usize,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

pub fn record_import(conn: &Connection, record: &ImportRecord<'_>) -> Result<()> {
    conn.execute(
        "INSERT INTO imports (filename, account_id, checksum, inserted, skipped, total, date_range_start, date_range_end) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            record.filename,
            record.account_id,
            record.checksum,
            record.inserted as i64,
            record.skipped as i64,
            record.total as i64,
            record.date_range.map(|(start, _)| start),
            record.date_range.map(|(_, end)| end),
        ],
    )?;
    Ok(())
}

pub fn count(conn: &Connection, sql: &str) -> Result<i64> {
    Ok(conn.query_row(sql, [], |r| r.get(0))?)
}
