use std::collections::HashSet;

use tracing::{debug, info};

use crate::error::Result;
use crate::models::{CanonicalRow, ReconcileResult};
use crate::store::TransactionStore;

/// Merge a normalized batch into the store for `account_id`.
///
/// Rows whose id is already stored are skipped and never rewritten, so a
/// label or category set by the user survives any number of re-imports.
/// Only the rows the store actually writes count as inserted; an id that
/// shows up between the lookup and the insert (or twice in one batch)
/// counts as skipped.
pub fn reconcile<S>(store: &S, rows: &[CanonicalRow], account_id: i64) -> Result<ReconcileResult>
where
    S: TransactionStore + ?Sized,
{
    if rows.is_empty() {
        return Ok(ReconcileResult::default());
    }

    let mut seen = HashSet::new();
    let incoming: Vec<&str> = rows
        .iter()
        .map(|r| r.id.as_str())
        .filter(|id| seen.insert(*id))
        .collect();

    let existing = store.existing_ids(&incoming)?;
    let fresh: Vec<&CanonicalRow> = rows.iter().filter(|r| !existing.contains(&r.id)).collect();

    let inserted = if fresh.is_empty() {
        0
    } else {
        store.insert_new(account_id, &fresh)?
    };
    if inserted < fresh.len() {
        debug!(
            account_id,
            already_present = fresh.len() - inserted,
            "rows appeared before insert"
        );
    }

    let total = rows.len();
    let result = ReconcileResult {
        inserted,
        skipped: total - inserted,
        total,
    };
    info!(account_id, inserted, skipped = result.skipped, total, "reconcile complete");
    Ok(result)
}
