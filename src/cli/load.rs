use std::path::PathBuf;

use crate::db::{count, get_connection, init_db, DB_FILENAME};
use crate::error::{Result, TallyError};
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(path: &str) -> Result<()> {
    let data_dir = PathBuf::from(shellexpand_path(path));
    let db_path = data_dir.join(DB_FILENAME);
    if !db_path.is_file() {
        return Err(TallyError::Settings(format!(
            "No database found at {}\nRun `tally init --data-dir {}` to create one.",
            db_path.display(),
            data_dir.display()
        )));
    }

    // bring an older ledger up to the current schema before switching
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;
    let accounts = count(&conn, "SELECT count(*) FROM accounts")?;
    let transactions = count(&conn, "SELECT count(*) FROM transactions")?;

    let mut settings = load_settings();
    settings.data_dir = data_dir.to_string_lossy().to_string();
    save_settings(&settings)?;

    println!("Switched to {}", data_dir.display());
    println!("{accounts} accounts, {transactions} transactions");
    Ok(())
}
