use crate::db::{count, get_connection};
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::registry::FormatRegistry;
use crate::settings::load_settings;

pub fn run(registry: &FormatRegistry) -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();

    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());
    println!("Formats:    {}", registry.len());

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = get_connection(&db_path)?;
        let accounts = count(&conn, "SELECT count(*) FROM accounts")?;
        let transactions = count(&conn, "SELECT count(*) FROM transactions")?;
        let unlabeled = count(&conn, "SELECT count(*) FROM transactions WHERE label IS NULL")?;
        let imports = count(&conn, "SELECT count(*) FROM imports")?;

        println!();
        println!("Accounts:      {accounts}");
        println!("Transactions:  {transactions}");
        println!("Unlabeled:     {unlabeled}");
        println!("Imports:       {imports}");
    } else {
        println!();
        println!("Database not found. Run `tally init` to set up.");
    }

    Ok(())
}
