use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::db::{add_account, list_accounts};
use crate::error::Result;
use crate::registry::FormatRegistry;

pub fn add(registry: &FormatRegistry, name: &str, format: &str, institution: Option<&str>) -> Result<()> {
    // reject keys this build cannot parse before they are persisted
    let normalizer = registry.get(format)?;
    let conn = open_db()?;
    add_account(&conn, name, normalizer.key(), institution)?;
    println!("Added account: {name} ({})", normalizer.descriptor().display_name);
    Ok(())
}

pub fn list(registry: &FormatRegistry) -> Result<()> {
    let conn = open_db()?;
    let accounts = list_accounts(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Format", "Institution"]);
    for account in accounts {
        let format = if registry.contains(&account.format_key) {
            account.format_key
        } else {
            format!("{} (unknown)", account.format_key)
        };
        table.add_row(vec![
            Cell::new(account.id),
            Cell::new(account.name),
            Cell::new(format),
            Cell::new(account.institution.unwrap_or_default()),
        ]);
    }
    println!("Accounts\n{table}");
    Ok(())
}
