use std::path::Path;

use comfy_table::{Cell, CellAlignment, Table};

use crate::error::Result;
use crate::fmt::money;
use crate::registry::FormatRegistry;

pub fn run(registry: &FormatRegistry, file: &str, format: &str, json: bool) -> Result<()> {
    let rows = registry.get(format)?.normalize_file(Path::new(file))?;

    if json {
        let out = serde_json::to_string_pretty(&rows)?;
        println!("{out}");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Concept", "Amount"]);
    for row in &rows {
        table.add_row(vec![
            Cell::new(&row.id),
            Cell::new(row.date),
            Cell::new(&row.concept),
            Cell::new(money(row.amount)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");
    println!("{} rows", rows.len());
    Ok(())
}
