use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::registry::FormatRegistry;

pub fn run(registry: &FormatRegistry) -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Key", "Name", "Date Format", "Amount", "Header"]);
    for normalizer in registry.iter() {
        let d = normalizer.descriptor();
        let amount = if d.negate_amount {
            format!("{} (negated)", d.amount_derivation.tag())
        } else {
            d.amount_derivation.tag().to_string()
        };
        table.add_row(vec![
            Cell::new(normalizer.key()),
            Cell::new(d.display_name),
            Cell::new(d.date_format),
            Cell::new(amount),
            Cell::new(if d.headerless_columns.is_some() { "none" } else { "first row" }),
        ]);
    }
    println!("Formats\n{table}");
    Ok(())
}
