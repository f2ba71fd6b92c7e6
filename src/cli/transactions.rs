use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Color, Table};
use rust_decimal::Decimal;

use crate::cli::open_db;
use crate::db::{query_transactions, set_classification, TransactionFilter};
use crate::error::{Result, TallyError};
use crate::fmt::money;

pub fn list(filter: TransactionFilter, json: bool) -> Result<()> {
    let conn = open_db()?;
    let rows = query_transactions(&conn, &filter)?;

    if json {
        let out = serde_json::to_string_pretty(&rows)?;
        println!("{out}");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Account", "Concept", "Amount", "Label", "Category"]);
    for t in &rows {
        let amount = Cell::new(money(t.amount)).set_alignment(CellAlignment::Right);
        let amount = if t.amount.is_sign_negative() { amount.fg(Color::Red) } else { amount };
        table.add_row(vec![
            Cell::new(&t.id),
            Cell::new(t.date),
            Cell::new(&t.account_name),
            Cell::new(&t.concept),
            amount,
            Cell::new(t.label.as_deref().unwrap_or("")),
            Cell::new(t.category.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");

    let net: Decimal = rows.iter().map(|t| t.amount).sum();
    println!("{} transactions, net {}", rows.len(), money(net));
    Ok(())
}

pub fn label(
    id: &str,
    label: Option<&str>,
    category: Option<&str>,
    additional_labels: Option<&str>,
) -> Result<()> {
    if label.is_none() && category.is_none() && additional_labels.is_none() {
        return Err(TallyError::Other(
            "nothing to change: pass --label, --category or --additional-labels".to_string(),
        ));
    }
    let conn = open_db()?;
    set_classification(&conn, id, label, category, additional_labels)?;
    println!("{} {id}", "Updated".green());
    Ok(())
}
