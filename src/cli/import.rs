use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Color, Table};

use crate::cli::open_db;
use crate::error::{Result, TallyError};
use crate::importer::Importer;
use crate::registry::FormatRegistry;
use crate::settings::load_settings;

pub fn run(registry: &FormatRegistry, path: &str, account: Option<&str>) -> Result<()> {
    let path = PathBuf::from(path);
    let conn = open_db()?;
    let importer = Importer::new(&conn, registry).with_max_retries(load_settings().max_storage_retries);

    if path.is_dir() {
        return run_dir(&importer, &path, account);
    }

    let account = account.ok_or_else(|| {
        TallyError::Other("--account is required when importing a single file".to_string())
    })?;
    let summary = importer.import_file(&path, account)?;
    let result = summary.result;
    println!(
        "{} imported, {} skipped (already stored), {} rows in file",
        result.inserted.to_string().green(),
        result.skipped,
        result.total
    );
    if let Some((start, end)) = summary.date_range {
        println!("{} {start} to {end} into {}", summary.format_key, summary.account);
    }
    Ok(())
}

fn run_dir(importer: &Importer<'_>, dir: &std::path::Path, account: Option<&str>) -> Result<()> {
    let results = importer.import_dir(dir, account)?;
    if results.is_empty() {
        println!("No files found in {}", dir.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["File", "Imported", "Skipped", "Total", "Status"]);
    let mut failed = 0;
    for r in &results {
        let status = match &r.error {
            Some(e) => {
                failed += 1;
                Cell::new(e).fg(Color::Red)
            }
            None => Cell::new("ok").fg(Color::Green),
        };
        table.add_row(vec![
            Cell::new(&r.filename),
            Cell::new(r.inserted),
            Cell::new(r.skipped),
            Cell::new(r.total),
            status,
        ]);
    }
    println!("{table}");

    let inserted: usize = results.iter().map(|r| r.inserted).sum();
    println!("{inserted} imported from {} file(s), {failed} failed", results.len() - failed);
    Ok(())
}
