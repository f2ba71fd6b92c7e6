use colored::Colorize;

use crate::detect::detect;
use crate::error::Result;
use crate::registry::FormatRegistry;

pub fn run(registry: &FormatRegistry, filename: &str) -> Result<()> {
    match detect(filename) {
        Some(key) => {
            let name = registry
                .get(key)
                .map(|n| n.descriptor().display_name)
                .unwrap_or("unknown");
            println!("{} ({name})", key.green());
        }
        None => println!("{}", "not detected".yellow()),
    }
    Ok(())
}
