//! CLI command for listing decoded banks

use std::path::Path;

use crate::banks::scan_banks;

/// List banks and how many sounds each references
pub fn execute(banks_dir: &Path, show_ids: bool) -> anyhow::Result<()> {
    let scan = scan_banks(banks_dir)?;

    if scan.banks.is_empty() {
        println!("No bank descriptors found in: {}", banks_dir.display());
    } else {
        println!(
            "Found {} banks referencing {} sounds:",
            scan.banks.len(),
            scan.total_entries()
        );
        for bank in &scan.banks {
            println!("  {:>6}  {}", bank.len(), bank.name);
            if show_ids {
                for entry in bank.entries() {
                    match &entry.source_path {
                        Some(source) => println!("          {}  {source}", entry.id),
                        None => println!("          {}", entry.id),
                    }
                }
            }
        }
    }

    if !scan.unreadable.is_empty() {
        println!();
        println!("Unreadable descriptors:");
        for (path, reason) in &scan.unreadable {
            println!("  {}: {reason}", path.display());
        }
    }

    Ok(())
}
