//! The `transparency validate` command.

use std::path::PathBuf;

use anyhow::Result;

use transparency_core::seed::{parse_seed, validate_seed};

pub fn execute(seed_path: PathBuf) -> Result<()> {
    let seed = parse_seed(&seed_path)?;

    println!(
        "Seed: {} ({} projects, {} members, {} scores)",
        seed_path.display(),
        seed.projects.len(),
        seed.member_count(),
        seed.score_count()
    );

    let warnings = validate_seed(&seed);
    for w in &warnings {
        let prefix = w
            .project
            .as_ref()
            .map(|name| format!("  [{name}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Seed data valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
