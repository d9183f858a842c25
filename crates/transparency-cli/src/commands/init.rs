//! The `transparency init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("transparency.toml").exists() {
        println!("transparency.toml already exists, skipping.");
    } else {
        std::fs::write("transparency.toml", SAMPLE_CONFIG)?;
        println!("Created transparency.toml");
    }

    std::fs::create_dir_all("seeds")?;
    let example_path = std::path::Path::new("seeds/example.toml");
    if example_path.exists() {
        println!("seeds/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_SEED)?;
        println!("Created seeds/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: transparency validate --seed seeds/example.toml");
    println!("  2. Run: transparency seed --file seeds/example.toml");
    println!("  3. Run: transparency dashboard --project 1");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# transparency configuration

# JSON file holding projects, members and scores.
# Relative paths are resolved against this file's directory.
data_file = "transparency-data.json"

# Log level for transparency output on stderr (overridden by RUST_LOG).
log_level = "warn"

# Default output format: text, json, markdown
default_format = "text"
"#;

const EXAMPLE_SEED: &str = r#"# Example seed data.
# Each score is dated `days_ago` days before the time the seed is applied.

[[projects]]
name = "Website Redesign"
document_url = "https://docs.example.com/website-redesign"

[[projects.members]]
name = "Alice"
role = "PL"
email = "alice@example.com"
scores = [
    { value = 80, comment = "Kickoff went well", days_ago = 14 },
    { value = 72, comment = "Scope creep on checkout", days_ago = 7 },
    { value = 85, days_ago = 0 },
]

[[projects.members]]
name = "Bob"
role = "PM"
scores = [
    { value = 70, days_ago = 14 },
    { value = 75, days_ago = 0 },
]

[[projects.members]]
name = "Carol"
role = "Member"
scores = [
    { value = 90, comment = "Design system ready", days_ago = 7 },
]
"#;
