//! The `transparency seed` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;

use transparency_core::seed::{demo_seed, parse_seed, validate_seed};
use transparency_store::{apply_seed, ManualClock, SeedOutcome, TransparencyConfig};

use super::open_service_with_clock;

pub async fn execute(config: &TransparencyConfig, file: Option<PathBuf>) -> Result<()> {
    let seed = match &file {
        Some(path) => parse_seed(path)?,
        None => demo_seed()?,
    };
    for w in validate_seed(&seed) {
        tracing::warn!(project = ?w.project, "{}", w.message);
    }

    let now = Utc::now();
    let clock = Arc::new(ManualClock::new(now));
    let service = open_service_with_clock(config, clock.clone()).await?;

    match apply_seed(&service, &clock, &seed, now).await? {
        SeedOutcome::Applied(summary) => println!(
            "Seeded {} projects, {} members, {} scores into {}",
            summary.projects,
            summary.members,
            summary.scores,
            config.data_file.display()
        ),
        SeedOutcome::Skipped { existing_projects } => println!(
            "{} already has {existing_projects} project(s), skipping.",
            config.data_file.display()
        ),
    }

    Ok(())
}
