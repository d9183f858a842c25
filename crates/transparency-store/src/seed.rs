//! Applying seed data to a store.
//!
//! Historical scores go through the ordinary append path; the store is
//! expected to be stamped by the same [`ManualClock`] passed here, which is
//! moved to each score's submission time before it is appended.

use chrono::{DateTime, Duration, Utc};

use transparency_core::error::{Result, TransparencyError};
use transparency_core::seed::SeedData;
use transparency_core::service::TransparencyService;

use crate::clock::ManualClock;

/// Counts of what a seed run created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub projects: usize,
    pub members: usize,
    pub scores: usize,
}

/// Outcome of a seed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Applied(SeedSummary),
    /// The store already had projects; nothing was written.
    Skipped { existing_projects: usize },
}

/// Seed an empty store. Scores are dated `days_ago` days before `now`.
pub async fn apply_seed(
    service: &TransparencyService,
    clock: &ManualClock,
    seed: &SeedData,
    now: DateTime<Utc>,
) -> Result<SeedOutcome> {
    let existing_projects = service.list_projects().await?.len();
    if existing_projects > 0 {
        tracing::warn!(existing_projects, "store is not empty, skipping seed");
        return Ok(SeedOutcome::Skipped { existing_projects });
    }

    // Resolve every date before writing anything.
    let oldest = seed
        .projects
        .iter()
        .flat_map(|p| &p.members)
        .flat_map(|m| &m.scores)
        .map(|s| s.days_ago)
        .max()
        .unwrap_or(0);
    clock.set(days_before(now, oldest)?);

    let mut summary = SeedSummary::default();
    let mut pending = Vec::new();

    for project in &seed.projects {
        let created = service
            .create_project(&project.name, &project.document_url)
            .await?;
        summary.projects += 1;

        for member in &project.members {
            let registered = service
                .create_member(
                    created.id,
                    &member.name,
                    member.role.as_str(),
                    member.email.clone(),
                )
                .await?;
            summary.members += 1;

            for score in &member.scores {
                pending.push((days_before(now, score.days_ago)?, registered.id, score));
            }
        }
    }

    // Stable sort: same-instant scores keep file order.
    pending.sort_by_key(|(at, _, _)| *at);
    for (at, member_id, score) in pending {
        clock.set(at);
        service
            .submit_score(member_id, score.value.get(), score.comment.clone())
            .await?;
        summary.scores += 1;
    }
    clock.set(now);

    tracing::info!(
        projects = summary.projects,
        members = summary.members,
        scores = summary.scores,
        "seeded store"
    );
    Ok(SeedOutcome::Applied(summary))
}

fn days_before(now: DateTime<Utc>, days_ago: u32) -> Result<DateTime<Utc>> {
    now.checked_sub_signed(Duration::days(i64::from(days_ago)))
        .ok_or_else(|| {
            TransparencyError::validation(format!("days_ago {days_ago} is out of range"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    use chrono::TimeZone;
    use transparency_core::seed::{demo_seed, parse_seed_str};

    use crate::memory::MemoryStore;

    fn setup() -> (TransparencyService, Arc<ManualClock>, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2024, 11, 29, 10, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(now));
        let store = Arc::new(MemoryStore::with_clock(clock.clone()));
        (TransparencyService::new(store), clock, now)
    }

    #[tokio::test]
    async fn seeds_history_in_chronological_order() {
        let (service, clock, now) = setup();
        let seed = parse_seed_str(
            r#"
[[projects]]
name = "Apollo"
document_url = "https://x"

[[projects.members]]
name = "Ada"
role = "Member"
scores = [{ value = 60, days_ago = 0 }, { value = 80, days_ago = 2 }]

[[projects.members]]
name = "Bo"
role = "PL"
scores = [{ value = 40, days_ago = 1 }]
"#,
            Path::new("seed.toml"),
        )
        .unwrap();

        let outcome = apply_seed(&service, &clock, &seed, now).await.unwrap();
        assert_eq!(
            outcome,
            SeedOutcome::Applied(SeedSummary {
                projects: 1,
                members: 2,
                scores: 3
            })
        );

        let project = service.list_projects().await.unwrap().remove(0);
        let dashboard = service.get_dashboard(project.id).await.unwrap();
        let values: Vec<f64> = dashboard
            .timeline
            .iter()
            .map(|p| p.weighted_average)
            .collect();
        assert_eq!(values, vec![80.0, 50.0, 45.0]);
        assert_eq!(dashboard.last_updated, Some(now));
        assert_eq!(dashboard.weighted_average, Some(45.0));
    }

    #[tokio::test]
    async fn demo_seed_builds_five_week_timelines() {
        let (service, clock, now) = setup();
        let seed = demo_seed().unwrap();
        let outcome = apply_seed(&service, &clock, &seed, now).await.unwrap();
        assert_eq!(
            outcome,
            SeedOutcome::Applied(SeedSummary {
                projects: 3,
                members: 12,
                scores: 60
            })
        );

        for project in service.list_projects().await.unwrap() {
            let dashboard = service.get_dashboard(project.id).await.unwrap();
            assert_eq!(dashboard.timeline.len(), 5);
            assert!(dashboard.weighted_average.is_some());
        }
    }

    #[tokio::test]
    async fn non_empty_store_is_left_alone() {
        let (service, clock, now) = setup();
        service.create_project("Existing", "https://e").await.unwrap();

        let outcome = apply_seed(&service, &clock, &demo_seed().unwrap(), now)
            .await
            .unwrap();
        assert_eq!(outcome, SeedOutcome::Skipped { existing_projects: 1 });
        assert_eq!(service.list_projects().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn out_of_range_days_ago_is_rejected_before_writing() {
        let (service, clock, now) = setup();
        let seed = parse_seed_str(
            r#"
[[projects]]
name = "Ancient"
document_url = "https://a"

[[projects.members]]
name = "Ada"
role = "PL"
scores = [{ value = 50, days_ago = 200000000 }]
"#,
            Path::new("seed.toml"),
        )
        .unwrap();

        let err = apply_seed(&service, &clock, &seed, now).await.unwrap_err();
        assert!(matches!(err, TransparencyError::Validation(_)));
        assert!(service.list_projects().await.unwrap().is_empty());
    }
}
