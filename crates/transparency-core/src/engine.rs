//! Aggregation engine.
//!
//! Reads a point-in-time snapshot of a project's members and their score
//! histories from the store, then derives per-member standings, the weighted
//! project average and the timeline. Nothing is cached between calls.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TransparencyError};
use crate::model::{Member, Project, ProjectId, Score};
use crate::statistics::{
    build_timeline, current_weighted_average, last_updated, MemberHistory, TimelinePoint,
};
use crate::traits::TransparencyStore;

/// A member's current standing (latest score plus role weight).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberStanding {
    pub member: Member,
    pub weight: u32,
    /// Latest submission, absent if the member was never scored.
    pub latest: Option<Score>,
}

impl MemberStanding {
    fn from_history(history: &MemberHistory) -> Self {
        Self {
            member: history.member.clone(),
            weight: history.weight(),
            latest: history.latest().cloned(),
        }
    }
}

/// Everything the engine derives for one project.
#[derive(Debug, Clone)]
pub struct ProjectAggregate {
    pub project: Project,
    pub standings: Vec<MemberStanding>,
    /// `None` when no member has any score.
    pub weighted_average: Option<f64>,
    /// Latest score timestamp across the project.
    pub last_updated: Option<DateTime<Utc>>,
    pub timeline: Vec<TimelinePoint>,
}

/// The aggregation engine.
pub struct AggregationEngine {
    store: Arc<dyn TransparencyStore>,
}

impl AggregationEngine {
    pub fn new(store: Arc<dyn TransparencyStore>) -> Self {
        Self { store }
    }

    /// Snapshot a project's members with their histories, in member order.
    pub async fn snapshot(&self, project_id: ProjectId) -> Result<(Project, Vec<MemberHistory>)> {
        let project = self.store.project(project_id).await?;
        let members = self.store.list_by_project(project_id).await?;
        let ids: Vec<_> = members.iter().map(|m| m.id).collect();
        let mut histories = self.store.histories(&ids).await?;

        let mut snapshot = Vec::with_capacity(members.len());
        for member in members {
            let scores = histories.remove(&member.id).ok_or_else(|| {
                let err = TransparencyError::internal(format!(
                    "store returned no history for member {}",
                    member.id
                ));
                tracing::error!("{err}");
                err
            })?;
            snapshot.push(MemberHistory::new(member, scores));
        }
        Ok((project, snapshot))
    }

    /// Per-member standings for a project.
    pub async fn standings(&self, project_id: ProjectId) -> Result<Vec<MemberStanding>> {
        let (_, histories) = self.snapshot(project_id).await?;
        Ok(histories.iter().map(MemberStanding::from_history).collect())
    }

    /// Full aggregation: standings, weighted average, last update, timeline.
    pub async fn aggregate(&self, project_id: ProjectId) -> Result<ProjectAggregate> {
        let start = Instant::now();
        let (project, histories) = self.snapshot(project_id).await?;

        let standings = histories.iter().map(MemberStanding::from_history).collect();
        let weighted_average = current_weighted_average(&histories);
        let last_updated = last_updated(&histories);
        let timeline = build_timeline(&histories);

        tracing::debug!(
            project = %project_id,
            members = histories.len(),
            scores = histories.iter().map(|h| h.scores.len()).sum::<usize>(),
            points = timeline.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "aggregated project"
        );

        Ok(ProjectAggregate {
            project,
            standings,
            weighted_average,
            last_updated,
            timeline,
        })
    }
}
