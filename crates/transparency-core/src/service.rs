//! Request/response facade consumed by outer layers (CLI, HTTP, UI).
//!
//! Inputs arrive as loosely typed values and are validated here; every
//! project or member reference that does not resolve yields `NotFound`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dashboard::Dashboard;
use crate::engine::{AggregationEngine, MemberStanding};
use crate::error::Result;
use crate::model::{
    normalize_optional, require_non_empty, Member, MemberId, Project, ProjectId, Role, Score,
    ScoreValue,
};
use crate::traits::{NewMember, TransparencyStore};

/// A project with its members embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub members: Vec<Member>,
}

/// A member row with its latest score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberWithLatestScore {
    pub id: MemberId,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_score: Option<ScoreValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_score_at: Option<DateTime<Utc>>,
}

impl From<MemberStanding> for MemberWithLatestScore {
    fn from(standing: MemberStanding) -> Self {
        Self {
            id: standing.member.id,
            name: standing.member.name,
            role: standing.member.role,
            email: standing.member.email,
            latest_score: standing.latest.as_ref().map(|s| s.value),
            latest_score_at: standing.latest.as_ref().map(|s| s.created_at),
        }
    }
}

/// Identity of the member a score history belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberInfo {
    pub id: MemberId,
    pub name: String,
    pub role: Role,
}

/// A member's full score history, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreHistory {
    pub member: MemberInfo,
    pub scores: Vec<Score>,
}

/// The service facade.
pub struct TransparencyService {
    store: Arc<dyn TransparencyStore>,
    engine: AggregationEngine,
}

impl TransparencyService {
    pub fn new(store: Arc<dyn TransparencyStore>) -> Self {
        let engine = AggregationEngine::new(Arc::clone(&store));
        Self { store, engine }
    }

    pub fn engine(&self) -> &AggregationEngine {
        &self.engine
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.store.list_projects().await
    }

    pub async fn create_project(&self, name: &str, document_url: &str) -> Result<Project> {
        require_non_empty("name", name)?;
        require_non_empty("document_url", document_url)?;
        let project = self.store.create_project(name, document_url).await?;
        tracing::info!(project = %project.id, name = %project.name, "created project");
        Ok(project)
    }

    pub async fn get_project(&self, id: ProjectId) -> Result<ProjectDetail> {
        let project = self.store.project(id).await?;
        let members = self.store.list_by_project(id).await?;
        Ok(ProjectDetail { project, members })
    }

    pub async fn list_members(&self, project_id: ProjectId) -> Result<Vec<MemberWithLatestScore>> {
        let standings = self.engine.standings(project_id).await?;
        Ok(standings.into_iter().map(Into::into).collect())
    }

    pub async fn create_member(
        &self,
        project_id: ProjectId,
        name: &str,
        role: &str,
        email: Option<String>,
    ) -> Result<Member> {
        require_non_empty("name", name)?;
        let role: Role = role.parse()?;
        let member = self
            .store
            .create_member(
                project_id,
                NewMember {
                    name: name.to_string(),
                    role,
                    email: normalize_optional(email),
                },
            )
            .await?;
        tracing::info!(
            project = %project_id,
            member = %member.id,
            role = %member.role,
            "created member"
        );
        Ok(member)
    }

    pub async fn submit_score(
        &self,
        member_id: MemberId,
        value: f64,
        comment: Option<String>,
    ) -> Result<Score> {
        let value = ScoreValue::new(value)?;
        let score = self
            .store
            .append(member_id, value, normalize_optional(comment))
            .await?;
        tracing::info!(member = %member_id, score = %score.id, value = %score.value, "submitted score");
        Ok(score)
    }

    pub async fn list_scores(&self, member_id: MemberId) -> Result<ScoreHistory> {
        let member = self.store.member(member_id).await?;
        let scores = self.store.list_by_member(member_id).await?;
        Ok(ScoreHistory {
            member: MemberInfo {
                id: member.id,
                name: member.name,
                role: member.role,
            },
            scores,
        })
    }

    pub async fn get_dashboard(&self, project_id: ProjectId) -> Result<Dashboard> {
        let aggregate = self.engine.aggregate(project_id).await?;
        Ok(Dashboard::from(aggregate))
    }
}
