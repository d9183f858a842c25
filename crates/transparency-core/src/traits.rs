//! Storage traits the engine and service are written against.
//!
//! Implemented by the `transparency-store` crate (in-memory and JSON-file
//! stores). All methods take `&self`; implementations synchronize internally.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::try_join_all;

use crate::error::Result;
use crate::model::{Member, MemberId, Project, ProjectId, Role, Score, ScoreValue};

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Catalog of projects.
#[async_trait]
pub trait ProjectCatalog: Send + Sync {
    /// Create a project. Both fields must be non-empty.
    async fn create_project(&self, name: &str, document_url: &str) -> Result<Project>;

    /// Look up a project, failing with `NotFound` for unknown ids.
    async fn project(&self, id: ProjectId) -> Result<Project>;

    /// All projects, newest first.
    async fn list_projects(&self) -> Result<Vec<Project>>;
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

/// Request to register a member in a project.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub name: String,
    pub role: Role,
    pub email: Option<String>,
}

/// Project membership and roles.
#[async_trait]
pub trait MemberRegistry: Send + Sync {
    /// Register a member. Fails with `NotFound` if the project is unknown.
    async fn create_member(&self, project_id: ProjectId, member: NewMember) -> Result<Member>;

    /// Look up a member, failing with `NotFound` for unknown ids.
    async fn member(&self, id: MemberId) -> Result<Member>;

    /// Members of one project, in creation order.
    async fn list_by_project(&self, project_id: ProjectId) -> Result<Vec<Member>>;
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

/// Append-only score log.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Append a score. The new record's timestamp is never earlier than any
    /// prior record for the same member.
    async fn append(
        &self,
        member_id: MemberId,
        value: ScoreValue,
        comment: Option<String>,
    ) -> Result<Score>;

    /// A member's scores, oldest first.
    async fn list_by_member(&self, member_id: MemberId) -> Result<Vec<Score>>;

    /// The member's most recent score, if any.
    async fn latest_by_member(&self, member_id: MemberId) -> Result<Option<Score>> {
        let scores = self.list_by_member(member_id).await?;
        Ok(scores.into_iter().max_by_key(Score::order_key))
    }

    /// Score histories for several members.
    ///
    /// The default issues one `list_by_member` per member concurrently.
    /// Stores that can read every history under one lock should override this
    /// so the result is a single point-in-time snapshot.
    async fn histories(&self, member_ids: &[MemberId]) -> Result<HashMap<MemberId, Vec<Score>>> {
        let lists = try_join_all(member_ids.iter().map(|&id| self.list_by_member(id))).await?;
        Ok(member_ids.iter().copied().zip(lists).collect())
    }
}

/// Everything the service needs from a backing store.
pub trait TransparencyStore: ProjectCatalog + MemberRegistry + ScoreStore {}

impl<T> TransparencyStore for T where T: ProjectCatalog + MemberRegistry + ScoreStore {}
