//! In-memory store.
//!
//! All state lives behind one `RwLock`, so every read observes every write
//! committed before it and aggregation reads a consistent snapshot.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use transparency_core::error::{Result, TransparencyError};
use transparency_core::model::{
    normalize_optional, require_non_empty, Member, MemberId, Project, ProjectId, Score, ScoreId,
    ScoreValue,
};
use transparency_core::traits::{MemberRegistry, NewMember, ProjectCatalog, ScoreStore};

use crate::clock::{Clock, SystemClock};

/// Serializable image of a store's contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub scores: Vec<Score>,
}

#[derive(Debug, Default)]
struct State {
    projects: BTreeMap<ProjectId, Project>,
    members: BTreeMap<MemberId, Member>,
    /// Per-member log, kept sorted by (created_at, id).
    scores: HashMap<MemberId, Vec<Score>>,
    next_project: u64,
    next_member: u64,
    next_score: u64,
}

impl State {
    fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self> {
        let mut state = State::default();

        for project in snapshot.projects {
            state.next_project = state.next_project.max(project.id.0);
            if state.projects.insert(project.id, project).is_some() {
                return Err(corrupt("duplicate project id"));
            }
        }

        for member in snapshot.members {
            if !state.projects.contains_key(&member.project_id) {
                return Err(corrupt(format!(
                    "member {} references unknown project {}",
                    member.id, member.project_id
                )));
            }
            state.next_member = state.next_member.max(member.id.0);
            state.scores.entry(member.id).or_default();
            if state.members.insert(member.id, member).is_some() {
                return Err(corrupt("duplicate member id"));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for score in snapshot.scores {
            if !seen.insert(score.id) {
                return Err(corrupt(format!("duplicate score id {}", score.id)));
            }
            let Some(log) = state.scores.get_mut(&score.member_id) else {
                return Err(corrupt(format!(
                    "score {} references unknown member {}",
                    score.id, score.member_id
                )));
            };
            state.next_score = state.next_score.max(score.id.0);
            log.push(score);
        }
        for log in state.scores.values_mut() {
            log.sort_by_key(Score::order_key);
        }

        Ok(state)
    }

    fn snapshot(&self) -> StoreSnapshot {
        let mut scores: Vec<Score> = self.scores.values().flatten().cloned().collect();
        scores.sort_by_key(|s| s.id);
        StoreSnapshot {
            projects: self.projects.values().cloned().collect(),
            members: self.members.values().cloned().collect(),
            scores,
        }
    }

    fn member_log(&self, id: MemberId) -> Result<&Vec<Score>> {
        self.scores
            .get(&id)
            .ok_or_else(|| TransparencyError::member_not_found(id))
    }
}

fn corrupt(message: impl Into<String>) -> TransparencyError {
    let err = TransparencyError::internal(format!("corrupt store data: {}", message.into()));
    tracing::error!("{err}");
    err
}

/// The in-memory store.
pub struct MemoryStore {
    state: RwLock<State>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// An empty store stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(State::default()),
            clock,
        }
    }

    /// Rebuild a store from a snapshot, checking referential integrity.
    pub fn from_snapshot(snapshot: StoreSnapshot, clock: Arc<dyn Clock>) -> Result<Self> {
        Ok(Self {
            state: RwLock::new(State::from_snapshot(snapshot)?),
            clock,
        })
    }

    /// Copy out the current contents.
    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.snapshot()
    }

    /// Swap in new contents, e.g. after another process rewrote the file.
    pub async fn replace(&self, snapshot: StoreSnapshot) -> Result<()> {
        let state = State::from_snapshot(snapshot)?;
        *self.state.write().await = state;
        Ok(())
    }

    pub async fn project_count(&self) -> usize {
        self.state.read().await.projects.len()
    }
}

#[async_trait]
impl ProjectCatalog for MemoryStore {
    async fn create_project(&self, name: &str, document_url: &str) -> Result<Project> {
        require_non_empty("name", name)?;
        require_non_empty("document_url", document_url)?;

        let mut state = self.state.write().await;
        state.next_project += 1;
        let project = Project {
            id: ProjectId(state.next_project),
            name: name.to_string(),
            document_url: document_url.to_string(),
            created_at: self.clock.now(),
        };
        state.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn project(&self, id: ProjectId) -> Result<Project> {
        let state = self.state.read().await;
        state
            .projects
            .get(&id)
            .cloned()
            .ok_or_else(|| TransparencyError::project_not_found(id))
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let state = self.state.read().await;
        let mut projects: Vec<Project> = state.projects.values().cloned().collect();
        projects.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(projects)
    }
}

#[async_trait]
impl MemberRegistry for MemoryStore {
    async fn create_member(&self, project_id: ProjectId, member: NewMember) -> Result<Member> {
        require_non_empty("name", &member.name)?;

        let mut state = self.state.write().await;
        if !state.projects.contains_key(&project_id) {
            return Err(TransparencyError::project_not_found(project_id));
        }
        state.next_member += 1;
        let member = Member {
            id: MemberId(state.next_member),
            project_id,
            name: member.name,
            role: member.role,
            email: normalize_optional(member.email),
            created_at: self.clock.now(),
        };
        state.members.insert(member.id, member.clone());
        state.scores.insert(member.id, Vec::new());
        Ok(member)
    }

    async fn member(&self, id: MemberId) -> Result<Member> {
        let state = self.state.read().await;
        state
            .members
            .get(&id)
            .cloned()
            .ok_or_else(|| TransparencyError::member_not_found(id))
    }

    async fn list_by_project(&self, project_id: ProjectId) -> Result<Vec<Member>> {
        let state = self.state.read().await;
        if !state.projects.contains_key(&project_id) {
            return Err(TransparencyError::project_not_found(project_id));
        }
        Ok(state
            .members
            .values()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ScoreStore for MemoryStore {
    async fn append(
        &self,
        member_id: MemberId,
        value: ScoreValue,
        comment: Option<String>,
    ) -> Result<Score> {
        let mut state = self.state.write().await;
        let floor = state.member_log(member_id)?.last().map(|s| s.created_at);

        // Never stamp earlier than the member's previous score, even if the
        // clock stepped backwards; equal stamps are ordered by id.
        let now = self.clock.now();
        let created_at = floor.map_or(now, |prev| prev.max(now));

        state.next_score += 1;
        let score = Score {
            id: ScoreId(state.next_score),
            member_id,
            value,
            comment,
            created_at,
        };
        state
            .scores
            .entry(member_id)
            .or_default()
            .push(score.clone());
        Ok(score)
    }

    async fn list_by_member(&self, member_id: MemberId) -> Result<Vec<Score>> {
        let state = self.state.read().await;
        Ok(state.member_log(member_id)?.clone())
    }

    async fn latest_by_member(&self, member_id: MemberId) -> Result<Option<Score>> {
        let state = self.state.read().await;
        Ok(state.member_log(member_id)?.last().cloned())
    }

    async fn histories(&self, member_ids: &[MemberId]) -> Result<HashMap<MemberId, Vec<Score>>> {
        let state = self.state.read().await;
        member_ids
            .iter()
            .map(|&id| Ok((id, state.member_log(id)?.clone())))
            .collect()
    }
}
