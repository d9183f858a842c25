//! JSON-file-backed store.
//!
//! Wraps a [`MemoryStore`] that mirrors the file. Every operation holds an
//! advisory lock on a sidecar `.lock` file (shared for reads, exclusive for
//! writes) and reloads the file first, so several processes can share one
//! data file. Writes rewrite the whole snapshot via a temporary file and a
//! rename before the lock is released.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use fs2::FileExt;
use tokio::sync::Mutex;

use transparency_core::error::{Result, TransparencyError};
use transparency_core::model::{Member, MemberId, Project, ProjectId, Score, ScoreValue};
use transparency_core::traits::{MemberRegistry, NewMember, ProjectCatalog, ScoreStore};

use crate::clock::Clock;
use crate::memory::{MemoryStore, StoreSnapshot};

/// A store persisted to a single JSON file.
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
    /// Serializes writers within this process; the file lock covers the rest.
    write_lock: Mutex<()>,
}

/// Held advisory lock; released when dropped.
struct DataLock {
    file: File,
}

impl Drop for DataLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl FileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub async fn open(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Result<Self> {
        let path = path.into();
        let store = Self {
            inner: MemoryStore::with_clock(clock),
            path,
            write_lock: Mutex::new(()),
        };
        store.refresh().await?;

        let snapshot = store.inner.snapshot().await;
        tracing::debug!(
            path = %store.path.display(),
            projects = snapshot.projects.len(),
            members = snapshot.members.len(),
            scores = snapshot.scores.len(),
            "opened store"
        );
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.inner.snapshot().await
    }

    pub async fn project_count(&self) -> usize {
        self.inner.project_count().await
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("json.lock")
    }

    async fn lock(&self, exclusive: bool) -> Result<DataLock> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create directory for", &lock_path, e))?;
        }

        let acquire = lock_path.clone();
        tokio::task::spawn_blocking(move || -> std::io::Result<DataLock> {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&acquire)?;
            if exclusive {
                FileExt::lock_exclusive(&file)?;
            } else {
                FileExt::lock_shared(&file)?;
            }
            Ok(DataLock { file })
        })
        .await
        .map_err(|e| TransparencyError::internal(format!("lock task failed: {e}")))?
        .map_err(|e| io_error("lock", &lock_path, e))
    }

    /// Reload the file into memory. The caller holds the file lock.
    async fn reload(&self) -> Result<()> {
        let snapshot = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => serde_json::from_str::<StoreSnapshot>(&content).map_err(|e| {
                let err = TransparencyError::internal(format!(
                    "failed to parse store file {}: {e}",
                    self.path.display()
                ));
                tracing::error!("{err}");
                err
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreSnapshot::default(),
            Err(e) => return Err(io_error("read", &self.path, e)),
        };
        self.inner.replace(snapshot).await
    }

    /// Pick up commits made through other handles on the same file.
    async fn refresh(&self) -> Result<()> {
        let _lock = self.lock(false).await?;
        self.reload().await
    }

    /// Lock exclusively and reload, ready for a write.
    async fn begin_write(&self) -> Result<DataLock> {
        let lock = self.lock(true).await?;
        self.reload().await?;
        Ok(lock)
    }

    async fn persist(&self) -> Result<()> {
        let snapshot = self.inner.snapshot().await;
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| TransparencyError::internal(format!("failed to serialize store: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create directory for", &self.path, e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| io_error("write", &tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_error("replace", &self.path, e))?;
        Ok(())
    }
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> TransparencyError {
    let err = TransparencyError::internal(format!("failed to {action} {}: {e}", path.display()));
    tracing::error!("{err}");
    err
}

#[async_trait]
impl ProjectCatalog for FileStore {
    async fn create_project(&self, name: &str, document_url: &str) -> Result<Project> {
        let _guard = self.write_lock.lock().await;
        let _lock = self.begin_write().await?;
        let project = self.inner.create_project(name, document_url).await?;
        self.persist().await?;
        Ok(project)
    }

    async fn project(&self, id: ProjectId) -> Result<Project> {
        self.refresh().await?;
        self.inner.project(id).await
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.refresh().await?;
        self.inner.list_projects().await
    }
}

#[async_trait]
impl MemberRegistry for FileStore {
    async fn create_member(&self, project_id: ProjectId, member: NewMember) -> Result<Member> {
        let _guard = self.write_lock.lock().await;
        let _lock = self.begin_write().await?;
        let member = self.inner.create_member(project_id, member).await?;
        self.persist().await?;
        Ok(member)
    }

    async fn member(&self, id: MemberId) -> Result<Member> {
        self.refresh().await?;
        self.inner.member(id).await
    }

    async fn list_by_project(&self, project_id: ProjectId) -> Result<Vec<Member>> {
        self.refresh().await?;
        self.inner.list_by_project(project_id).await
    }
}

#[async_trait]
impl ScoreStore for FileStore {
    async fn append(
        &self,
        member_id: MemberId,
        value: ScoreValue,
        comment: Option<String>,
    ) -> Result<Score> {
        let _guard = self.write_lock.lock().await;
        let _lock = self.begin_write().await?;
        let score = self.inner.append(member_id, value, comment).await?;
        self.persist().await?;
        Ok(score)
    }

    async fn list_by_member(&self, member_id: MemberId) -> Result<Vec<Score>> {
        self.refresh().await?;
        self.inner.list_by_member(member_id).await
    }

    async fn latest_by_member(&self, member_id: MemberId) -> Result<Option<Score>> {
        self.refresh().await?;
        self.inner.latest_by_member(member_id).await
    }

    async fn histories(&self, member_ids: &[MemberId]) -> Result<HashMap<MemberId, Vec<Score>>> {
        self.refresh().await?;
        self.inner.histories(member_ids).await
    }
}
