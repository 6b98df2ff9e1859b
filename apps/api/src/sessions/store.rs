use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::models::interview::InterviewSession;
use crate::sessions::SessionHistory;

const CURRENT_FILE: &str = "current.json";
const HISTORY_FILE: &str = "history.json";

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Per-owner persistence of the active session and the finished-session history.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_current(&self, owner: &str) -> Result<Option<InterviewSession>, SessionStoreError>;

    async fn save_current(&self, owner: &str, session: &InterviewSession) -> Result<(), SessionStoreError>;

    async fn clear_current(&self, owner: &str) -> Result<(), SessionStoreError>;

    async fn load_history(&self, owner: &str) -> Result<SessionHistory, SessionStoreError>;

    /// Pushes a finished session onto the front of the history. Returns false when the
    /// session had no results and was not kept.
    async fn archive(&self, owner: &str, session: InterviewSession) -> Result<bool, SessionStoreError>;
}

/// Stores `<root>/<owner>/current.json` and `history.json`. Every write goes through a
/// temp file in the same directory and is renamed into place.
pub struct JsonFileSessionStore {
    root: PathBuf,
    history_lock: Mutex<()>,
}

impl JsonFileSessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            history_lock: Mutex::new(()),
        }
    }

    fn owner_dir(&self, owner: &str) -> PathBuf {
        self.root.join(sanitize_owner(owner))
    }
}

/// Owner ids come from request headers; keep only characters safe in a directory name.
fn sanitize_owner(owner: &str) -> String {
    let cleaned: String = owner
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, SessionStoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn write_json<T: Serialize>(path: PathBuf, value: &T) -> Result<(), SessionStoreError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    tokio::task::spawn_blocking(move || write_atomic(&path, &bytes)).await?
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), SessionStoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl SessionStore for JsonFileSessionStore {
    async fn load_current(&self, owner: &str) -> Result<Option<InterviewSession>, SessionStoreError> {
        read_json(&self.owner_dir(owner).join(CURRENT_FILE)).await
    }

    async fn save_current(&self, owner: &str, session: &InterviewSession) -> Result<(), SessionStoreError> {
        write_json(self.owner_dir(owner).join(CURRENT_FILE), session).await
    }

    async fn clear_current(&self, owner: &str) -> Result<(), SessionStoreError> {
        match tokio::fs::remove_file(self.owner_dir(owner).join(CURRENT_FILE)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn load_history(&self, owner: &str) -> Result<SessionHistory, SessionStoreError> {
        Ok(read_json(&self.owner_dir(owner).join(HISTORY_FILE))
            .await?
            .unwrap_or_default())
    }

    async fn archive(&self, owner: &str, session: InterviewSession) -> Result<bool, SessionStoreError> {
        let _guard = self.history_lock.lock().await;
        let mut history = self.load_history(owner).await?;
        let session_id = session.id.clone();
        if !history.archive(session) {
            return Ok(false);
        }
        write_json(self.owner_dir(owner).join(HISTORY_FILE), &history).await?;
        debug!("Archived session {session_id} ({} in history)", history.sessions().len());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interview::JobCategory;
    use crate::sessions::fixtures::{question, result_for};
    use crate::sessions::MAX_HISTORY;

    fn answered_session() -> InterviewSession {
        let mut session = InterviewSession::new(JobCategory::Backend, None);
        session.replace_queue(vec![question("a"), question("b")], true);
        session.record_result(result_for("a"));
        session
    }

    #[test]
    fn test_sanitize_owner_blocks_traversal() {
        assert_eq!(sanitize_owner("../etc"), "___etc");
        assert_eq!(sanitize_owner("203.0.113.7"), "203_0_113_7");
        assert_eq!(sanitize_owner(""), "unknown");
    }

    #[tokio::test]
    async fn test_current_session_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSessionStore::new(dir.path());
        assert!(store.load_current("c").await.unwrap().is_none());

        let session = answered_session();
        store.save_current("c", &session).await.unwrap();
        let loaded = store.load_current("c").await.unwrap().unwrap();
        assert_eq!(loaded, session);
        assert_eq!(loaded.results[0].created_at, session.results[0].created_at);

        store.clear_current("c").await.unwrap();
        assert!(store.load_current("c").await.unwrap().is_none());
        store.clear_current("c").await.unwrap();
    }

    #[tokio::test]
    async fn test_owners_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSessionStore::new(dir.path());
        store.save_current("a", &answered_session()).await.unwrap();
        assert!(store.load_current("b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_archive_caps_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSessionStore::new(dir.path());

        for _ in 0..MAX_HISTORY + 2 {
            assert!(store.archive("c", answered_session()).await.unwrap());
        }
        let empty = InterviewSession::new(JobCategory::Qa, None);
        assert!(!store.archive("c", empty).await.unwrap());

        assert_eq!(store.load_history("c").await.unwrap().sessions().len(), MAX_HISTORY);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSessionStore::new(dir.path());
        let owner_dir = dir.path().join("c");
        std::fs::create_dir_all(&owner_dir).unwrap();
        std::fs::write(owner_dir.join(CURRENT_FILE), b"{not json").unwrap();

        assert!(matches!(
            store.load_current("c").await,
            Err(SessionStoreError::Json(_))
        ));
    }
}
