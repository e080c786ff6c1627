//! Directory-backed thread store.
//!
//! Each thread is one JSON document, `<token>.json`. Writers serialize on a
//! `<token>.lock` file created with `create_new`, so separate gateway
//! processes sharing a directory never interleave updates. A removed
//! thread leaves a `<token>.closed` marker behind so its token is never
//! reused.

use async_trait::async_trait;
use gateway_application::{StoreError, ThreadStore};
use gateway_domain::{ContinuationToken, ConversationThread};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(20);
const LOCK_TIMEOUT: Duration = Duration::from_secs(2);
/// Locks older than this are left over from a crashed writer
const STALE_LOCK_AGE: Duration = Duration::from_secs(30);

/// [`ThreadStore`] persisting one file per thread under `dir`.
pub struct FileThreadStore {
    dir: PathBuf,
}

impl FileThreadStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| backend(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn thread_path(&self, token: &ContinuationToken) -> PathBuf {
        self.dir.join(format!("{token}.json"))
    }

    fn lock_path(&self, token: &ContinuationToken) -> PathBuf {
        self.dir.join(format!("{token}.lock"))
    }

    fn closed_path(&self, token: &ContinuationToken) -> PathBuf {
        self.dir.join(format!("{token}.closed"))
    }

    async fn read(&self, token: &ContinuationToken) -> Result<Option<ConversationThread>, StoreError> {
        let path = self.thread_path(token);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(backend(&path, e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Backend(format!("{}: {}", path.display(), e)))
    }

    /// Write via a temporary file and rename, so readers never see a
    /// partially written thread.
    async fn write(&self, thread: &ConversationThread) -> Result<(), StoreError> {
        let path = self.thread_path(&thread.token);
        let tmp = self
            .dir
            .join(format!("{}.{}.tmp", thread.token, uuid::Uuid::new_v4()));
        let json = serde_json::to_vec_pretty(thread)
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if let Err(e) = tokio::fs::write(&tmp, &json).await {
            return Err(backend(&tmp, e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(backend(&path, e));
        }
        Ok(())
    }

    async fn lock(&self, token: &ContinuationToken) -> Result<LockGuard, StoreError> {
        let path = self.lock_path(token);
        let deadline = tokio::time::Instant::now() + LOCK_TIMEOUT;

        loop {
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(_) => return Ok(LockGuard { path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if is_stale(&path).await {
                        warn!(lock = %path.display(), "Removing stale thread lock");
                        let _ = tokio::fs::remove_file(&path).await;
                        continue;
                    }
                    if tokio::time::Instant::now() >= deadline {
                        return Err(StoreError::Backend(format!(
                            "timed out waiting for {}",
                            path.display()
                        )));
                    }
                    tokio::time::sleep(LOCK_RETRY_INTERVAL).await;
                }
                Err(e) => return Err(backend(&path, e)),
            }
        }
    }
}

/// Exclusive hold on one thread; released on drop.
struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != ErrorKind::NotFound
        {
            warn!(lock = %self.path.display(), error = %e, "Failed to release thread lock");
        }
    }
}

async fn is_stale(path: &Path) -> bool {
    let Ok(metadata) = tokio::fs::metadata(path).await else {
        return false;
    };
    metadata
        .modified()
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age >= STALE_LOCK_AGE)
}

fn backend(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Backend(format!("{}: {}", path.display(), err))
}

#[async_trait]
impl ThreadStore for FileThreadStore {
    async fn load(&self, token: &ContinuationToken) -> Result<Option<ConversationThread>, StoreError> {
        self.read(token).await
    }

    async fn insert(&self, thread: &ConversationThread) -> Result<(), StoreError> {
        let _guard = self.lock(&thread.token).await?;
        let exists = tokio::fs::try_exists(self.thread_path(&thread.token))
            .await
            .unwrap_or(false)
            || tokio::fs::try_exists(self.closed_path(&thread.token))
                .await
                .unwrap_or(false);
        if exists {
            return Err(StoreError::AlreadyExists(thread.token.to_string()));
        }
        self.write(thread).await?;
        debug!(token = %thread.token, "Thread created");
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        thread: &ConversationThread,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        let _guard = self.lock(&thread.token).await?;
        let current = self
            .read(&thread.token)
            .await?
            .ok_or_else(|| StoreError::NotFound(thread.token.to_string()))?;
        if current.version != expected_version {
            return Err(StoreError::Conflict {
                token: thread.token.to_string(),
                expected: expected_version,
                found: current.version,
            });
        }
        self.write(thread).await
    }

    async fn remove(&self, token: &ContinuationToken) -> Result<bool, StoreError> {
        let _guard = self.lock(token).await?;
        let path = self.thread_path(token);
        // Only tokens that were handed out get a marker
        if !tokio::fs::try_exists(&path)
            .await
            .map_err(|e| backend(&path, e))?
        {
            return Ok(false);
        }
        let closed = self.closed_path(token);
        tokio::fs::write(&closed, b"")
            .await
            .map_err(|e| backend(&closed, e))?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(token = %token, "Thread removed");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(backend(&path, e)),
        }
    }

    async fn tokens(&self) -> Result<Vec<ContinuationToken>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| backend(&self.dir, e))?;
        let mut tokens = Vec::new();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| backend(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && let Ok(token) = ContinuationToken::parse(stem)
            {
                tokens.push(token);
            }
        }
        tokens.sort();
        Ok(tokens)
    }
}
