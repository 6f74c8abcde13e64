use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use crate::models::*;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RepoError {
    #[error("not found")] NotFound,
    #[error("conflict")] Conflict,
    #[error("storage error: {0}")] Internal(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => RepoError::NotFound,
            sqlx::Error::Database(ref db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => RepoError::Conflict,
            other => RepoError::Internal(other.to_string()),
        }
    }
}

/// Persistence gateway for board posts.
///
/// `create_post` must be atomic with respect to title uniqueness: two
/// concurrent creates with the same title yield one post and one `Conflict`.
/// `update_post` deliberately does not check titles.
#[async_trait]
pub trait BoardPostRepo: Send + Sync {
    async fn create_post(&self, new: NewBoardPost) -> RepoResult<BoardPost>;
    async fn update_post(&self, id: Id, upd: UpdateBoardPost) -> RepoResult<BoardPost>;
    /// Removes the row and returns it as it was.
    async fn delete_post(&self, id: Id) -> RepoResult<BoardPost>;
    async fn find_by_id(&self, id: Id) -> RepoResult<Option<BoardPost>>;
    async fn find_by_title(&self, title: &str) -> RepoResult<Option<BoardPost>>;
    /// All posts, ascending by id.
    async fn list_posts(&self) -> RepoResult<Vec<BoardPost>>;
}

pub mod inmem {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::path::{Path, PathBuf};

    pub const SNAPSHOT_FILE: &str = "state.json";

    #[derive(Default, Serialize, Deserialize)]
    struct State {
        posts: BTreeMap<Id, BoardPost>,
        next_id: Id,
    }

    /// Process-local store. Every mutation happens under a single write lock,
    /// which is what makes the title check and the insert one step.
    #[derive(Clone, Default)]
    pub struct InMemRepo {
        state: Arc<RwLock<State>>,
        snapshot_path: Option<Arc<PathBuf>>,
    }

    impl InMemRepo {
        /// Empty store that lives only as long as the process.
        pub fn new() -> Self {
            Self::default()
        }

        /// Store backed by `<dir>/state.json`: loaded now, rewritten after
        /// every mutation.
        pub fn with_snapshot_dir(dir: impl AsRef<Path>) -> Self {
            let path = dir.as_ref().join(SNAPSHOT_FILE);
            let state = Self::load_state_from(&path);
            Self {
                state: Arc::new(RwLock::new(state)),
                snapshot_path: Some(Arc::new(path)),
            }
        }

        fn load_state_from(path: &Path) -> State {
            match std::fs::read(path) {
                Ok(bytes) => match serde_json::from_slice::<State>(&bytes) {
                    Ok(s) => {
                        log::info!("loaded snapshot '{}' ({} posts)", path.display(), s.posts.len());
                        s
                    }
                    Err(e) => {
                        log::warn!("failed to parse snapshot '{}': {e}; starting empty", path.display());
                        State::default()
                    }
                },
                Err(e) => {
                    log::info!("no snapshot at '{}' ({e}); starting empty", path.display());
                    State::default()
                }
            }
        }

        // Called with the write guard still held so snapshots land in mutation order.
        // A failure here means the caller must undo its change before returning.
        fn persist(&self, state: &State) -> RepoResult<()> {
            let Some(path) = self.snapshot_path.as_deref() else { return Ok(()) };
            let bytes = serde_json::to_vec_pretty(state)
                .map_err(|e| RepoError::Internal(format!("failed to serialise snapshot: {e}")))?;
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    RepoError::Internal(format!("failed to create snapshot dir '{}': {e}", dir.display()))
                })?;
            }
            std::fs::write(path, bytes)
                .map_err(|e| RepoError::Internal(format!("failed to write snapshot '{}': {e}", path.display())))
        }

        fn next_id(state: &mut State) -> Id {
            state.next_id += 1;
            state.next_id
        }

        fn read(&self) -> RepoResult<std::sync::RwLockReadGuard<'_, State>> {
            self.state.read().map_err(|_| RepoError::Internal("in-memory store lock poisoned".into()))
        }

        fn write(&self) -> RepoResult<std::sync::RwLockWriteGuard<'_, State>> {
            self.state.write().map_err(|_| RepoError::Internal("in-memory store lock poisoned".into()))
        }
    }

    #[async_trait]
    impl BoardPostRepo for InMemRepo {
        async fn create_post(&self, new: NewBoardPost) -> RepoResult<BoardPost> {
            let mut s = self.write()?;
            if s.posts.values().any(|p| p.title == new.title) {
                return Err(RepoError::Conflict);
            }
            let id = Self::next_id(&mut s);
            let now = Utc::now();
            let post = BoardPost {
                id,
                title: new.title,
                content: new.content,
                author: new.author,
                view_count: None,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            };
            s.posts.insert(id, post.clone());
            if let Err(e) = self.persist(&s) {
                s.posts.remove(&id);
                s.next_id -= 1;
                return Err(e);
            }
            Ok(post)
        }

        async fn update_post(&self, id: Id, upd: UpdateBoardPost) -> RepoResult<BoardPost> {
            let mut s = self.write()?;
            let post = s.posts.get_mut(&id).ok_or(RepoError::NotFound)?;
            let previous = post.clone();
            post.title = upd.title;
            post.content = upd.content;
            let updated = post.clone();
            if let Err(e) = self.persist(&s) {
                s.posts.insert(id, previous);
                return Err(e);
            }
            Ok(updated)
        }

        async fn delete_post(&self, id: Id) -> RepoResult<BoardPost> {
            let mut s = self.write()?;
            let removed = s.posts.remove(&id).ok_or(RepoError::NotFound)?;
            if let Err(e) = self.persist(&s) {
                s.posts.insert(id, removed);
                return Err(e);
            }
            Ok(removed)
        }

        async fn find_by_id(&self, id: Id) -> RepoResult<Option<BoardPost>> {
            Ok(self.read()?.posts.get(&id).cloned())
        }

        async fn find_by_title(&self, title: &str) -> RepoResult<Option<BoardPost>> {
            Ok(self.read()?.posts.values().find(|p| p.title == title).cloned())
        }

        async fn list_posts(&self) -> RepoResult<Vec<BoardPost>> {
            // BTreeMap iterates in key order
            Ok(self.read()?.posts.values().cloned().collect())
        }
    }
}

// Postgres implementation (feature = "postgres-store")
#[cfg(feature = "postgres-store")]
pub mod pg {
    use super::*;
    use sqlx::{Pool, Postgres};

    const COLUMNS: &str = "board_id, board_title, board_content, board_author, board_viewcount, \
                           board_createdat, board_updatedat, board_deletedat";

    #[derive(Clone)]
    pub struct PgRepo { pool: Pool<Postgres> }

    impl PgRepo {
        pub fn new(pool: Pool<Postgres>) -> Self { Self { pool } }
    }

    #[async_trait]
    impl BoardPostRepo for PgRepo {
        async fn create_post(&self, new: NewBoardPost) -> RepoResult<BoardPost> {
            let mut tx = self.pool.begin().await?;
            // Serialise creates per title; released on commit/rollback.
            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
                .bind(&new.title)
                .execute(&mut *tx).await?;
            let taken = sqlx::query_as::<_, (Id,)>("SELECT board_id FROM board WHERE board_title = $1 LIMIT 1")
                .bind(&new.title)
                .fetch_optional(&mut *tx).await?;
            if taken.is_some() {
                return Err(RepoError::Conflict); // tx rolls back on drop
            }
            let sql = format!(
                "INSERT INTO board (board_title, board_content, board_author) VALUES ($1,$2,$3) RETURNING {COLUMNS}"
            );
            let rec = sqlx::query_as::<_, BoardPost>(&sql)
                .bind(&new.title).bind(&new.content).bind(&new.author)
                .fetch_one(&mut *tx).await?;
            tx.commit().await?;
            Ok(rec)
        }

        async fn update_post(&self, id: Id, upd: UpdateBoardPost) -> RepoResult<BoardPost> {
            let sql = format!(
                "UPDATE board SET board_title = $2, board_content = $3 WHERE board_id = $1 RETURNING {COLUMNS}"
            );
            let rec = sqlx::query_as::<_, BoardPost>(&sql)
                .bind(id).bind(&upd.title).bind(&upd.content)
                .fetch_optional(&self.pool).await?;
            rec.ok_or(RepoError::NotFound)
        }

        async fn delete_post(&self, id: Id) -> RepoResult<BoardPost> {
            let sql = format!("DELETE FROM board WHERE board_id = $1 RETURNING {COLUMNS}");
            let rec = sqlx::query_as::<_, BoardPost>(&sql)
                .bind(id)
                .fetch_optional(&self.pool).await?;
            rec.ok_or(RepoError::NotFound)
        }

        async fn find_by_id(&self, id: Id) -> RepoResult<Option<BoardPost>> {
            let sql = format!("SELECT {COLUMNS} FROM board WHERE board_id = $1");
            Ok(sqlx::query_as::<_, BoardPost>(&sql).bind(id).fetch_optional(&self.pool).await?)
        }

        async fn find_by_title(&self, title: &str) -> RepoResult<Option<BoardPost>> {
            let sql = format!("SELECT {COLUMNS} FROM board WHERE board_title = $1 ORDER BY board_id LIMIT 1");
            Ok(sqlx::query_as::<_, BoardPost>(&sql).bind(title).fetch_optional(&self.pool).await?)
        }

        async fn list_posts(&self) -> RepoResult<Vec<BoardPost>> {
            let sql = format!("SELECT {COLUMNS} FROM board ORDER BY board_id");
            Ok(sqlx::query_as::<_, BoardPost>(&sql).fetch_all(&self.pool).await?)
        }
    }
}
