//! Board orchestration: the business rules that sit between validated
//! requests and the persistence gateway.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::BoardError;
use crate::models::{BoardPost, Id, NewBoardPost, UpdateBoardPost};
use crate::policy::PermissionPolicy;
use crate::repo::BoardPostRepo;

pub type BoardResult<T> = Result<T, BoardError>;

/// Holds the business rules for board posts. Dependencies are passed in at
/// construction; the service itself keeps no state between calls.
#[derive(Clone)]
pub struct BoardService {
    repo: Arc<dyn BoardPostRepo>,
    policy: Arc<dyn PermissionPolicy>,
}

impl BoardService {
    pub fn new(repo: Arc<dyn BoardPostRepo>, policy: Arc<dyn PermissionPolicy>) -> Self {
        Self { repo, policy }
    }

    pub fn check_permission(&self, post: &NewBoardPost) -> bool {
        self.policy.can_create(post)
    }

    /// Inserts a post whose title is not yet in use.
    ///
    /// The lookup by title only short-circuits the common case; the gateway's
    /// insert is what actually guarantees uniqueness under concurrency.
    pub async fn create(&self, new: NewBoardPost) -> BoardResult<BoardPost> {
        if !self.check_permission(&new) {
            warn!(author = %new.author, "create rejected by permission policy");
            return Err(BoardError::Forbidden);
        }
        if self.repo.find_by_title(&new.title).await?.is_some() {
            warn!(title = %new.title, "create rejected: duplicate title");
            return Err(BoardError::DuplicateTitle);
        }
        let post = self.repo.create_post(new).await.map_err(|e| {
            if e == crate::repo::RepoError::Conflict {
                warn!("create lost title race");
            }
            BoardError::from(e)
        })?;
        info!(board_id = post.id, "board post created");
        Ok(post)
    }

    /// Overwrites title and content. Author and timestamps are left alone and
    /// title uniqueness is not re-checked.
    pub async fn update(&self, id: Id, upd: UpdateBoardPost) -> BoardResult<BoardPost> {
        match self.repo.update_post(id, upd).await {
            Ok(post) => {
                info!(board_id = id, "board post updated");
                Ok(post)
            }
            Err(e) => {
                let e = BoardError::from(e);
                if e == BoardError::NotFound {
                    warn!(board_id = id, "update target not found");
                }
                Err(e)
            }
        }
    }

    /// Hard delete. Returns the post as it was before removal.
    pub async fn delete(&self, id: Id) -> BoardResult<BoardPost> {
        let post = self.repo.delete_post(id).await?;
        info!(board_id = id, "board post deleted");
        Ok(post)
    }

    pub async fn list_all(&self) -> BoardResult<Vec<BoardPost>> {
        Ok(self.repo.list_posts().await?)
    }

    pub async fn get_by_id(&self, id: Id) -> BoardResult<BoardPost> {
        self.repo.find_by_id(id).await?.ok_or(BoardError::NotFound)
    }
}
