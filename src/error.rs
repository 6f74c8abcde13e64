use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::repo::RepoError;
use crate::validation::FieldErrors;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
}

/// Outcomes of [`BoardService`](crate::service::BoardService) other than success.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum BoardError {
    #[error("permission denied")] Forbidden,
    #[error("a board with the same title already exists")] DuplicateTitle,
    #[error("board not found")] NotFound,
    #[error(transparent)] Storage(RepoError),
}

impl From<RepoError> for BoardError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound => BoardError::NotFound,
            RepoError::Conflict => BoardError::DuplicateTitle,
            other => BoardError::Storage(other),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("validation failed")] Validation(FieldErrors),
    #[error("bad request: {0}")] BadRequest(String),
    #[error("you do not have permission to create a post")] Forbidden,
    #[error("a board with the same title already exists")] Conflict,
    #[error("board post not found")] NotFound,
    #[error("internal error")] Internal,
}

impl From<FieldErrors> for ApiError {
    fn from(e: FieldErrors) -> Self {
        ApiError::Validation(e)
    }
}

impl From<BoardError> for ApiError {
    fn from(e: BoardError) -> Self {
        match e {
            BoardError::Forbidden => ApiError::Forbidden,
            BoardError::DuplicateTitle => ApiError::Conflict,
            BoardError::NotFound => ApiError::NotFound,
            BoardError::Storage(inner) => {
                log::error!("storage failure: {inner}");
                ApiError::Internal
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut res = HttpResponse::build(self.status_code());
        match self {
            ApiError::Validation(fields) => res.json(fields),
            ApiError::BadRequest(msg) => res.json(ApiErrorBody { error: msg.clone() }),
            other => res.json(ApiErrorBody { error: other.to_string() }),
        }
    }
}
