use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

// board_id is a BIGSERIAL
pub type Id = i64;

/// Maximum length of `title` and `author` (VARCHAR(255) columns).
pub const MAX_SHORT_FIELD: usize = 255;

/// A stored board post. Field names follow the `board` table columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BoardPost {
    #[serde(rename = "boardId")]
    #[sqlx(rename = "board_id")]
    #[schema(value_type = i64)]
    pub id: Id,
    #[sqlx(rename = "board_title")]
    pub title: String,
    #[sqlx(rename = "board_content")]
    pub content: String,
    #[sqlx(rename = "board_author")]
    pub author: String,
    #[sqlx(rename = "board_viewcount")]
    pub view_count: Option<i32>, // never written by any operation
    #[sqlx(rename = "board_createdat")]
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "board_updatedat")]
    pub updated_at: DateTime<Utc>,
    #[sqlx(rename = "board_deletedat")]
    pub deleted_at: Option<DateTime<Utc>>, // deletes are hard, so always None
}

/// Validated input for inserting a post. Id, timestamps and view count are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewBoardPost {
    pub title: String,
    pub content: String,
    pub author: String,
}

/// Validated input for an update. Only these two columns ever change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdateBoardPost {
    pub title: String,
    pub content: String,
}

/// Raw request shape shared by every board endpoint. Which fields are
/// required depends on the operation; see `crate::validation`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardRequest {
    #[schema(value_type = Option<i64>)]
    pub board_id: Option<IdField>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
}

/// `boardId` as the client sent it. Form and query values arrive as text, and
/// a value that is not an integer is kept as `Malformed` so validation can
/// report it against the field instead of failing the whole body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdField {
    Value(Id),
    Malformed,
}

impl From<Id> for IdField {
    fn from(id: Id) -> Self {
        IdField::Value(id)
    }
}

impl<'de> Deserialize<'de> for IdField {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(Id),
            Text(String),
            Other(serde::de::IgnoredAny),
        }
        Ok(match Raw::deserialize(d)? {
            Raw::Int(id) => IdField::Value(id),
            Raw::Text(s) => s.trim().parse().map(IdField::Value).unwrap_or(IdField::Malformed),
            Raw::Other(_) => IdField::Malformed,
        })
    }
}
