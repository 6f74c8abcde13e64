//! Request-shape checks run by the HTTP layer before anything reaches
//! [`BoardService`](crate::service::BoardService).
//!
//! Every check collects all problems instead of stopping at the first one, so
//! a client gets one message per offending field.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{BoardRequest, Id, IdField, NewBoardPost, UpdateBoardPost, MAX_SHORT_FIELD};

/// Field name -> human readable message. Serialises as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        // first message per field wins
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn into_result<T>(self, ok: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(ok()) } else { Err(self) }
    }
}

/// How a text field is checked and stored.
#[derive(Clone, Copy)]
enum Text {
    /// Trimmed before storing and capped at `MAX_SHORT_FIELD` characters.
    Short,
    /// Stored exactly as sent; only a blank value is rejected.
    Body,
}

fn required_text(errors: &mut FieldErrors, field: &str, value: Option<&String>, kind: Text) -> String {
    let Some(raw) = value.filter(|v| !v.trim().is_empty()) else {
        errors.add(field, format!("{field} is required"));
        return String::new();
    };
    match kind {
        Text::Body => raw.clone(),
        Text::Short => {
            let v = raw.trim();
            if v.chars().count() > MAX_SHORT_FIELD {
                errors.add(field, format!("{field} must be at most {MAX_SHORT_FIELD} characters"));
            }
            v.to_string()
        }
    }
}

fn required_id(errors: &mut FieldErrors, value: Option<IdField>) -> Id {
    match value {
        None => {
            errors.add("boardId", "boardId is required");
            0
        }
        Some(IdField::Value(id)) if id > 0 => id,
        Some(_) => {
            errors.add("boardId", "boardId must be a positive integer");
            0
        }
    }
}

/// Create needs title, content and author. `boardId` is ignored.
pub fn validate_create(req: &BoardRequest) -> Result<NewBoardPost, FieldErrors> {
    let mut errors = FieldErrors::new();
    let title = required_text(&mut errors, "title", req.title.as_ref(), Text::Short);
    let content = required_text(&mut errors, "content", req.content.as_ref(), Text::Body);
    let author = required_text(&mut errors, "author", req.author.as_ref(), Text::Short);
    errors.into_result(|| NewBoardPost { title, content, author })
}

/// Update needs the target id plus the title and content it overwrites.
/// `author` is ignored; it never changes after creation.
pub fn validate_update(req: &BoardRequest) -> Result<(Id, UpdateBoardPost), FieldErrors> {
    let mut errors = FieldErrors::new();
    let id = required_id(&mut errors, req.board_id);
    let title = required_text(&mut errors, "title", req.title.as_ref(), Text::Short);
    let content = required_text(&mut errors, "content", req.content.as_ref(), Text::Body);
    errors.into_result(|| (id, UpdateBoardPost { title, content }))
}

/// Delete and detail only need a valid id.
pub fn validate_board_id(board_id: Option<IdField>) -> Result<Id, FieldErrors> {
    let mut errors = FieldErrors::new();
    let id = required_id(&mut errors, board_id);
    errors.into_result(|| id)
}
