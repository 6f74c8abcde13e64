use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::models::NewBoardPost;

/// Decides whether a create may go ahead. Authentication lives outside this
/// crate; implementations only see the validated post.
pub trait PermissionPolicy: Send + Sync {
    fn can_create(&self, post: &NewBoardPost) -> bool;
}

/// Refuses every create. The default until a real policy is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl PermissionPolicy for DenyAll {
    fn can_create(&self, _post: &NewBoardPost) -> bool {
        false
    }
}

/// Permits every create.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionPolicy for AllowAll {
    fn can_create(&self, _post: &NewBoardPost) -> bool {
        true
    }
}

/// Policy selector read from `BOARD_CREATE_POLICY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreatePolicy {
    #[default]
    Deny,
    Allow,
}

impl CreatePolicy {
    pub fn build(self) -> Arc<dyn PermissionPolicy> {
        match self {
            CreatePolicy::Deny => Arc::new(DenyAll),
            CreatePolicy::Allow => Arc::new(AllowAll),
        }
    }
}

impl FromStr for CreatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deny" => Ok(CreatePolicy::Deny),
            "allow" => Ok(CreatePolicy::Allow),
            other => Err(format!("unknown create policy '{other}' (expected 'deny' or 'allow')")),
        }
    }
}

impl fmt::Display for CreatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CreatePolicy::Deny => "deny",
            CreatePolicy::Allow => "allow",
        })
    }
}
