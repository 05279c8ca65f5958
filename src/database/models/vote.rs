use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A single vote record joining a user to a post. The backing tables enforce
/// `UNIQUE (user_id, post_id)` per vote kind.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Vote kinds are separate record types; casting both an upvote and a
/// downvote on the same post is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteKind {
    Upvote,
    Downvote,
}

impl VoteKind {
    /// Backing table for this vote kind. Static strings only - the store
    /// interpolates this into SQL.
    pub fn table(self) -> &'static str {
        match self {
            VoteKind::Upvote => "upvotes",
            VoteKind::Downvote => "downvotes",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_distinct_tables() {
        assert_eq!(VoteKind::Upvote.table(), "upvotes");
        assert_eq!(VoteKind::Downvote.table(), "downvotes");
    }
}
