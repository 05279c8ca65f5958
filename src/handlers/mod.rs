pub mod posts;
pub mod subreddits;
pub mod users;
pub mod votes;

use uuid::Uuid;

/// Parse a path identifier. Callers map a malformed id to their own
/// not-found message, indistinguishable from a lookup miss.
pub(crate) fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}
