use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::subreddit::Subreddit;
use super::user::UserPublic;
use super::vote::Vote;

/// A post record. `parent_id` links replies to their parent post, forming a
/// tree; a parent must already exist when a reply is created.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub text: String,
    pub title: Option<String>,
    pub user_id: Uuid,
    pub subreddit_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new post. `user_id` is always the token subject.
#[derive(Debug)]
pub struct NewPost {
    pub text: String,
    pub title: Option<String>,
    pub user_id: Uuid,
    pub subreddit_id: Uuid,
    pub parent_id: Option<Uuid>,
}

/// A post with its relations eagerly attached, as returned by `GET /posts`.
#[derive(Debug, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub user: Option<UserPublic>,
    pub subreddit: Option<Subreddit>,
    pub upvotes: Vec<Vote>,
    pub downvotes: Vec<Vote>,
    pub children: Vec<Post>,
}

impl PostDetail {
    /// Join flat record sets into per-post detail rows. Direct children are
    /// resolved from the same post set; deeper descendants appear under
    /// their own parent, not transitively.
    pub fn assemble(
        posts: Vec<Post>,
        users: Vec<UserPublic>,
        subreddits: Vec<Subreddit>,
        upvotes: Vec<Vote>,
        downvotes: Vec<Vote>,
    ) -> Vec<PostDetail> {
        let users: HashMap<Uuid, UserPublic> = users.into_iter().map(|u| (u.id, u)).collect();
        let subreddits: HashMap<Uuid, Subreddit> =
            subreddits.into_iter().map(|s| (s.id, s)).collect();

        let mut upvotes_by_post: HashMap<Uuid, Vec<Vote>> = HashMap::new();
        for vote in upvotes {
            upvotes_by_post.entry(vote.post_id).or_default().push(vote);
        }
        let mut downvotes_by_post: HashMap<Uuid, Vec<Vote>> = HashMap::new();
        for vote in downvotes {
            downvotes_by_post.entry(vote.post_id).or_default().push(vote);
        }

        let mut children_by_parent: HashMap<Uuid, Vec<Post>> = HashMap::new();
        for post in &posts {
            if let Some(parent_id) = post.parent_id {
                children_by_parent
                    .entry(parent_id)
                    .or_default()
                    .push(post.clone());
            }
        }

        posts
            .into_iter()
            .map(|post| PostDetail {
                user: users.get(&post.user_id).cloned(),
                subreddit: subreddits.get(&post.subreddit_id).cloned(),
                upvotes: upvotes_by_post.remove(&post.id).unwrap_or_default(),
                downvotes: downvotes_by_post.remove(&post.id).unwrap_or_default(),
                children: children_by_parent.remove(&post.id).unwrap_or_default(),
                post,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: Uuid, user_id: Uuid, subreddit_id: Uuid, parent_id: Option<Uuid>) -> Post {
        Post {
            id,
            text: "hello".to_string(),
            title: None,
            user_id,
            subreddit_id,
            parent_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user(id: Uuid) -> UserPublic {
        UserPublic {
            id,
            username: "alice".to_string(),
            created_at: Utc::now(),
        }
    }

    fn subreddit(id: Uuid, user_id: Uuid) -> Subreddit {
        Subreddit {
            id,
            name: "rust".to_string(),
            user_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn replies_nest_under_parent_children() {
        let (user_id, sub_id) = (Uuid::new_v4(), Uuid::new_v4());
        let parent_id = Uuid::new_v4();
        let reply_id = Uuid::new_v4();
        let posts = vec![
            post(parent_id, user_id, sub_id, None),
            post(reply_id, user_id, sub_id, Some(parent_id)),
        ];

        let details = PostDetail::assemble(
            posts,
            vec![user(user_id)],
            vec![subreddit(sub_id, user_id)],
            vec![],
            vec![],
        );

        assert_eq!(details.len(), 2);
        let parent = details.iter().find(|d| d.post.id == parent_id).unwrap();
        assert_eq!(parent.children.len(), 1);
        assert_eq!(parent.children[0].id, reply_id);
        let reply = details.iter().find(|d| d.post.id == reply_id).unwrap();
        assert!(reply.children.is_empty());
    }

    #[test]
    fn votes_attach_to_their_post() {
        let (user_id, sub_id) = (Uuid::new_v4(), Uuid::new_v4());
        let post_a = Uuid::new_v4();
        let post_b = Uuid::new_v4();
        let upvote = Vote {
            id: Uuid::new_v4(),
            user_id,
            post_id: post_a,
            created_at: Utc::now(),
        };

        let details = PostDetail::assemble(
            vec![
                post(post_a, user_id, sub_id, None),
                post(post_b, user_id, sub_id, None),
            ],
            vec![user(user_id)],
            vec![subreddit(sub_id, user_id)],
            vec![upvote],
            vec![],
        );

        let a = details.iter().find(|d| d.post.id == post_a).unwrap();
        let b = details.iter().find(|d| d.post.id == post_b).unwrap();
        assert_eq!(a.upvotes.len(), 1);
        assert!(a.downvotes.is_empty());
        assert!(b.upvotes.is_empty());
    }

    #[test]
    fn wire_format_uses_camel_case_and_sanitized_user() {
        let (user_id, sub_id) = (Uuid::new_v4(), Uuid::new_v4());
        let details = PostDetail::assemble(
            vec![post(Uuid::new_v4(), user_id, sub_id, None)],
            vec![user(user_id)],
            vec![subreddit(sub_id, user_id)],
            vec![],
            vec![],
        );

        let value = serde_json::to_value(&details[0]).unwrap();
        assert!(value.get("userId").is_some());
        assert!(value.get("subredditId").is_some());
        assert!(value["user"].get("password").is_none());
        assert!(value["children"].as_array().unwrap().is_empty());
    }
}
