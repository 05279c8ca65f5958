// GET/POST /posts, PUT/DELETE /posts/:postId

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::{NewPost, PostDetail, VoteKind};
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

use super::parse_id;

const POST_NOT_FOUND: &str = "The post was not found.";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subreddit_id: Option<Uuid>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// GET /posts - every post with user, subreddit, votes and direct children
/// eagerly attached. No pagination or ordering guarantee.
pub async fn posts_get(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let posts = state.store.list_posts().await?;

    let mut user_ids: Vec<Uuid> = posts.iter().map(|p| p.user_id).collect();
    user_ids.sort_unstable();
    user_ids.dedup();
    let mut subreddit_ids: Vec<Uuid> = posts.iter().map(|p| p.subreddit_id).collect();
    subreddit_ids.sort_unstable();
    subreddit_ids.dedup();

    let users = state.store.users_public_by_ids(&user_ids).await?;
    let subreddits = state.store.subreddits_by_ids(&subreddit_ids).await?;
    let upvotes = state.store.list_votes(VoteKind::Upvote).await?;
    let downvotes = state.store.list_votes(VoteKind::Downvote).await?;

    let posts = PostDetail::assemble(posts, users, subreddits, upvotes, downvotes);

    Ok(Json(json!({ "success": true, "posts": posts })))
}

/// POST /posts - create a post owned by the token subject
pub async fn posts_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    body: Option<Json<CreatePostRequest>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let text = body
        .text
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::validation("Text must be provided to create a message!"))?;
    let subreddit_id = body
        .subreddit_id
        .ok_or_else(|| ApiError::validation("Subreddit must be provided to create a message!"))?;
    let user = current.require("You must be logged in to create a post.")?;

    // Owner is always the token subject, never a client-supplied value
    let post = state
        .store
        .create_post(NewPost {
            text,
            title: body.title,
            user_id: user.id,
            subreddit_id,
            parent_id: body.parent_id,
        })
        .await?;

    Ok(Json(json!({ "success": true, "post": post })))
}

/// PUT /posts/:postId - owner-only partial update of title and/or text
pub async fn posts_put(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(post_id): Path<String>,
    body: Option<Json<UpdatePostRequest>>,
) -> Result<Json<Value>, ApiError> {
    let user = current.require("You must be logged in to update a post.")?;
    let post_id = parse_id(&post_id).ok_or_else(|| ApiError::not_found(POST_NOT_FOUND))?;

    let post = state
        .store
        .find_post(post_id)
        .await?
        .ok_or_else(|| ApiError::not_found(POST_NOT_FOUND))?;

    let body = body.map(|Json(b)| b).unwrap_or_default();
    let title = body.title.filter(|t| !t.is_empty());
    let text = body.text.filter(|t| !t.is_empty());
    if title.is_none() && text.is_none() {
        return Err(ApiError::validation(
            "Should provide title or text to update a post!",
        ));
    }

    if post.user_id != user.id {
        return Err(ApiError::forbidden(
            "You don't have permission to update this post.",
        ));
    }

    let post = state
        .store
        .update_post(post_id, title.as_deref(), text.as_deref())
        .await?;

    Ok(Json(json!({ "success": true, "post": post })))
}

/// DELETE /posts/:postId - owner-only; returns the deleted record
pub async fn posts_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(post_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let user = current.require("You must be logged in to delete a post.")?;
    let post_id = parse_id(&post_id).ok_or_else(|| ApiError::not_found(POST_NOT_FOUND))?;

    let post = state
        .store
        .find_post(post_id)
        .await?
        .ok_or_else(|| ApiError::not_found(POST_NOT_FOUND))?;

    if post.user_id != user.id {
        return Err(ApiError::forbidden(
            "You don't have permission to delete this post.",
        ));
    }

    state.store.delete_post(post_id).await?;

    Ok(Json(json!({ "success": true, "post": post })))
}
