// POST/DELETE /votes/upvotes/:postId, /votes/downvotes/:postId
//
// Both vote kinds share one cast and one retract implementation,
// dispatched on the explicit VoteKind variant.

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde_json::{json, Value};

use crate::database::models::VoteKind;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

use super::parse_id;

const POST_NOT_FOUND: &str = "The post was not found.";

pub async fn upvote_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(post_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    cast_vote(state, current, &post_id, VoteKind::Upvote).await
}

pub async fn upvote_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(post_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    retract_vote(state, current, &post_id, VoteKind::Upvote).await
}

pub async fn downvote_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(post_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    cast_vote(state, current, &post_id, VoteKind::Downvote).await
}

pub async fn downvote_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(post_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    retract_vote(state, current, &post_id, VoteKind::Downvote).await
}

/// Create a vote record for (current user, post). A concurrent duplicate
/// loses at the store's unique constraint and surfaces as a normal
/// duplicate-record failure.
async fn cast_vote(
    state: AppState,
    current: CurrentUser,
    raw_post_id: &str,
    kind: VoteKind,
) -> Result<Json<Value>, ApiError> {
    let user = current.require("You must be logged in to vote for a post")?;
    let post_id = parse_id(raw_post_id).ok_or_else(|| ApiError::not_found(POST_NOT_FOUND))?;

    state
        .store
        .find_post(post_id)
        .await?
        .ok_or_else(|| ApiError::not_found(POST_NOT_FOUND))?;

    let vote = state.store.create_vote(kind, user.id, post_id).await?;

    Ok(Json(json!({ "success": true, "vote": vote })))
}

/// Delete the unique (current user, post) vote record of the given kind.
async fn retract_vote(
    state: AppState,
    current: CurrentUser,
    raw_post_id: &str,
    kind: VoteKind,
) -> Result<Json<Value>, ApiError> {
    let user = current.require("You must be logged in to delete a vote")?;
    let post_id = parse_id(raw_post_id).ok_or_else(|| ApiError::not_found(POST_NOT_FOUND))?;

    let vote = state
        .store
        .find_vote(kind, user.id, post_id)
        .await?
        .ok_or_else(|| ApiError::not_found("You don't have a vote to delete"))?;

    state.store.delete_vote(kind, vote.id).await?;

    Ok(Json(json!({ "success": true, "vote": vote })))
}
