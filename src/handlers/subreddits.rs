// GET/POST /subreddits, DELETE /subreddits/:subredditId

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

use super::parse_id;

const SUBREDDIT_NOT_FOUND: &str = "The subreddit was not found.";

#[derive(Debug, Default, Deserialize)]
pub struct CreateSubredditRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// GET /subreddits - all subreddits, unfiltered
pub async fn subreddits_get(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let subreddits = state.store.list_subreddits().await?;
    Ok(Json(json!({ "success": true, "subreddits": subreddits })))
}

/// POST /subreddits - create a subreddit owned by the current user
pub async fn subreddits_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    body: Option<Json<CreateSubredditRequest>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let name = body
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::validation("Name must be provided to create a subreddit!"))?;
    let user = current.require("You must be logged in to create a subreddit.")?;

    let subreddit = state.store.create_subreddit(&name, user.id).await?;

    Ok(Json(json!({ "success": true, "subreddit": subreddit })))
}

/// DELETE /subreddits/:subredditId - creator-only; returns the deleted record
pub async fn subreddits_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(subreddit_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let user = current.require("You must be logged in to delete a subreddit.")?;
    let subreddit_id =
        parse_id(&subreddit_id).ok_or_else(|| ApiError::not_found(SUBREDDIT_NOT_FOUND))?;

    let subreddit = state
        .store
        .find_subreddit(subreddit_id)
        .await?
        .ok_or_else(|| ApiError::not_found(SUBREDDIT_NOT_FOUND))?;

    if subreddit.user_id != user.id {
        return Err(ApiError::forbidden(
            "You don't have permission to delete this subreddit.",
        ));
    }

    state.store.delete_subreddit(subreddit_id).await?;

    Ok(Json(json!({ "success": true, "subreddit": subreddit })))
}
