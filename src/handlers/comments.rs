use std::sync::Arc;

use axum::{response::Redirect, Extension, Form};
use tracing::warn;

use crate::{
    authentication::Session,
    data_formats::{CommentRequest, IdPath},
    db_helpers::{
        delete_comment_in_db, get_comment_by_id, get_video_by_id, insert_comment,
        update_comment_in_db,
    },
    errors::RequestError,
    models::Comment,
    views, AppState,
};

use super::{redirect_to_channel, HtmlResult};

// ----------------- Comment Handlers -----------------
pub async fn add_comment(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
    IdPath(video_id): IdPath,
    Form(request): Form<CommentRequest>,
) -> Result<Redirect, RequestError> {
    let user = session.require_user()?;
    let video = get_video_by_id(&state.pool, video_id)
        .await?
        .ok_or(RequestError::NotFound)?;
    let content = request.content.trim();
    if !content.is_empty() {
        insert_comment(&state.pool, user.id(), video.id, content).await?;
    }
    Ok(redirect_to_channel(video.channel_id))
}

/// Loads a comment the signed-in user wrote. Missing comments are a 404
/// before the session is even looked at.
async fn get_own_comment(
    state: &AppState,
    session: &Session,
    comment_id: i64,
    refusal: &'static str,
) -> Result<Comment, RequestError> {
    let comment = get_comment_by_id(&state.pool, comment_id)
        .await?
        .ok_or(RequestError::NotFound)?;
    let user = session.require_user()?;
    if comment.user_id != user.id() {
        warn!(
            "User {} tried to modify comment {} owned by {}",
            user.id(),
            comment.id,
            comment.user_id
        );
        return Err(RequestError::Forbidden(refusal));
    }
    Ok(comment)
}

async fn redirect_to_video_channel(
    state: &AppState,
    video_id: i64,
) -> Result<Redirect, RequestError> {
    let video = get_video_by_id(&state.pool, video_id)
        .await?
        .ok_or(RequestError::NotFound)?;
    Ok(redirect_to_channel(video.channel_id))
}

pub async fn edit_comment_form(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
    IdPath(comment_id): IdPath,
) -> HtmlResult {
    let comment = get_own_comment(
        &state,
        &session,
        comment_id,
        "You are not allowed to edit this comment.",
    )
    .await?;
    Ok(views::edit_comment_page(&session, &comment))
}

pub async fn edit_comment(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
    IdPath(comment_id): IdPath,
    Form(request): Form<CommentRequest>,
) -> Result<Redirect, RequestError> {
    let comment = get_own_comment(
        &state,
        &session,
        comment_id,
        "You are not allowed to edit this comment.",
    )
    .await?;
    let content = request.content.trim();
    if !content.is_empty() {
        update_comment_in_db(&state.pool, comment.id, content).await?;
    }
    redirect_to_video_channel(&state, comment.video_id).await
}

pub async fn delete_comment(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
    IdPath(comment_id): IdPath,
) -> Result<Redirect, RequestError> {
    let comment = get_own_comment(
        &state,
        &session,
        comment_id,
        "You are not allowed to delete this comment.",
    )
    .await?;
    let redirect = redirect_to_video_channel(&state, comment.video_id).await?;
    delete_comment_in_db(&state.pool, comment.id).await?;
    Ok(redirect)
}
