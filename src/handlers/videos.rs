use std::sync::Arc;

use axum::{
    extract::{Multipart, Query},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use tracing::{debug, info};

use crate::{
    authentication::{AuthUser, Session},
    data_formats::{IdPath, MultipartForm, SearchParams},
    db_helpers::{
        get_video_by_id, get_vote, insert_video, list_recent_videos, recommended_videos,
        set_vote, RECENT_VIDEO_LIMIT, RECOMMENDATION_LIMIT,
    },
    errors::RequestError,
    models::{Channel, Vote},
    storage::store_file,
    views, AppState,
};

use super::{redirect_to_channel, HtmlResult};

const CHANNEL_REQUIRED: &str =
    "You must create a channel first! <a href='/create_channel'>Make one here</a>";

// ----------------- Home Handlers -----------------
pub async fn home(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
    Query(params): Query<SearchParams>,
) -> HtmlResult {
    render_home(&state, &session, params).await
}

pub async fn search(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
    Form(params): Form<SearchParams>,
) -> HtmlResult {
    render_home(&state, &session, params).await
}

async fn render_home(state: &AppState, session: &Session, params: SearchParams) -> HtmlResult {
    let query = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty());
    let recommended =
        recommended_videos(&state.pool, session.user_id(), RECOMMENDATION_LIMIT).await?;
    let recent = list_recent_videos(&state.pool, query, RECENT_VIDEO_LIMIT).await?;
    Ok(views::home_page(session, &recommended, &recent, query))
}

// ----------------- Upload Handlers -----------------
fn owned_channel(user: &AuthUser) -> Result<&Channel, RequestError> {
    user.channel
        .as_ref()
        .ok_or(RequestError::RunTimeError(CHANNEL_REQUIRED))
}

pub async fn upload_video_form(session: Session) -> Result<Response, RequestError> {
    owned_channel(session.require_user()?)?;
    Ok(views::upload_video_page(&session).into_response())
}

pub async fn upload_video(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
    multipart: Multipart,
) -> Result<Redirect, RequestError> {
    let user = session.require_user()?;
    let channel = owned_channel(user)?;

    let mut form = MultipartForm::read(multipart).await?;
    let title = form
        .text("title")
        .map(str::to_string)
        .ok_or(RequestError::RunTimeError(
            "A title is required. <a href='/upload_video'>Try again</a>",
        ))?;
    let file = form
        .take_file("video")
        .ok_or(RequestError::RunTimeError("No video file uploaded!"))?;

    let filename = store_file(&state.config.video_dir, &file.file_name, &file.bytes).await?;
    let video = insert_video(&state.pool, channel.id, &title, &filename).await?;
    info!(
        "User {} uploaded video {} to channel {}",
        user.id(),
        video.id,
        channel.id
    );
    Ok(redirect_to_channel(channel.id))
}

// ----------------- Vote Handlers -----------------
pub async fn like_video(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
    IdPath(video_id): IdPath,
) -> Result<Redirect, RequestError> {
    record_vote(&state, &session, video_id, Vote::Like).await
}

pub async fn dislike_video(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
    IdPath(video_id): IdPath,
) -> Result<Redirect, RequestError> {
    record_vote(&state, &session, video_id, Vote::Dislike).await
}

async fn record_vote(
    state: &AppState,
    session: &Session,
    video_id: i64,
    vote: Vote,
) -> Result<Redirect, RequestError> {
    let user = session.require_user()?;
    let video = get_video_by_id(&state.pool, video_id)
        .await?
        .ok_or(RequestError::NotFound)?;
    let previous = get_vote(&state.pool, user.id(), video.id)
        .await?
        .and_then(|row| Vote::from_value(row.value));
    if previous == Some(vote) {
        debug!("User {} repeated {:?} on video {}", user.id(), vote, video.id);
    } else {
        set_vote(&state.pool, user.id(), video.id, vote).await?;
    }
    Ok(redirect_to_channel(video.channel_id))
}
