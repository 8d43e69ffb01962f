use std::sync::Arc;

use axum::{
    extract::Multipart,
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use tracing::info;

use crate::{
    authentication::Session,
    data_formats::{IdPath, MultipartForm},
    db_helpers::{
        count_subscribers, get_channel_by_id, get_channel_by_owner,
        get_comments_for_video_in_db, get_subscription, insert_channel, list_channel_videos,
        list_channels, subscribe, unsubscribe,
    },
    errors::RequestError,
    storage::store_image,
    views::{self, ChannelPageData, ChannelVideoSection},
    AppState,
};

use super::{redirect_to_channel, HtmlResult};

// ----------------- Channel Handlers -----------------
pub async fn create_channel_form(session: Session) -> Result<Response, RequestError> {
    let user = session.require_user()?;
    if let Some(channel) = &user.channel {
        return Ok(redirect_to_channel(channel.id).into_response());
    }
    Ok(views::create_channel_page(&session).into_response())
}

pub async fn create_channel(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
    multipart: Multipart,
) -> Result<Redirect, RequestError> {
    let user = session.require_user()?;
    if let Some(channel) = &user.channel {
        return Ok(redirect_to_channel(channel.id));
    }

    let mut form = MultipartForm::read(multipart).await?;
    let name = form
        .text("name")
        .map(str::to_string)
        .ok_or(RequestError::RunTimeError(
            "A channel name is required. <a href='/create_channel'>Try again</a>",
        ))?;

    let icon = match form.take_file("icon") {
        Some(file) => Some(store_image(&state.config.upload_dir, &file.file_name, file.bytes).await?),
        None => None,
    };
    let banner = match form.take_file("banner") {
        Some(file) => Some(store_image(&state.config.upload_dir, &file.file_name, file.bytes).await?),
        None => None,
    };

    let channel = match insert_channel(
        &state.pool,
        user.id(),
        &name,
        icon.as_deref(),
        banner.as_deref(),
    )
    .await
    {
        Ok(channel) => channel,
        // Lost a race with another create request for the same user.
        Err(e) if e.is_unique_violation() => get_channel_by_owner(&state.pool, user.id())
            .await?
            .ok_or(RequestError::ServerError)?,
        Err(e) => return Err(e),
    };
    info!("User {} created channel {}", user.id(), channel.id);
    Ok(redirect_to_channel(channel.id))
}

pub async fn list_all_channels(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
) -> HtmlResult {
    let channels = list_channels(&state.pool).await?;
    Ok(views::channels_page(&session, &channels))
}

pub async fn channel_page(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
    IdPath(channel_id): IdPath,
) -> HtmlResult {
    let channel = get_channel_by_id(&state.pool, channel_id)
        .await?
        .ok_or(RequestError::NotFound)?;

    let mut videos = Vec::new();
    for video in list_channel_videos(&state.pool, channel.id).await? {
        let comments = get_comments_for_video_in_db(&state.pool, video.id).await?;
        videos.push(ChannelVideoSection { video, comments });
    }

    let subscriber_count = count_subscribers(&state.pool, channel.id).await?;
    let subscribed = match session.user_id() {
        Some(user_id) => get_subscription(&state.pool, user_id, channel.id)
            .await?
            .is_some(),
        None => false,
    };

    let data = ChannelPageData {
        channel,
        videos,
        subscriber_count,
        subscribed,
    };
    Ok(views::channel_page(&session, &data))
}
// ----------------- End Channel Handlers -----------------

// ----------------- Subscription Handlers -----------------
pub async fn subscribe_to_channel(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
    IdPath(channel_id): IdPath,
) -> Result<Redirect, RequestError> {
    let user = session.require_user()?;
    let channel = get_channel_by_id(&state.pool, channel_id)
        .await?
        .ok_or(RequestError::NotFound)?;
    subscribe(&state.pool, user.id(), channel.id).await?;
    Ok(redirect_to_channel(channel.id))
}

pub async fn unsubscribe_from_channel(
    Extension(state): Extension<Arc<AppState>>,
    session: Session,
    IdPath(channel_id): IdPath,
) -> Result<Redirect, RequestError> {
    let user = session.require_user()?;
    let channel = get_channel_by_id(&state.pool, channel_id)
        .await?
        .ok_or(RequestError::NotFound)?;
    unsubscribe(&state.pool, user.id(), channel.id).await?;
    Ok(redirect_to_channel(channel.id))
}
