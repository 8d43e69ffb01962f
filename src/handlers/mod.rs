mod auth;
mod channels;
mod comments;
mod videos;

pub use auth::*;
pub use channels::*;
pub use comments::*;
pub use videos::*;

use axum::{
    http::{StatusCode, Uri},
    response::Redirect,
};

type HtmlResult = Result<axum::response::Html<String>, crate::errors::RequestError>;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    )
}

fn redirect_to_channel(channel_id: i64) -> Redirect {
    Redirect::to(&format!("/channel/{}", channel_id))
}
