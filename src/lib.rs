mod authentication;
pub mod config;
mod data_formats;
mod db_helpers;
mod errors;
mod handlers;
pub mod models;
mod storage;
mod theme;
mod views;

use anyhow::Context;
pub use anyhow::Result;
use axum::{extract::DefaultBodyLimit, routing::*, Extension, Router};
pub use config::Config;
use handlers::*;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

/// Shared by every handler through an `Extension` layer.
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
}

pub async fn run_app(config: Config) -> Result<()> {
    let address = config.address()?;
    let pool = init_db(&config.database_url).await?;
    storage::ensure_dirs(&[config.upload_dir.as_path(), config.video_dir.as_path()])
        .await
        .context("Failed to create storage directories")?;

    let app = make_router(Arc::new(AppState { pool, config }));
    info!("Server started on {}", address);
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        info!("Creating database {}", db_url);
        Sqlite::create_database(db_url)
            .await
            .context("Failed to create database")?;
    } else {
        info!("Database already exists");
    }
    let pool = SqlitePool::connect(db_url).await?;
    info!("Running Migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    info!("Migrations completed");
    Ok(pool)
}

pub fn get_random_free_port() -> (u16, SocketAddr) {
    let listener = TcpListener::bind("localhost:0").unwrap();
    match listener.local_addr() {
        Ok(addr) => (addr.port(), addr),
        Err(_) => panic!("Could not get a free port"),
    }
}

pub fn make_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_bytes;
    let uploads = ServeDir::new(&state.config.upload_dir);
    let videos = ServeDir::new(&state.config.video_dir);

    Router::new()
        .route("/check_health", get(alive))
        .route("/", get(home).post(search))
        .route("/login", get(login_form).post(login_user))
        .route("/create_account", get(register_form).post(register_user))
        .route("/logout", get(logout_user))
        .route(
            "/forgot_password",
            get(forgot_password_form).post(forgot_password),
        )
        .route("/set_theme/:name", get(set_theme))
        .route(
            "/create_channel",
            get(create_channel_form).post(create_channel),
        )
        .route("/channels", get(list_all_channels))
        .route("/channel/:channel_id", get(channel_page))
        .route(
            "/channel/:channel_id/subscribe",
            get(subscribe_to_channel).post(subscribe_to_channel),
        )
        .route(
            "/channel/:channel_id/unsubscribe",
            get(unsubscribe_from_channel).post(unsubscribe_from_channel),
        )
        .route("/upload_video", get(upload_video_form).post(upload_video))
        .route("/video/:video_id/like", get(like_video))
        .route("/video/:video_id/dislike", get(dislike_video))
        .route("/video/:video_id/comment", post(add_comment))
        .route(
            "/comment/:comment_id/edit",
            get(edit_comment_form).post(edit_comment),
        )
        .route("/comment/:comment_id/delete", post(delete_comment))
        .nest_service("/uploads", uploads)
        .nest_service("/videos", videos)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}
