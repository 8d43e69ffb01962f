use std::sync::Arc;

use axum::{
    extract::Path,
    http::{header, HeaderMap},
    response::Redirect,
    Extension, Form,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info};

use crate::{
    authentication::{
        clear_session, get_jwt_token, hash_password_argon2, session_cookie, theme_cookie,
        verify_password_argon2, Session,
    },
    data_formats::{LoginRequest, RegisterRequest},
    db_helpers::{get_channel_by_owner, get_user_by_email, insert_user},
    errors::RequestError,
    theme::Theme,
    views, AppState,
};

use super::HtmlResult;

const DUPLICATE_EMAIL: &str = "Email already exists! <a href='/login'>Login here</a>";
const INVALID_LOGIN: &str = "Invalid login! <a href='/login'>Try again</a>";
const MISSING_CREDENTIALS: &str =
    "Email and password are required. <a href='/create_account'>Try again</a>";

// ----------------- User Handlers -----------------
pub async fn login_form(session: Session) -> HtmlResult {
    Ok(views::login_page(&session))
}

pub async fn login_user(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
    Form(request): Form<LoginRequest>,
) -> Result<(CookieJar, Redirect), RequestError> {
    let user = match get_user_by_email(&state.pool, &request.email).await? {
        Some(user) => user,
        None => return Err(RequestError::RunTimeError(INVALID_LOGIN)),
    };
    let is_password_correct = verify_password_argon2(request.password, user.password.clone())
        .await
        .map_err(|e| {
            error!("Could not verify password: {:#}", e);
            RequestError::ServerError
        })?;
    if !is_password_correct {
        return Err(RequestError::RunTimeError(INVALID_LOGIN));
    }

    let token = get_jwt_token(user.id, &state.config.session_secret).map_err(|e| {
        error!("Could not sign session: {:#}", e);
        RequestError::ServerError
    })?;
    info!("User {} logged in", user.id);

    let target = match get_channel_by_owner(&state.pool, user.id).await? {
        Some(channel) => super::redirect_to_channel(channel.id),
        None => Redirect::to("/create_channel"),
    };
    Ok((jar.add(session_cookie(token)), target))
}

pub async fn register_form(session: Session) -> HtmlResult {
    Ok(views::register_page(&session))
}

pub async fn register_user(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
    Form(request): Form<RegisterRequest>,
) -> Result<(CookieJar, Redirect), RequestError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(RequestError::RunTimeError(MISSING_CREDENTIALS));
    }
    if get_user_by_email(&state.pool, &request.email).await?.is_some() {
        return Err(RequestError::RunTimeError(DUPLICATE_EMAIL));
    }

    let password_hash = hash_password_argon2(request.password).await.map_err(|e| {
        error!("Could not hash password: {:#}", e);
        RequestError::ServerError
    })?;
    let user = insert_user(&state.pool, &request.email, &password_hash)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                return RequestError::RunTimeError(DUPLICATE_EMAIL);
            }
            e
        })?;

    let token = get_jwt_token(user.id, &state.config.session_secret).map_err(|e| {
        error!("Could not sign session: {:#}", e);
        RequestError::ServerError
    })?;
    info!("Registered user {}", user.id);
    Ok((jar.add(session_cookie(token)), Redirect::to("/create_channel")))
}

pub async fn logout_user(jar: CookieJar) -> (CookieJar, Redirect) {
    (clear_session(jar), Redirect::to("/login"))
}

pub async fn forgot_password_form(session: Session) -> HtmlResult {
    Ok(views::forgot_password_page(&session, false))
}

pub async fn forgot_password(session: Session) -> HtmlResult {
    info!("Password reset requested; resets are not supported");
    Ok(views::forgot_password_page(&session, true))
}
// ----------------- End User Handlers -----------------

// ----------------- Theme Handlers -----------------
/// Stores the theme and sends the browser back where it came from.
pub async fn set_theme(
    Path(name): Path<String>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let theme = Theme::from_name(&name);
    let back = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .unwrap_or("/");
    (jar.add(theme_cookie(theme)), Redirect::to(back))
}
