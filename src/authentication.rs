use std::sync::Arc;

use anyhow::{Context, Result};
use argon2::PasswordVerifier;
use argon2::{password_hash::SaltString, Argon2, PasswordHash};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::warn;

use crate::{
    db_helpers::{get_channel_by_owner, get_user_by_id},
    errors::RequestError,
    models::{Channel, User},
    theme::Theme,
    AppState,
};

const JWT_EXPIRY_DURATION: time::Duration = time::Duration::days(90);

pub const TOKEN_COOKIE: &str = "token";
pub const THEME_COOKIE: &str = "theme";

#[derive(Debug, Serialize, Deserialize)]
struct AuthClaim {
    id: i64,
    exp: i64,
}

/// The signed-in user together with the channel they own, if any.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub channel: Option<Channel>,
}

impl AuthUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn owns_channel(&self, channel_id: i64) -> bool {
        self.channel.as_ref().map(|c| c.id) == Some(channel_id)
    }
}

/// Request-scoped view of who is asking and how pages should look.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<AuthUser>,
    pub theme: Theme,
}

impl Session {
    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(AuthUser::id)
    }

    pub fn require_user(&self) -> Result<&AuthUser, RequestError> {
        self.user.as_ref().ok_or(RequestError::NotAuthorized)
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let state = parts
            .extensions
            .get::<Arc<AppState>>()
            .cloned()
            .ok_or(RequestError::ServerError)?;
        let jar = CookieJar::from_headers(&parts.headers);

        let theme = jar
            .get(THEME_COOKIE)
            .map(|cookie| Theme::from_name(cookie.value()))
            .unwrap_or_default();

        let id = match jar.get(TOKEN_COOKIE) {
            Some(cookie) => match verify_jwt_token(cookie.value(), &state.config.session_secret) {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!("Ignoring session token: {}", e);
                    None
                }
            },
            None => None,
        };

        let user = match id {
            Some(id) => match get_user_by_id(&state.pool, id).await? {
                Some(user) => {
                    let channel = get_channel_by_owner(&state.pool, user.id).await?;
                    Some(AuthUser { user, channel })
                }
                None => {
                    warn!("Session token refers to missing user {}", id);
                    None
                }
            },
            None => None,
        };

        Ok(Session { user, theme })
    }
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .finish()
}

pub fn theme_cookie(theme: Theme) -> Cookie<'static> {
    Cookie::build(THEME_COOKIE, theme.name()).path("/").finish()
}

/// Removes both session cookies.
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(TOKEN_COOKIE, "").path("/").finish())
        .remove(Cookie::build(THEME_COOKIE, "").path("/").finish())
}

pub fn get_jwt_token(id: i64, secret: &str) -> Result<String> {
    let expiry_date = OffsetDateTime::now_utc() + JWT_EXPIRY_DURATION;
    let claim = AuthClaim {
        id,
        exp: expiry_date.unix_timestamp(),
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claim,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_ref()),
    )
    .context("Failed to generate jwt token")
}

pub fn verify_jwt_token(token: &str, secret: &str) -> Result<i64> {
    let token_data = jsonwebtoken::decode::<AuthClaim>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(secret.as_ref()),
        &jsonwebtoken::Validation::default(),
    )
    .context("Invalid token")?;
    let claim = token_data.claims;
    if claim.exp < OffsetDateTime::now_utc().unix_timestamp() {
        anyhow::bail!("Token expired");
    }
    Ok(claim.id)
}

pub async fn verify_password_argon2(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        let hash = PasswordHash::new(hash.as_str())
            .map_err(|_| anyhow::anyhow!("Failed to verify password"))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok())
    })
    .await
    .context("Failed to verify password")?
}

pub async fn hash_password_argon2(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(rand::thread_rng());
        let hash = PasswordHash::generate(Argon2::default(), password, salt.as_salt())
            .map_err(|_| anyhow::anyhow!("Failed to hash password"))?;
        Ok(hash.to_string())
    })
    .await
    .context("Failed to hash password")?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jwt_round_trips_user_id() {
        let token = get_jwt_token(42, "secret").unwrap();
        assert_eq!(verify_jwt_token(&token, "secret").unwrap(), 42);
    }

    #[test]
    fn jwt_signed_with_other_secret_is_rejected() {
        let token = get_jwt_token(42, "secret").unwrap();
        assert!(verify_jwt_token(&token, "other").is_err());
        assert!(verify_jwt_token("not-a-token", "secret").is_err());
    }

    #[tokio::test]
    async fn password_hash_verifies_only_the_original() {
        let hash = hash_password_argon2("hunter2".to_string()).await.unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password_argon2("hunter2".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password_argon2("hunter3".to_string(), hash)
            .await
            .unwrap());
    }
}
