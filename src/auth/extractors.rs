use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use super::{
    claims::Claims,
    dto::SessionKeys,
    repo_types::User,
    services::{removal_cookie, SESSION_COOKIE},
};
use crate::{error::ApiError, state::AppState};

/// Reads the session token from the cookie, falling back to a Bearer header.
fn session_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_owned());
    }
    let auth = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::to_owned)
}

fn session_claims(parts: &Parts, keys: &SessionKeys) -> Option<Claims> {
    let token = session_token(parts)?;
    match keys.verify(&token) {
        Ok(claims) => Some(claims),
        Err(_) => {
            warn!("invalid or expired session");
            None
        }
    }
}

enum Session {
    Missing,
    /// Signed correctly, but the account is gone or its password changed since.
    Stale,
    Active(User),
}

async fn resolve_session(parts: &Parts, state: &AppState) -> anyhow::Result<Session> {
    let keys = SessionKeys::from_ref(state);
    let Some(claims) = session_claims(parts, &keys) else {
        return Ok(Session::Missing);
    };

    match User::find_by_id(&state.db, claims.sub).await? {
        Some(user) if user.session_version == claims.ver => Ok(Session::Active(user)),
        Some(_) => {
            warn!(user_id = %claims.sub, "session predates password change");
            Ok(Session::Stale)
        }
        None => {
            warn!(user_id = %claims.sub, "session for missing user");
            Ok(Session::Stale)
        }
    }
}

/// Authenticated user for the JSON endpoints; rejects with a 401 JSON body.
pub struct AuthUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        match resolve_session(parts, &state).await? {
            Session::Active(user) => Ok(AuthUser(user)),
            Session::Missing | Session::Stale => Err(ApiError::Unauthorized),
        }
    }
}

/// Authenticated user for HTML pages; redirects to `/login` instead. A stale
/// session also has its cookie dropped.
pub struct SessionUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        match resolve_session(parts, &state).await {
            Ok(Session::Active(user)) => Ok(SessionUser(user)),
            Ok(Session::Missing) => Err(Redirect::to("/login").into_response()),
            Ok(Session::Stale) => {
                let jar = CookieJar::from_headers(&parts.headers).remove(removal_cookie());
                Err((jar, Redirect::to("/login")).into_response())
            }
            Err(e) => Err(ApiError::from(e).into_response()),
        }
    }
}
