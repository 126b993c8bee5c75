use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            ChangePasswordForm, DeleteAccountForm, ForgotPasswordForm, LoginForm, MeResponse,
            NoticeQuery, PublicUser, RegisterForm, ResetPasswordForm,
        },
        extractors::{AuthUser, SessionUser},
        repo_types::{PasswordResetToken, User},
        services::{
            check_new_password, generate_reset_token, hash_password, hash_reset_token,
            is_valid_email, is_valid_username, removal_cookie, verify_password, SessionKeys,
        },
    },
    error::ApiResult,
    pages::{
        notice_message, render, render_with_status,
        templates::{ForgotPasswordPage, LoginPage, RegisterPage, ResetPasswordPage, SettingsPage},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout).post(logout))
        .route("/forgot-password", get(forgot_password_page).post(forgot_password))
        .route(
            "/reset-password/:token",
            get(reset_password_page).post(reset_password),
        )
}

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/settings/change-password", post(change_password))
        .route("/settings/delete-account", post(delete_account))
}

fn register_error(status: StatusCode, msg: &str, form: RegisterForm) -> Response {
    render_with_status(
        status,
        &RegisterPage {
            error: Some(msg.into()),
            username: form.username,
            email: form.email,
        },
    )
}

pub async fn register_page() -> Response {
    render(&RegisterPage::default())
}

#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    Form(mut form): Form<RegisterForm>,
) -> ApiResult<Response> {
    form.username = form.username.trim().to_string();
    form.email = form.email.trim().to_lowercase();

    if !is_valid_username(&form.username) {
        warn!(username = %form.username, "invalid username");
        return Ok(register_error(
            StatusCode::BAD_REQUEST,
            "Username must be 3-32 letters, digits, '.', '-' or '_'",
            form,
        ));
    }
    if !is_valid_email(&form.email) {
        warn!(email = %form.email, "invalid email");
        return Ok(register_error(StatusCode::BAD_REQUEST, "Invalid email", form));
    }
    if let Err(msg) = check_new_password(&form.password, &form.confirm_password) {
        return Ok(register_error(StatusCode::BAD_REQUEST, msg, form));
    }

    if User::exists(&state.db, &form.username, &form.email).await? {
        warn!(username = %form.username, email = %form.email, "user already exists");
        return Ok(register_error(StatusCode::CONFLICT, "User already exists", form));
    }

    let hash = hash_password(&form.password)?;
    let user = User::create(&state.db, &form.username, &form.email, &hash).await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(Redirect::to("/login?notice=registered").into_response())
}

pub async fn login_page(Query(q): Query<NoticeQuery>) -> Response {
    render(&LoginPage {
        notice: notice_message(q.notice.as_deref()),
        ..Default::default()
    })
}

#[instrument(skip(state, jar, form))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    let identifier = form.username.trim().to_string();
    let invalid = |identifier: String| {
        render_with_status(
            StatusCode::UNAUTHORIZED,
            &LoginPage {
                error: Some("Invalid credentials".into()),
                notice: None,
                username: identifier,
            },
        )
    };

    let Some(user) = User::find_by_login(&state.db, &identifier).await? else {
        warn!(identifier = %identifier, "login unknown user");
        return Ok(invalid(identifier));
    };

    if !verify_password(&form.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Ok(invalid(identifier));
    }

    User::touch_last_login(&state.db, user.id).await?;

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(user.id, user.session_version)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok((
        jar.add(keys.session_cookie(token)),
        Redirect::to("/dashboard"),
    )
        .into_response())
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(removal_cookie()),
        Redirect::to("/login?notice=logged_out"),
    )
}

pub async fn forgot_password_page(Query(q): Query<NoticeQuery>) -> Response {
    render(&ForgotPasswordPage {
        error: None,
        notice: notice_message(q.notice.as_deref()),
    })
}

/// Issues a reset link and prints it to the server log. The response is the
/// same whether or not the email is registered.
#[instrument(skip(state, form))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Form(form): Form<ForgotPasswordForm>,
) -> ApiResult<Response> {
    let email = form.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Ok(render_with_status(
            StatusCode::BAD_REQUEST,
            &ForgotPasswordPage {
                error: Some("Invalid email".into()),
                notice: None,
            },
        ));
    }

    match User::find_by_email(&state.db, &email).await? {
        Some(user) => {
            let (raw, digest) = generate_reset_token();
            let expires_at = OffsetDateTime::now_utc()
                + TimeDuration::minutes(state.config.reset_token_ttl_minutes);
            PasswordResetToken::create(&state.db, user.id, &digest, expires_at).await?;

            let link = format!("{}/reset-password/{}", state.config.public_base_url, raw);
            info!(user_id = %user.id, email = %user.email, %link, "password reset link issued");
        }
        None => warn!(email = %email, "password reset for unknown email"),
    }

    Ok(Redirect::to("/forgot-password?notice=reset_sent").into_response())
}

async fn active_token(state: &AppState, raw: &str) -> ApiResult<Option<PasswordResetToken>> {
    let token = PasswordResetToken::find_by_hash(&state.db, &hash_reset_token(raw)).await?;
    Ok(token.filter(|t| t.is_active(OffsetDateTime::now_utc())))
}

fn reset_page(status: StatusCode, token: String, error: Option<&str>, valid: bool) -> Response {
    render_with_status(
        status,
        &ResetPasswordPage {
            token,
            error: error.map(str::to_owned),
            valid,
        },
    )
}

#[instrument(skip(state, token))]
pub async fn reset_password_page(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Response> {
    Ok(match active_token(&state, &token).await? {
        Some(_) => reset_page(StatusCode::OK, token, None, true),
        None => reset_page(
            StatusCode::BAD_REQUEST,
            token,
            Some("This reset link is invalid or has expired."),
            false,
        ),
    })
}

#[instrument(skip(state, token, form))]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Form(form): Form<ResetPasswordForm>,
) -> ApiResult<Response> {
    let Some(reset) = active_token(&state, &token).await? else {
        return Ok(reset_page(
            StatusCode::BAD_REQUEST,
            token,
            Some("This reset link is invalid or has expired."),
            false,
        ));
    };

    if let Err(msg) = check_new_password(&form.password, &form.confirm_password) {
        return Ok(reset_page(StatusCode::BAD_REQUEST, token, Some(msg), true));
    }

    let hash = hash_password(&form.password)?;
    if !PasswordResetToken::consume(&state.db, reset.id, reset.user_id, &hash).await? {
        return Ok(reset_page(
            StatusCode::BAD_REQUEST,
            token,
            Some("This reset link is invalid or has expired."),
            false,
        ));
    }

    info!(user_id = %reset.user_id, "password reset");
    Ok(Redirect::to("/login?notice=password_reset").into_response())
}

fn settings_error(status: StatusCode, user: User, msg: &str) -> Response {
    render_with_status(
        status,
        &SettingsPage {
            username: user.username,
            email: user.email,
            error: Some(msg.into()),
            notice: None,
        },
    )
}

/// Changing the password signs out every other session; the caller gets a
/// fresh cookie.
#[instrument(skip(state, jar, user, form), fields(user_id = %user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    jar: CookieJar,
    SessionUser(user): SessionUser,
    Form(form): Form<ChangePasswordForm>,
) -> ApiResult<Response> {
    let user_id = user.id;

    if !verify_password(&form.current_password, &user.password_hash)? {
        warn!(%user_id, "change password with wrong current password");
        return Ok(settings_error(
            StatusCode::UNAUTHORIZED,
            user,
            "Current password is incorrect",
        ));
    }
    if let Err(msg) = check_new_password(&form.new_password, &form.confirm_password) {
        return Ok(settings_error(StatusCode::BAD_REQUEST, user, msg));
    }

    let hash = hash_password(&form.new_password)?;
    let version = User::update_password(&state.db, user_id, &hash).await?;

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(user_id, version)?;

    info!(%user_id, "password changed");
    Ok((
        jar.add(keys.session_cookie(token)),
        Redirect::to("/settings?notice=password_changed"),
    )
        .into_response())
}

#[instrument(skip(state, jar, user, form), fields(user_id = %user.id))]
pub async fn delete_account(
    State(state): State<AppState>,
    jar: CookieJar,
    SessionUser(user): SessionUser,
    Form(form): Form<DeleteAccountForm>,
) -> ApiResult<Response> {
    let user_id = user.id;

    if !verify_password(&form.password, &user.password_hash)? {
        warn!(%user_id, "delete account with wrong password");
        return Ok(settings_error(
            StatusCode::UNAUTHORIZED,
            user,
            "Password is incorrect",
        ));
    }

    User::delete(&state.db, user_id).await?;

    info!(%user_id, username = %user.username, "account deleted");
    Ok((
        jar.remove(removal_cookie()),
        Redirect::to("/login?notice=account_deleted"),
    )
        .into_response())
}

#[instrument(skip(user), fields(user_id = %user.id))]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        success: true,
        user: PublicUser {
            id: user.id,
            username: user.username,
            email: user.email,
        },
    })
}
