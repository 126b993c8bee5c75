use axum::{
    extract::Query,
    response::{Redirect, Response},
};
use tracing::instrument;

use super::{
    notice_message, render,
    templates::{DashboardPage, ProfilePage, SettingsPage},
};
use crate::{
    auth::{dto::NoticeQuery, extractors::SessionUser},
    format,
};

pub async fn index(session: Option<SessionUser>) -> Redirect {
    match session {
        Some(_) => Redirect::to("/dashboard"),
        None => Redirect::to("/login"),
    }
}

#[instrument(skip(user), fields(user_id = %user.id))]
pub async fn dashboard(SessionUser(user): SessionUser) -> Response {
    render(&DashboardPage {
        username: user.username,
    })
}

#[instrument(skip(user), fields(user_id = %user.id))]
pub async fn profile(SessionUser(user): SessionUser) -> Response {
    render(&ProfilePage {
        username: user.username,
        email: user.email,
        member_since: format::datetime(user.created_at),
        last_login: format::optional_datetime(user.last_login),
    })
}

#[instrument(skip(user), fields(user_id = %user.id))]
pub async fn settings(SessionUser(user): SessionUser, Query(q): Query<NoticeQuery>) -> Response {
    render(&SettingsPage {
        username: user.username,
        email: user.email,
        error: None,
        notice: notice_message(q.notice.as_deref()),
    })
}
