//! `/api/auth`: registration, sign-in and the caller's own account.

use super::error::{ApiError, ApiResult};
use super::extract::{CurrentUser, Params, Payload};
use super::state::AppState;
use super::views::{Message, UserView};
use crate::account::{
    domain::{ProfileChanges, User, UserSummary},
    services::RegisterRequest,
};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Routes mounted under `/api/auth`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/profile", patch(update_profile))
        .route("/users/search", get(search))
}

#[derive(Debug, Deserialize)]
struct RegisterBody {
    email: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    password: String,
    confirm_password: String,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Serialize)]
struct SessionView {
    user: UserView,
    token: String,
    expires_at: DateTime<Utc>,
    message: &'static str,
}

fn session(state: &AppState, user: &User, message: &'static str) -> ApiResult<SessionView> {
    let issued = state
        .tokens
        .issue(user.id(), state.now())
        .map_err(ApiError::internal)?;
    Ok(SessionView {
        user: UserView::from(user),
        token: issued.token,
        expires_at: issued.expires_at,
        message,
    })
}

async fn register(
    State(state): State<AppState>,
    Payload(body): Payload<RegisterBody>,
) -> ApiResult<(StatusCode, Json<SessionView>)> {
    let request = RegisterRequest::new(body.email, body.first_name, body.last_name, body.password)
        .with_confirmation(body.confirm_password);
    let user = state.accounts.register(request).await?;
    tracing::info!(user = %user.id(), "user registered");
    let view = session(&state, &user, "Registration successful")?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn login(
    State(state): State<AppState>,
    Payload(body): Payload<LoginBody>,
) -> ApiResult<Json<SessionView>> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::field(
            "non_field_errors",
            "Email and password are required.",
        ));
    }
    let user = state
        .accounts
        .authenticate(&body.email, &body.password)
        .await?;
    Ok(Json(session(&state, &user, "Login successful")?))
}

/// Tokens are stateless, so signing out only confirms the request.
async fn logout(CurrentUser(user): CurrentUser) -> Json<Message> {
    tracing::debug!(user = %user.id(), "user signed out");
    Json(Message::new("Logged out successfully"))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserView> {
    Json(UserView::from(&user))
}

async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Payload(changes): Payload<ProfileChanges>,
) -> ApiResult<Json<UserView>> {
    let updated = state.accounts.update_profile(user.id(), changes).await?;
    Ok(Json(UserView::from(&updated)))
}

async fn search(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Params(params): Params<SearchParams>,
) -> ApiResult<Json<Vec<UserSummary>>> {
    Ok(Json(state.accounts.search(user.id(), &params.q).await?))
}
