//! Route handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::error::ApiError;
use super::middleware::AuthUser;
use super::AppState;
use crate::auth::{check_password, issue, login_user};
use crate::models::{UpdateBody, UpdateRequest};
use crate::services::{InitialData, ParameterService, UpdateOptions};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub password: String,
    pub user: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RowQuery {
    pub tactic: String,
    pub vertical: String,
    pub segment: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub rows_updated: usize,
}

fn service(state: &AppState) -> ParameterService<'_> {
    ParameterService::new(state.store.as_ref(), &state.settings.sheets).with_options(UpdateOptions {
        strict_row_count: state.settings.strict_row_count,
    })
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Exchange the shared password for a bearer token
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(body) = body.map_err(|_| ApiError::unauthorized())?;
    check_password(&body.password, &state.settings.app_password)?;

    let user = login_user(body.user.as_deref());
    let token = issue(
        &user,
        state.settings.session_secret.as_bytes(),
        state.settings.token_ttl_secs,
    )?;
    tracing::info!(user = %user, "login");
    Ok(Json(LoginResponse { token }))
}

pub async fn initial_data(State(state): State<AppState>) -> Result<Json<InitialData>, ApiError> {
    Ok(Json(service(&state).initial_data().await?))
}

/// One row as header -> value, or `null`
pub async fn row_values(
    State(state): State<AppState>,
    Query(query): Query<RowQuery>,
) -> Result<Json<Option<Map<String, Value>>>, ApiError> {
    let row = service(&state)
        .row_values(&query.tactic, &query.vertical, &query.segment)
        .await?;
    Ok(Json(row))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    body: Result<Json<UpdateBody>, JsonRejection>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "unreadable update body");
        ApiError::invalid_payload()
    })?;
    let request = UpdateRequest::from_body(body)?;

    let summary = service(&state).update(&request, &user).await?;
    Ok(Json(UpdateResponse {
        rows_updated: summary.rows_updated,
    }))
}
