use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::bookings::BookingResponse;
use crate::auth;
use crate::errors::AppError;
use crate::services;
use crate::state::AppState;

// POST /api/admin/login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let token = auth::login(
        body.password.as_deref().unwrap_or(""),
        &state.config.admin_password,
        &state.config.jwt_secret,
    )?;
    Ok(Json(LoginResponse { token }))
}

// GET /api/admin/bookings
pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    auth::authorize(&headers, &state.config.jwt_secret)?;

    let bookings = services::bookings::list_bookings(&state)?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

// PATCH /api/admin/bookings/:id/status
#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    auth::authorize(&headers, &state.config.jwt_secret)?;

    let booking = services::bookings::update_status(&state, &id, body.status.as_deref())?;
    Ok(Json(booking.into()))
}

// DELETE /api/admin/bookings/:id
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth::authorize(&headers, &state.config.jwt_secret)?;

    services::bookings::delete_booking(&state, &id)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
