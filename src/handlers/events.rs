use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;

use crate::handlers::RequestZone;
use crate::models::EventPayload;
use crate::utils::response::no_content;
use crate::utils::{AppError, AppResult};
use crate::AppState;

/// POST /events
pub async fn create_event(
    State(state): State<AppState>,
    RequestZone(zone): RequestZone,
    body: Result<Json<EventPayload>, JsonRejection>,
) -> AppResult<Json<EventPayload>> {
    let payload = json_body(body)?;
    let created = state.events.create(&payload, &zone).await?;
    Ok(Json(created))
}

/// GET /events
pub async fn list_events(
    State(state): State<AppState>,
    RequestZone(zone): RequestZone,
) -> AppResult<Json<Vec<EventPayload>>> {
    Ok(Json(state.events.list(&zone).await?))
}

/// GET /events/:id
pub async fn get_event(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    RequestZone(zone): RequestZone,
) -> AppResult<Json<EventPayload>> {
    let id = event_id(id)?;
    Ok(Json(state.events.get_by_id(id, &zone).await?))
}

/// PUT /events/:id
pub async fn update_event(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    RequestZone(zone): RequestZone,
    body: Result<Json<EventPayload>, JsonRejection>,
) -> AppResult<Json<EventPayload>> {
    let id = event_id(id)?;
    let payload = json_body(body)?;
    Ok(Json(state.events.update(id, &payload, &zone).await?))
}

/// DELETE /events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Response> {
    state.events.delete(event_id(id)?).await?;
    Ok(no_content())
}

fn event_id(path: Result<Path<i64>, PathRejection>) -> AppResult<i64> {
    path.map(|Path(id)| id)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

fn json_body(body: Result<Json<EventPayload>, JsonRejection>) -> AppResult<EventPayload> {
    body.map(|Json(payload)| payload)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}
