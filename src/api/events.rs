use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::api::response::ApiResult;
use crate::api::AppState;
use crate::middleware::AuthUser;
use crate::models::event::{CreateEvent, UpdateEvent};

pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateEvent>,
) -> ApiResult<impl IntoResponse> {
    let event = state.events.create(user.caller(), payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Event created successfully", "event": event})),
    ))
}

pub async fn update_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<UpdateEvent>,
) -> ApiResult<impl IntoResponse> {
    let event = state.events.update(user.caller(), event_id, payload).await?;
    Ok(Json(json!({"message": "Event updated", "event": event})))
}

pub async fn delete_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.events.delete(user.caller(), event_id).await?;
    Ok(Json(json!({"message": "Event deleted"})))
}

pub async fn my_events(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let events = state.events.mine(user.caller()).await?;
    Ok(Json(json!({"events": events})))
}

pub async fn pending_events(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let events = state.events.pending(user.caller()).await?;
    Ok(Json(json!({"events": events})))
}

pub async fn all_events(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let events = state.events.all(user.caller()).await?;
    Ok(Json(json!({"events": events})))
}

pub async fn approve_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let event = state.events.approve(user.caller(), event_id).await?;
    Ok(Json(json!({"message": "Event approved", "event": event})))
}

pub async fn reject_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.events.reject(user.caller(), event_id).await?;
    Ok(Json(json!({"message": "Event rejected and removed"})))
}

pub async fn approved_events(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let events = state.events.approved().await?;
    Ok(Json(json!({"events": events})))
}

pub async fn events_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let events = state.events.by_category(&category).await?;
    Ok(Json(json!({"events": events})))
}

pub async fn past_events(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let events = state.events.past().await?;
    Ok(Json(json!({"events": events})))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let event = state.events.get(event_id).await?;
    Ok(Json(json!({"event": event})))
}
