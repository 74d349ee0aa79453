use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::api::response::ApiResult;
use crate::api::AppState;
use crate::middleware::AuthUser;
use crate::models::booking::CheckIn;

pub async fn my_bookings(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let bookings = state.bookings.attendee_bookings(user.caller()).await?;
    Ok(Json(json!({"bookings": bookings})))
}

pub async fn organizer_bookings(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let events = state.bookings.organizer_booking_counts(user.caller()).await?;
    Ok(Json(json!({"events": events})))
}

pub async fn check_in(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CheckIn>,
) -> ApiResult<impl IntoResponse> {
    let confirmation = state
        .bookings
        .check_in(user.caller(), &payload.ticket_id)
        .await?;

    Ok(Json(json!({
        "message": "Check-in successful!",
        "check_in": confirmation
    })))
}
