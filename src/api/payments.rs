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
use crate::models::{InitiatePayment, VerifyPayment};

pub async fn initiate_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<InitiatePayment>,
) -> ApiResult<impl IntoResponse> {
    let order = state.bookings.initiate_payment(user.caller(), payload).await?;
    Ok((StatusCode::CREATED, Json(json!({"order": order}))))
}

pub async fn verify_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<VerifyPayment>,
) -> ApiResult<impl IntoResponse> {
    let booking = state.bookings.verify_payment(user.caller(), payload).await?;

    let status = if booking.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(json!({"success": true, "booking": booking}))))
}

pub async fn event_revenue(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let revenue = state.revenue.event_revenue(user.caller(), event_id).await?;
    Ok(Json(json!(revenue)))
}

pub async fn revenue_overview(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let revenues = state.revenue.overview(user.caller()).await?;
    Ok(Json(json!({"revenues": revenues})))
}

pub async fn my_revenue(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let revenues = state.revenue.organizer_revenue(user.caller()).await?;
    Ok(Json(json!({"revenues": revenues})))
}
