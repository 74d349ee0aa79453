use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::api::response::ApiResult;
use crate::api::AppState;
use crate::middleware::AuthUser;
use crate::models::account::{ChangePassword, ForgotPassword, Login, RegisterAccount, ResetPassword};

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterAccount>,
) -> ApiResult<impl IntoResponse> {
    let account = state.accounts.register(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Registered successfully!", "account": account})),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<Login>,
) -> ApiResult<impl IntoResponse> {
    let token = state.accounts.login(payload).await?;
    Ok(Json(json!(token)))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPassword>,
) -> ApiResult<impl IntoResponse> {
    state.accounts.request_password_reset(&payload.email).await?;

    Ok(Json(json!({
        "message": "If the email is registered, a reset code has been sent."
    })))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPassword>,
) -> ApiResult<impl IntoResponse> {
    state.accounts.reset_password(payload).await?;
    Ok(Json(json!({"message": "Password has been reset"})))
}

pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ChangePassword>,
) -> ApiResult<impl IntoResponse> {
    state
        .accounts
        .change_password(user.account.id, payload)
        .await?;
    Ok(Json(json!({"message": "Password updated successfully"})))
}

pub async fn me(user: AuthUser) -> impl IntoResponse {
    Json(json!(user.account))
}
