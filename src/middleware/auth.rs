use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

use crate::api::response::ApiError;
use crate::api::AppState;
use crate::error::AppError;
use crate::models::{Account, Caller};
use crate::repositories::AccountRepository;

/// Bearer-token authentication. The account is reloaded on every request so
/// deleted accounts and role changes take effect before the token expires.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account: Account,
}

impl AuthUser {
    pub fn caller(&self) -> Caller {
        self.account.caller()
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            AppError::Unauthorized("Unauthorized: No token provided".to_string())
        })?;

        let claims = state.accounts.tokens().validate(token).map_err(|err| {
            debug!("Rejected token: {}", err);
            AppError::Unauthorized("Invalid token".to_string())
        })?;

        let account_id = claims
            .account_id()
            .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

        let account = AccountRepository::new(&state.pool)
            .find_by_id(account_id)
            .await
            .map_err(AppError::Internal)?
            .ok_or_else(|| AppError::Unauthorized("Unauthorized: User not found".to_string()))?;

        Ok(Self { account })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&parts_with(Some("abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&parts_with(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts_with(None)), None);
    }
}
