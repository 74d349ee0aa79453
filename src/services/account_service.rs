use chrono::{Duration, Utc};
use constant_time_eq::constant_time_eq;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::account::{
    is_valid_email, normalize_email, Account, ChangePassword, Login, PasswordResetOtp,
    RegisterAccount, ResetPassword, MAX_OTP_ATTEMPTS,
};
use crate::models::Role;
use crate::repositories::AccountRepository;
use crate::services::auth::{
    check_password_policy, digest_otp, generate_otp, hash_password, verify_password, TokenIssuer,
};
use crate::services::notifications::{Email, NotificationDispatcher};

#[derive(Debug, Serialize)]
pub struct AuthToken {
    pub token: String,
    pub role: Role,
}

#[derive(Clone)]
pub struct AccountService {
    pool: PgPool,
    tokens: TokenIssuer,
    notifications: NotificationDispatcher,
    otp_ttl_minutes: i64,
    allow_admin_signup: bool,
}

impl AccountService {
    pub fn new(
        pool: PgPool,
        tokens: TokenIssuer,
        notifications: NotificationDispatcher,
        otp_ttl_minutes: i64,
        allow_admin_signup: bool,
    ) -> Self {
        Self {
            pool,
            tokens,
            notifications,
            otp_ttl_minutes,
            allow_admin_signup,
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub async fn register(&self, payload: RegisterAccount) -> AppResult<Account> {
        if payload.name.trim().is_empty() {
            return Err(AppError::validation("Name is required"));
        }
        if !is_valid_email(&payload.email) {
            return Err(AppError::validation("Invalid email format or domain"));
        }
        check_password_policy(&payload.password).map_err(AppError::Validation)?;

        if payload.role == Role::Admin && !self.allow_admin_signup {
            return Err(AppError::forbidden("Admin accounts cannot be self-registered"));
        }

        let password_hash = hash_password(&payload.password)?;
        let account = Account::new(
            payload.name.trim().to_string(),
            payload.email,
            password_hash,
            payload.role,
        );

        let repo = AccountRepository::new(&self.pool);
        if !repo.create(&account).await? {
            return Err(AppError::Conflict("Account already exists".to_string()));
        }

        info!("Registered {} account {}", account.role, account.id);
        Ok(account)
    }

    pub async fn login(&self, payload: Login) -> AppResult<AuthToken> {
        let repo = AccountRepository::new(&self.pool);
        let email = normalize_email(&payload.email);

        let account = match repo.find_by_email(&email).await? {
            Some(account) if verify_password(&payload.password, &account.password_hash) => account,
            _ => return Err(AppError::Unauthorized("Invalid credentials".to_string())),
        };

        let token = self.tokens.issue(&account)?;
        info!("Account {} logged in", account.id);

        Ok(AuthToken {
            token,
            role: account.role,
        })
    }

    pub async fn change_password(&self, account_id: Uuid, payload: ChangePassword) -> AppResult<()> {
        let repo = AccountRepository::new(&self.pool);
        let account = repo
            .find_by_id(account_id)
            .await?
            .ok_or(AppError::NotFound("Account"))?;

        if !verify_password(&payload.old_password, &account.password_hash) {
            return Err(AppError::validation("Incorrect old password"));
        }
        if verify_password(&payload.new_password, &account.password_hash) {
            return Err(AppError::validation(
                "New password must be different from the old password",
            ));
        }
        check_password_policy(&payload.new_password).map_err(AppError::Validation)?;

        let password_hash = hash_password(&payload.new_password)?;
        repo.update_password(account.id, &password_hash).await?;

        info!("Password changed for account {}", account.id);
        Ok(())
    }

    /// Answers identically whether or not the email is registered.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        let repo = AccountRepository::new(&self.pool);
        let Some(account) = repo.find_by_email(&normalize_email(email)).await? else {
            info!("Password reset requested for unknown email");
            return Ok(());
        };

        let otp = generate_otp();
        let record = PasswordResetOtp::new(
            account.id,
            digest_otp(&otp),
            Utc::now() + Duration::minutes(self.otp_ttl_minutes),
        );
        repo.replace_reset_otp(&record).await?;

        self.notifications.dispatch(Email::password_reset_otp(
            &account.email,
            &account.name,
            &otp,
            self.otp_ttl_minutes,
        ));

        info!("Issued password reset OTP for account {}", account.id);
        Ok(())
    }

    pub async fn reset_password(&self, payload: ResetPassword) -> AppResult<()> {
        let invalid = || AppError::validation("Invalid or expired OTP");

        let repo = AccountRepository::new(&self.pool);
        let account = repo
            .find_by_email(&normalize_email(&payload.email))
            .await?
            .ok_or_else(invalid)?;

        let record = repo.find_reset_otp(account.id).await?.ok_or_else(invalid)?;
        if record.is_expired(Utc::now()) || record.is_exhausted() {
            return Err(invalid());
        }

        let submitted = digest_otp(&payload.otp);
        if !constant_time_eq(record.otp_digest.as_bytes(), submitted.as_bytes()) {
            let attempts = repo.record_failed_otp(record.id).await?;
            warn!(
                "Wrong password reset OTP submitted for account {} ({}/{})",
                account.id, attempts, MAX_OTP_ATTEMPTS
            );
            if attempts >= MAX_OTP_ATTEMPTS {
                repo.delete_reset_otps(account.id).await?;
                warn!("Burned password reset OTP for account {}", account.id);
            }
            return Err(invalid());
        }

        check_password_policy(&payload.new_password).map_err(AppError::Validation)?;
        let password_hash = hash_password(&payload.new_password)?;
        repo.reset_password(account.id, &password_hash).await?;

        info!("Password reset completed for account {}", account.id);
        Ok(())
    }
}
