use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::account::{Account, PasswordResetOtp};

pub struct AccountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Returns `false` if the email is already registered.
    pub async fn create(&self, account: &Account) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO accounts (id, name, email, password_hash, role, interests, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (email) DO NOTHING"
        )
        .bind(account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role)
        .bind(&account.interests)
        .bind(account.created_at)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(account)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        Ok(account)
    }

    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE accounts SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Any earlier OTP for the account stops being valid.
    pub async fn replace_reset_otp(&self, otp: &PasswordResetOtp) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM password_reset_otps WHERE account_id = $1")
            .bind(otp.account_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO password_reset_otps (id, account_id, otp_digest, expires_at, created_at)
             VALUES ($1, $2, $3, $4, $5)"
        )
        .bind(otp.id)
        .bind(otp.account_id)
        .bind(&otp.otp_digest)
        .bind(otp.expires_at)
        .bind(otp.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    pub async fn find_reset_otp(&self, account_id: Uuid) -> Result<Option<PasswordResetOtp>> {
        let otp = sqlx::query_as::<_, PasswordResetOtp>(
            "SELECT * FROM password_reset_otps WHERE account_id = $1 ORDER BY created_at DESC LIMIT 1"
        )
        .bind(account_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(otp)
    }

    /// Counts a wrong guess and returns the updated total.
    pub async fn record_failed_otp(&self, otp_id: Uuid) -> Result<i32> {
        let (attempts,): (i32,) = sqlx::query_as(
            "UPDATE password_reset_otps SET failed_attempts = failed_attempts + 1 WHERE id = $1 RETURNING failed_attempts"
        )
        .bind(otp_id)
        .fetch_one(self.pool)
        .await?;

        Ok(attempts)
    }

    pub async fn delete_reset_otps(&self, account_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM password_reset_otps WHERE account_id = $1")
            .bind(account_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Sets the new hash and burns the account's OTPs in one transaction.
    pub async fn reset_password(&self, id: Uuid, password_hash: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE accounts SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM password_reset_otps WHERE account_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
