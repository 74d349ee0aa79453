use anyhow::{anyhow, Context, Result};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub key_id: String,
    pub key_secret: String,
    pub base_url: String,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,

    pub jwt_secret: String,
    pub jwt_ttl_minutes: i64,

    pub payment: PaymentConfig,

    /// `None` writes outgoing mail to the log instead of sending it.
    pub smtp: Option<SmtpConfig>,

    pub otp_ttl_minutes: i64,
    pub allow_admin_signup: bool,
    pub notification_max_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("{} must be set", key))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let smtp = match lookup("SMTP_HOST").filter(|v| !v.trim().is_empty()) {
            Some(host) => Some(SmtpConfig {
                host,
                port: parse(&lookup, "SMTP_PORT", 587)?,
                username: required("SMTP_USERNAME")?,
                password: required("SMTP_PASSWORD")?,
                from: required("SMTP_FROM")?,
            }),
            None => None,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parse(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            host: or_default("HOST", "0.0.0.0"),
            port: parse(&lookup, "PORT", 5000)?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_ttl_minutes: parse(&lookup, "JWT_TTL_MINUTES", 60)?,
            payment: PaymentConfig {
                key_id: required("RAZORPAY_KEY_ID")?,
                key_secret: required("RAZORPAY_KEY_SECRET")?,
                base_url: or_default("RAZORPAY_BASE_URL", "https://api.razorpay.com"),
                currency: or_default("PAYMENT_CURRENCY", "INR"),
            },
            smtp,
            otp_ttl_minutes: parse(&lookup, "OTP_TTL_MINUTES", 10)?,
            allow_admin_signup: parse(&lookup, "ALLOW_ADMIN_SIGNUP", false)?,
            notification_max_attempts: parse(&lookup, "NOTIFICATION_MAX_ATTEMPTS", 3)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: '{}'", key, raw)),
        None => Ok(default),
    }
}
