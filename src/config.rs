use std::env;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_BYTEZ_API_BASE: &str = "https://api.bytez.com/models/v2";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Token signing settings shared by the auth service and the auth middleware.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_ttl_hours: i64,
    pub refresh_ttl_days: i64,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AdminSeedConfig {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub allowed_origins: Vec<String>,
    pub bcrypt_cost: u32,
    pub jwt: JwtConfig,
    pub gateway: GatewayConfig,
    pub admin_seed: Option<AdminSeedConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let allowed_origins = get("ALLOWED_ORIGINS", "http://localhost:3000,http://127.0.0.1:3000")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let admin_seed = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(AdminSeedConfig { email, password })
            }
            _ => None,
        };

        Ok(Self {
            host: get("HOST", "0.0.0.0"),
            port: parse("PORT", &get("PORT", "3002"))?,
            database_url,
            allowed_origins,
            bcrypt_cost: parse("BCRYPT_COST", &get("BCRYPT_COST", &bcrypt::DEFAULT_COST.to_string()))?,
            jwt: JwtConfig {
                secret: jwt_secret,
                issuer: get("JWT_ISSUER", "caption-trend-service"),
                audience: get("JWT_AUDIENCE", "caption-trend-api"),
                access_ttl_hours: parse("JWT_TTL_HOURS", &get("JWT_TTL_HOURS", "24"))?,
                refresh_ttl_days: parse("REFRESH_TTL_DAYS", &get("REFRESH_TTL_DAYS", "30"))?,
            },
            gateway: GatewayConfig {
                api_key: get("BYTEZ_API_KEY", ""),
                api_base: get("BYTEZ_API_BASE", DEFAULT_BYTEZ_API_BASE)
                    .trim_end_matches('/')
                    .to_string(),
                timeout_secs: parse("BYTEZ_TIMEOUT_SECS", &get("BYTEZ_TIMEOUT_SECS", "120"))?,
            },
            admin_seed,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}
