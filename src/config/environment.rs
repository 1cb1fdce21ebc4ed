use std::env;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

pub const IN_MEMORY_DATABASE_URL: &str = "sqlite::memory:";

/// Credentials used by the `create-admin` command and `SEED_ADMIN`.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Environment configuration
/// Loads and validates environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
    pub log_level: String,
    pub debug: bool,
    pub host: String,
    pub port: u16,
    pub rate_limit_per_minute: u32,
    pub seed_admin: bool,
    pub admin: AdminSeed,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let debug = parse_or("DEBUG", false)?;

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| IN_MEMORY_DATABASE_URL.to_string());

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }

        let access_token_expire_minutes = parse_or("ACCESS_TOKEN_EXPIRE_MINUTES", 30i64)?;
        if access_token_expire_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "ACCESS_TOKEN_EXPIRE_MINUTES",
                value: access_token_expire_minutes.to_string(),
            });
        }

        let refresh_token_expire_days = parse_or("REFRESH_TOKEN_EXPIRE_DAYS", 7i64)?;
        if refresh_token_expire_days <= 0 {
            return Err(ConfigError::Invalid {
                key: "REFRESH_TOKEN_EXPIRE_DAYS",
                value: refresh_token_expire_days.to_string(),
            });
        }

        let rate_limit_per_minute = parse_or("RATE_LIMIT_PER_MINUTE", 120u32)?;
        if rate_limit_per_minute == 0 {
            return Err(ConfigError::Invalid {
                key: "RATE_LIMIT_PER_MINUTE",
                value: "0".to_string(),
            });
        }

        let default_level = if debug { "debug" } else { "info" };

        Ok(Self {
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "api-scaffold".to_string()),
            database_url,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10u32)?,
            jwt_secret,
            access_token_expire_minutes,
            refresh_token_expire_days,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| default_level.to_string()),
            debug,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PORT", 3000u16)?,
            rate_limit_per_minute,
            seed_admin: parse_or("SEED_ADMIN", false)?,
            admin: AdminSeed {
                username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
                email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string()),
                password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "Admin123!".to_string()),
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            parse_value(raw.trim()).ok_or(ConfigError::Invalid { key, value: raw })
        }
        _ => Ok(default),
    }
}

/// Accepts `1/0`, `yes/no` and `on/off` for booleans in addition to `true/false`.
fn parse_value<T: FromStr>(raw: &str) -> Option<T> {
    if let Ok(value) = raw.parse::<T>() {
        return Some(value);
    }
    let normalized = match raw.to_ascii_lowercase().as_str() {
        "1" | "yes" | "on" => "true",
        "0" | "no" | "off" => "false",
        _ => return None,
    };
    normalized.parse::<T>().ok()
}
