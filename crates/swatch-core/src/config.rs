use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_STORAGE_BASE_URL: &str = "https://firebasestorage.googleapis.com";
const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";
const DEFAULT_USER_AGENT: &str = "swatch/0.1 (product-media-harvester)";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let firebase_database_url = require("FIREBASE_DATABASE_URL")?;
    let firebase_storage_bucket = require("FIREBASE_STORAGE_BUCKET")?;
    let firebase_storage_base_url = or_default("FIREBASE_STORAGE_BASE_URL", DEFAULT_STORAGE_BASE_URL);
    let firebase_auth_token = lookup("FIREBASE_AUTH_TOKEN")
        .ok()
        .filter(|t| !t.is_empty());

    let env = parse_environment(&or_default("SWATCH_ENV", "development"))?;
    let log_level = or_default("SWATCH_LOG_LEVEL", "info");
    let webdriver_url = or_default("SWATCH_WEBDRIVER_URL", DEFAULT_WEBDRIVER_URL);
    let staging_dir = PathBuf::from(or_default("SWATCH_STAGING_DIR", "./staging"));
    let media_root = or_default("SWATCH_MEDIA_ROOT", "productsImages");

    let request_timeout_secs = parse_u64("SWATCH_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("SWATCH_USER_AGENT", DEFAULT_USER_AGENT);
    let fetch_max_attempts = parse_u32("SWATCH_FETCH_MAX_ATTEMPTS", "3")?;
    let fetch_backoff_base_ms = parse_u64("SWATCH_FETCH_BACKOFF_BASE_MS", "250")?;
    let page_load_timeout_secs = parse_u64("SWATCH_PAGE_LOAD_TIMEOUT_SECS", "0")?;
    let optional_element_timeout_ms = parse_u64("SWATCH_OPTIONAL_ELEMENT_TIMEOUT_MS", "3000")?;

    Ok(AppConfig {
        env,
        log_level,
        firebase_database_url,
        firebase_storage_bucket,
        firebase_storage_base_url,
        firebase_auth_token,
        webdriver_url,
        staging_dir,
        media_root,
        request_timeout_secs,
        user_agent,
        fetch_max_attempts,
        fetch_backoff_base_ms,
        page_load_timeout_secs,
        optional_element_timeout_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SWATCH_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
