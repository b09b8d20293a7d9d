use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = match lookup("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            let port = or_default("POSTGRES_PORT", "5432")
                .parse::<u16>()
                .map_err(|e| invalid("POSTGRES_PORT", e.to_string()))?;
            postgres_url(
                &or_default("POSTGRES_HOST", "localhost"),
                port,
                &or_default("POSTGRES_DATABASE", "creato_db"),
                &or_default("POSTGRES_USERNAME", "postgres"),
                &or_default("POSTGRES_PASSWORD", "postgres"),
            )
        }
    };

    let env = parse_environment(&or_default("CATSEED_ENV", "development"))?;
    let log_level = or_default("CATSEED_LOG_LEVEL", "info");
    let categories_path = PathBuf::from(or_default(
        "CATSEED_CATEGORIES_PATH",
        "./data/categories.json",
    ));

    let category_batch_size = parse_usize("CATSEED_CATEGORY_BATCH_SIZE", "1000")?;
    if category_batch_size == 0 {
        return Err(invalid(
            "CATSEED_CATEGORY_BATCH_SIZE",
            "must be greater than zero".to_string(),
        ));
    }
    let ai_category_limit = parse_u32("CATSEED_AI_CATEGORY_LIMIT", "10")?;

    let openai_api_key = lookup("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
    let openai_base_url = or_default("OPENAI_BASE_URL", "https://api.openai.com/v1");
    let openai_model = or_default("OPENAI_MODEL", "gpt-4o-mini");

    let ai_temperature = or_default("CATSEED_AI_TEMPERATURE", "0.2")
        .parse::<f32>()
        .map_err(|e| invalid("CATSEED_AI_TEMPERATURE", e.to_string()))?;
    if !(0.0..=2.0).contains(&ai_temperature) {
        return Err(invalid(
            "CATSEED_AI_TEMPERATURE",
            format!("{ai_temperature} is outside 0.0..=2.0"),
        ));
    }
    let ai_request_timeout_secs = parse_u64("CATSEED_AI_REQUEST_TIMEOUT_SECS", "60")?;
    let ai_max_retries = parse_u32("CATSEED_AI_MAX_RETRIES", "3")?;
    let ai_retry_backoff_base_ms = parse_u64("CATSEED_AI_RETRY_BACKOFF_BASE_MS", "1000")?;

    let db_max_connections = parse_u32("CATSEED_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("CATSEED_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("CATSEED_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        categories_path,
        category_batch_size,
        ai_category_limit,
        openai_api_key,
        openai_base_url,
        openai_model,
        ai_temperature,
        ai_request_timeout_secs,
        ai_max_retries,
        ai_retry_backoff_base_ms,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Assemble a Postgres connection URL from its discrete parts.
///
/// User and password are percent-encoded so credentials containing `@`, `:`
/// or `/` survive the round trip.
fn postgres_url(host: &str, port: u16, database: &str, user: &str, password: &str) -> String {
    let user = utf8_percent_encode(user, NON_ALPHANUMERIC);
    let password = utf8_percent_encode(password, NON_ALPHANUMERIC);
    format!("postgres://{user}:{password}@{host}:{port}/{database}")
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CATSEED_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
