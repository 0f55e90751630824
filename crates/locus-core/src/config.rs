use crate::app_config::{AppConfig, Environment};
use crate::location::OutlineFormat;
use crate::ConfigError;

const DEFAULT_PLACES_BASE_URL: &str = "https://places.googleapis.com/v1";
const DEFAULT_GEOCODE_URL: &str = "https://geocode.googleapis.com/v4alpha/geocode/destinations";

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
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

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

    let parse_score = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !(0.0..=100.0).contains(&value) {
            return Err(invalid(var, format!("{value} is outside 0..=100")));
        }
        Ok(value)
    };

    let parse_flag = |var: &str, default: &str| -> Result<bool, ConfigError> {
        parse_bool(&or_default(var, default)).ok_or_else(|| {
            invalid(
                var,
                "expected one of true/false, 1/0, t/f".to_string(),
            )
        })
    };

    let google_api_key = require("GOOGLE_API_KEY")?;
    let env = parse_environment(&or_default("LOCUS_ENV", "development"))?;
    let log_level = or_default("LOCUS_LOG_LEVEL", "info");

    let places_base_url = or_default("LOCUS_PLACES_BASE_URL", DEFAULT_PLACES_BASE_URL);
    let geocode_url = or_default("LOCUS_GEOCODE_URL", DEFAULT_GEOCODE_URL);

    let request_timeout_secs = parse_u64("LOCUS_REQUEST_TIMEOUT_SECS", "30")?;
    let retry_max_attempts = parse_u32("LOCUS_RETRY_MAX_ATTEMPTS", "3")?;
    if retry_max_attempts == 0 {
        return Err(invalid(
            "LOCUS_RETRY_MAX_ATTEMPTS",
            "at least one attempt is required".to_string(),
        ));
    }
    let retry_initial_wait_secs = parse_u64("LOCUS_RETRY_INITIAL_WAIT_SECS", "5")?;
    let retry_max_wait_secs = parse_u64("LOCUS_RETRY_MAX_WAIT_SECS", "10")?;
    if retry_max_wait_secs < retry_initial_wait_secs {
        return Err(invalid(
            "LOCUS_RETRY_MAX_WAIT_SECS",
            format!("{retry_max_wait_secs} is below LOCUS_RETRY_INITIAL_WAIT_SECS"),
        ));
    }

    let location_bias_radius_m = or_default("LOCUS_LOCATION_BIAS_RADIUS_M", "50000")
        .parse::<f64>()
        .map_err(|e| invalid("LOCUS_LOCATION_BIAS_RADIUS_M", e.to_string()))?;

    let enable_autocomplete = parse_flag("LOCUS_ENABLE_AUTOCOMPLETE", "true")?;
    let autocomplete_name_threshold = parse_score("LOCUS_AUTOCOMPLETE_NAME_THRESHOLD", "85")?;
    let autocomplete_address_threshold =
        parse_score("LOCUS_AUTOCOMPLETE_ADDRESS_THRESHOLD", "85")?;
    let text_search_threshold = parse_score("LOCUS_TEXT_SEARCH_THRESHOLD", "85")?;

    let extract_outlines = parse_flag("LOCUS_EXTRACT_OUTLINES", "true")?;
    let outline_format = or_default("LOCUS_OUTLINE_FORMAT", "wkt")
        .parse::<OutlineFormat>()
        .map_err(|reason| invalid("LOCUS_OUTLINE_FORMAT", reason))?;

    let max_concurrent_entities = parse_usize("LOCUS_MAX_CONCURRENT_ENTITIES", "1")?;

    Ok(AppConfig {
        google_api_key,
        env,
        log_level,
        places_base_url,
        geocode_url,
        request_timeout_secs,
        retry_max_attempts,
        retry_initial_wait_secs,
        retry_max_wait_secs,
        location_bias_radius_m,
        enable_autocomplete,
        autocomplete_name_threshold,
        autocomplete_address_threshold,
        text_search_threshold,
        extract_outlines,
        outline_format,
        max_concurrent_entities,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LOCUS_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "t" => Some(true),
        "false" | "0" | "f" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
