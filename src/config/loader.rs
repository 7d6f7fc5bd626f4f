//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::StarsyncConfig;
use super::secret::secret_string;
use crate::domain::errors::StarsyncError;
use crate::domain::result::Result;
use crate::domain::SyncTable;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into StarsyncConfig
/// 4. Applies environment variable overrides (STARSYNC_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`StarsyncError::Configuration`] if the file cannot be read or
/// parsed, a referenced environment variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use starsync::config::loader::load_config;
///
/// let config = load_config("starsync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<StarsyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(StarsyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        StarsyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text, with substitution, overrides and validation
pub fn parse_config(contents: &str) -> Result<StarsyncConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: StarsyncConfig = toml::from_str(&contents)
        .map_err(|e| StarsyncError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        StarsyncError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched. Every missing variable is reported
/// in a single error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| StarsyncError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(StarsyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Parses an override value, naming the variable on failure
fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| {
        StarsyncError::Configuration(format!("Invalid value '{value}' for {name}: {e}"))
    })
}

/// Applies environment variable overrides using STARSYNC_* prefix
///
/// Environment variables follow the pattern: STARSYNC_<SECTION>_<KEY>
/// For example: STARSYNC_TARGET_MAX_CONNECTIONS, STARSYNC_SYNC_TABLES
fn apply_env_overrides(config: &mut StarsyncConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    // Application overrides
    if let Some(val) = var("STARSYNC_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = var("STARSYNC_APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_override("STARSYNC_APPLICATION_DRY_RUN", &val)?;
    }

    // Source overrides
    if let Some(val) = var("STARSYNC_SOURCE_CONNECTION_STRING") {
        config.source.connection_string = secret_string(val);
    }
    if let Some(val) = var("STARSYNC_SOURCE_CONNECTION_TIMEOUT_SECONDS") {
        config.source.connection_timeout_seconds =
            parse_override("STARSYNC_SOURCE_CONNECTION_TIMEOUT_SECONDS", &val)?;
    }

    // Target overrides
    if let Some(val) = var("STARSYNC_TARGET_CONNECTION_STRING") {
        config.target.connection_string = secret_string(val);
    }
    if let Some(val) = var("STARSYNC_TARGET_MAX_CONNECTIONS") {
        config.target.max_connections = parse_override("STARSYNC_TARGET_MAX_CONNECTIONS", &val)?;
    }
    if let Some(val) = var("STARSYNC_TARGET_CONNECTION_TIMEOUT_SECONDS") {
        config.target.connection_timeout_seconds =
            parse_override("STARSYNC_TARGET_CONNECTION_TIMEOUT_SECONDS", &val)?;
    }
    if let Some(val) = var("STARSYNC_TARGET_STATEMENT_TIMEOUT_SECONDS") {
        config.target.statement_timeout_seconds =
            parse_override("STARSYNC_TARGET_STATEMENT_TIMEOUT_SECONDS", &val)?;
    }

    // Sync overrides
    if let Some(val) = var("STARSYNC_SYNC_WATERMARK_DEFAULT") {
        config.sync.watermark_default = parse_override("STARSYNC_SYNC_WATERMARK_DEFAULT", &val)?;
    }
    if let Some(val) = var("STARSYNC_SYNC_TABLES") {
        config.sync.tables = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| parse_override::<SyncTable>("STARSYNC_SYNC_TABLES", s))
            .collect::<Result<Vec<_>>>()?;
    }

    // Calendar overrides
    if let Some(val) = var("STARSYNC_CALENDAR_START_DATE") {
        config.calendar.start_date = parse_override("STARSYNC_CALENDAR_START_DATE", &val)?;
    }
    if let Some(val) = var("STARSYNC_CALENDAR_END_DATE") {
        config.calendar.end_date = parse_override("STARSYNC_CALENDAR_END_DATE", &val)?;
    }

    // Validation overrides
    if let Some(val) = var("STARSYNC_VALIDATION_AMOUNT_TOLERANCE") {
        config.validation.amount_tolerance =
            parse_override("STARSYNC_VALIDATION_AMOUNT_TOLERANCE", &val)?;
    }
    if let Some(val) = var("STARSYNC_VALIDATION_DEFAULT_DAYS") {
        config.validation.default_days = parse_override("STARSYNC_VALIDATION_DEFAULT_DAYS", &val)?;
    }

    // Logging overrides
    if let Some(val) = var("STARSYNC_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("STARSYNC_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("STARSYNC_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = var("STARSYNC_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }
    if let Some(val) = var("STARSYNC_LOGGING_JSON") {
        config.logging.json = parse_override("STARSYNC_LOGGING_JSON", &val)?;
    }

    Ok(())
}
