//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::ScadexConfig;
use crate::domain::errors::ScadexError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Config file picked up from the current directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "scadex.toml";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ScadexConfig
/// 4. Applies environment variable overrides (SCADEX_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use scadex::config::loader::load_config;
///
/// let config = load_config("scadex.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ScadexConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ScadexError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ScadexError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: ScadexConfig = toml::from_str(&contents)?;
    apply_env_overrides(&mut config)?;
    finish(config)
}

/// Loads `path` if given, else `scadex.toml` in the current directory if it
/// exists, else built-in defaults
///
/// Environment overrides apply in every case.
pub fn load_or_default(path: Option<&Path>) -> Result<ScadexConfig> {
    if let Some(path) = path {
        return load_config(path);
    }

    let local = Path::new(DEFAULT_CONFIG_FILE);
    if local.is_file() {
        tracing::debug!(path = DEFAULT_CONFIG_FILE, "Using config file from current directory");
        return load_config(local);
    }

    let mut config = ScadexConfig::default();
    apply_env_overrides(&mut config)?;
    finish(config)
}

fn finish(config: ScadexConfig) -> Result<ScadexConfig> {
    config.validate().map_err(|e| {
        ScadexError::Configuration(format!("Configuration validation failed: {}", e))
    })?;
    Ok(config)
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is valid"))
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

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
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ScadexError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    value.parse().map_err(|_| {
        ScadexError::Configuration(format!("{name} must be true or false, got '{value}'"))
    })
}

/// Applies environment variable overrides using SCADEX_* prefix
///
/// Environment variables follow the pattern: SCADEX_<SECTION>_<KEY>
/// For example: SCADEX_RENDERER_PROGRAM, SCADEX_EXPORT_FTYPE
fn apply_env_overrides(config: &mut ScadexConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("SCADEX_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Renderer overrides
    if let Ok(val) = std::env::var("SCADEX_RENDERER_PROGRAM") {
        config.renderer.program = val;
    }
    if let Ok(val) = std::env::var("SCADEX_RENDERER_SEARCH_PATH_VAR") {
        config.renderer.search_path_var = val;
    }

    // Export overrides
    if let Ok(val) = std::env::var("SCADEX_EXPORT_FTYPE") {
        config.export.ftype = val;
    }
    if let Ok(val) = std::env::var("SCADEX_EXPORT_PREFIX") {
        config.export.prefix = val;
    }
    if let Ok(val) = std::env::var("SCADEX_EXPORT_SUFFIX") {
        config.export.suffix = val;
    }
    if let Ok(val) = std::env::var("SCADEX_EXPORT_MARKER") {
        config.export.marker = val;
    }
    if let Ok(val) = std::env::var("SCADEX_EXPORT_BLOCK") {
        config.export.block = parse_bool("SCADEX_EXPORT_BLOCK", &val)?;
    }
    if let Ok(val) = std::env::var("SCADEX_EXPORT_OUTPUT_DIR") {
        config.export.output_dir = Some(val);
    }
    if let Ok(val) = std::env::var("SCADEX_EXPORT_TEMP_DIR") {
        config.export.temp_dir = Some(val);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("SCADEX_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_bool("SCADEX_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("SCADEX_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("SCADEX_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
