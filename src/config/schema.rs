//! Configuration schema types
//!
//! This module defines the configuration structure for scadex. Every section
//! and field is optional in the TOML file; missing values take the defaults
//! below.

use serde::{Deserialize, Serialize};

/// Main scadex configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScadexConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Renderer invocation settings
    #[serde(default)]
    pub renderer: RendererConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ScadexConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.renderer.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Renderer program, looked up on `PATH` unless it contains a separator
    #[serde(default = "default_program")]
    pub program: String,

    /// Extra arguments passed before the generated `-o <file> <unit>`
    #[serde(default)]
    pub args: Vec<String>,

    /// Environment variable the renderer reads its library path from
    #[serde(default = "default_search_path_var")]
    pub search_path_var: String,
}

impl RendererConfig {
    fn validate(&self) -> Result<(), String> {
        if self.program.trim().is_empty() {
            return Err("renderer.program cannot be empty".to_string());
        }

        if self.search_path_var.is_empty()
            || !self
                .search_path_var
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(format!(
                "Invalid renderer.search_path_var '{}'. Use letters, digits and underscores",
                self.search_path_var
            ));
        }

        Ok(())
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: Vec::new(),
            search_path_var: default_search_path_var(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output format, passed to the renderer as the file extension
    #[serde(default = "default_ftype")]
    pub ftype: String,

    /// Output file name prefix
    #[serde(default)]
    pub prefix: String,

    /// Output file name suffix
    #[serde(default)]
    pub suffix: String,

    /// Marker comment text that flags a line for export
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Wait for every renderer and print a report
    #[serde(default)]
    pub block: bool,

    /// Directory output files are written to (default: current directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,

    /// Directory compilation units are written to (default: system temp directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<String>,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.ftype.trim().is_empty() {
            return Err("export.ftype cannot be empty".to_string());
        }

        if self.ftype.contains(['/', '\\']) {
            return Err(format!(
                "Invalid export.ftype '{}'. Must not contain path separators",
                self.ftype
            ));
        }

        if self.marker.trim().is_empty() {
            return Err("export.marker cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            ftype: default_ftype(),
            prefix: String::new(),
            suffix: String::new(),
            marker: default_marker(),
            block: false,
            output_dir: None,
            temp_dir: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_program() -> String {
    "openscad".to_string()
}

fn default_search_path_var() -> String {
    "OPENSCADPATH".to_string()
}

fn default_ftype() -> String {
    "stl".to_string()
}

fn default_marker() -> String {
    "make me".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
