//! Configuration management for scadex.
//!
//! Settings come from four places, highest precedence first: command-line
//! flags, `SCADEX_*` environment variables, a TOML file, built-in defaults.
//! The file is optional; `--config` names one explicitly, otherwise
//! `scadex.toml` in the current directory is used when present.
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [renderer]
//! program = "openscad"
//! args = ["--backend=manifold"]
//! search_path_var = "OPENSCADPATH"
//!
//! [export]
//! ftype = "stl"
//! prefix = "out_"
//! block = true
//! output_dir = "${HOME}/prints"
//!
//! [logging]
//! local_enabled = true
//! local_path = "logs"
//! local_rotation = "daily"
//! ```
//!
//! `${VAR_NAME}` references are substituted from the environment before
//! parsing; a reference to an unset variable is an error.
//!
//! ```rust,no_run
//! use scadex::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("scadex.toml")?;
//! println!("Renderer: {}", config.renderer.program);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_config, load_or_default, DEFAULT_CONFIG_FILE};
pub use schema::{ApplicationConfig, ExportConfig, LoggingConfig, RendererConfig, ScadexConfig};
