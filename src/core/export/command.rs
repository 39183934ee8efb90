//! Renderer invocation
//!
//! One [`RenderCommand`] per compilation unit: program, argument vector,
//! the search path override and a working directory. Nothing goes through
//! a shell; [`RenderCommand::command_line`] is only for display.

use super::search_path::build_search_path;
use crate::core::unit::CompilationUnit;
use crate::domain::Result;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// Settings shared by every render command of a run
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Resolved renderer executable
    pub program: PathBuf,

    /// Arguments placed before the generated ones
    pub extra_args: Vec<String>,

    /// Output format, also the output file extension
    pub ftype: String,

    /// Text placed before the module name in output file names
    pub prefix: String,

    /// Text placed after the module name in output file names
    pub suffix: String,

    /// Absolute directory output files are written to
    pub output_dir: PathBuf,

    /// Environment variable carrying the search path
    pub search_path_var: String,

    /// User-supplied search path, in platform path-list form
    pub user_search_path: Option<OsString>,

    /// Directory relative user paths are resolved against
    pub cwd: PathBuf,

    /// Directory of the source file, always first on the search path
    pub source_dir: PathBuf,
}

impl RenderSettings {
    /// Output file name for a module, `{prefix}{module}{suffix}.{ftype}`
    pub fn output_file_name(&self, module: &str) -> String {
        output_file_name(&self.prefix, module, &self.suffix, &self.ftype)
    }
}

/// Composes `{prefix}{module}{suffix}.{ftype}`
pub fn output_file_name(prefix: &str, module: &str, suffix: &str, ftype: &str) -> String {
    format!("{prefix}{module}{suffix}.{ftype}")
}

/// A complete renderer invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderCommand {
    program: PathBuf,
    args: Vec<OsString>,
    env_var: String,
    env_value: OsString,
    current_dir: PathBuf,
}

impl RenderCommand {
    /// Builds the invocation for `unit`
    ///
    /// # Errors
    ///
    /// Fails if the search path cannot be assembled.
    pub fn for_unit(settings: &RenderSettings, unit: &CompilationUnit) -> Result<Self> {
        let output = settings
            .output_dir
            .join(settings.output_file_name(unit.task().name().as_str()));
        let env_value = build_search_path(
            &settings.source_dir,
            settings.user_search_path.as_deref(),
            unit.directory(),
            &settings.cwd,
        )?;

        let mut args: Vec<OsString> = settings.extra_args.iter().map(OsString::from).collect();
        args.push("-o".into());
        args.push(output.into_os_string());
        args.push(unit.path().as_os_str().to_os_string());

        Ok(Self {
            program: settings.program.clone(),
            args,
            env_var: settings.search_path_var.clone(),
            env_value,
            current_dir: unit.directory().to_path_buf(),
        })
    }

    /// Renderer executable
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Argument vector, excluding the program
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Search path variable and value set for the child only
    pub fn env(&self) -> (&str, &OsStr) {
        (&self.env_var, &self.env_value)
    }

    /// Working directory of the child
    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    /// Shell-like rendering for logs and reports
    pub fn command_line(&self) -> String {
        let mut parts = vec![format!(
            "{}={}",
            self.env_var,
            quote(&self.env_value.to_string_lossy())
        )];
        parts.push(quote(&self.program.to_string_lossy()));
        parts.extend(self.args.iter().map(|arg| quote(&arg.to_string_lossy())));
        parts.join(" ")
    }

    /// Builds the process to spawn
    pub fn to_command(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(&self.args)
            .env(&self.env_var, &self.env_value)
            .current_dir(&self.current_dir)
            .stdin(Stdio::null());
        command
    }
}

fn quote(text: &str) -> String {
    let plain = !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,+@%".contains(c));
    if plain {
        text.to_string()
    } else {
        format!("'{}'", text.replace('\'', r"'\''"))
    }
}
