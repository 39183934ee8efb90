// scadex - OpenSCAD batch module exporter
// Copyright (c) 2025 scadex Contributors
// Licensed under the MIT License

//! # scadex - export annotated OpenSCAD modules in parallel
//!
//! scadex reads one `.scad` file, finds every module definition or call
//! marked with a `// make me` comment, and renders each one to its own
//! output file by running one renderer process per module, all at once.
//!
//! ## Overview
//!
//! The pipeline, leaf first:
//! - **Scanning** marker lines into module tasks (or taking an explicit list)
//! - **Collecting** the file's `include <...>` / `use <...>` directives
//! - **Synthesizing** a small compilation unit per task in a temp file
//! - **Launching** one renderer per unit with a derived search path
//! - **Reporting** per-task results when asked to wait
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Scanning, unit synthesis, process orchestration, reporting
//! - [`domain`] - Core domain types and the error taxonomy
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scadex::core::export::{ExportCoordinator, ExportOptions, ExportRun};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut options = ExportOptions::new("parts.scad");
//!     options.block = true;
//!
//!     let coordinator = ExportCoordinator::new(options)?;
//!     let mut stdout = std::io::stdout();
//!     if let ExportRun::Reported(summary) = coordinator.execute_export(&mut stdout).await? {
//!         println!("{} of {} modules rendered", summary.succeeded, summary.total);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Annotations
//!
//! ```text
//! module bracket(w=20) { cube([w, 10, 2]); } // make me
//! gear(teeth=12);                            // make me
//! ```
//!
//! The first line exports `bracket()`, the second `gear(teeth=12)`.
//!
//! ## Error Handling
//!
//! Run-level failures use [`domain::ScadexError`]. A renderer exiting
//! non-zero is a per-task result, not an error.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
