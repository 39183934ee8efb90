//! Core business logic for scadex.
//!
//! # Modules
//!
//! - [`source`] - Loading the geometry description file
//! - [`scan`] - Marker scanning and the statement tokenizer
//! - [`includes`] - Include/use directive collection
//! - [`unit`] - Compilation unit synthesis into temp files
//! - [`export`] - Renderer processes, reporting, and run coordination
//!
//! # Export Workflow
//!
//! 1. **Load**: read the source file once
//! 2. **Discover**: scan marker lines, or take the `--modules` list
//! 3. **Synthesize**: one temp compilation unit per task
//! 4. **Launch**: one renderer per unit, all concurrently
//! 5. **Report** (blocking) or **settle** (detached): wait, delete each
//!    unit as its own process exits

pub mod export;
pub mod includes;
pub mod scan;
pub mod source;
pub mod unit;
