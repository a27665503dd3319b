//! Output writers.
//!
//! # Submodules
//!
//! - [`json`]: Writes each source's records to a dated JSON file

pub mod json;
