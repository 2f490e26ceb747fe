//! tablegraph engine - relationship analyses
//!
//! This crate implements the checks run over a schema's relationship graph:
//! - Reference validation (missing tables/fields, self-links)
//! - Reachability (tables with no relationships)
//! - Cycle detection
//! - Issue reporting in a fixed order

pub mod references;
pub mod reachability;
pub mod cycles;
pub mod validator;

pub use cycles::Cycle;
pub use validator::{validate, Analysis};
