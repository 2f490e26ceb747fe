//! tablegraph core
//!
//! Stable, versioned types shared by every tablegraph crate.
//! Never rename issue codes - they are part of the public API.

pub mod issue;
pub mod report;
pub mod config;

pub use issue::{Issue, IssueCode, Level};
pub use report::{fingerprint, Report, ReportSummary, ReportVersion};
pub use config::{AllowlistRules, Config, ConfigError, SeverityThreshold};
