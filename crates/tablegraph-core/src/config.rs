//! Configuration schema (tablegraph.toml)

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::issue::{Issue, IssueCode, Level};
use crate::report::Report;

/// Level overrides for specific issue codes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityThreshold {
    /// Map of issue code to level override
    #[serde(default)]
    pub overrides: HashMap<String, Level>,
}

impl SeverityThreshold {
    /// Get level for an issue code, or default
    pub fn get_level(&self, code: IssueCode, default: Level) -> Level {
        self.overrides
            .get(code.as_str())
            .copied()
            .unwrap_or(default)
    }

    /// Set level override for a code
    pub fn set_override(&mut self, code: IssueCode, level: Level) {
        self.overrides.insert(code.as_str().to_string(), level);
    }
}

/// Tables exempt from specific checks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllowlistRules {
    /// Tables expected to stand alone (glob patterns)
    #[serde(default)]
    pub isolated_tables: Vec<String>,

    /// Tables allowed to reference themselves (glob patterns)
    #[serde(default)]
    pub self_links: Vec<String>,
}

impl AllowlistRules {
    /// Check if a table matches any pattern in the list
    fn matches_pattern(table: &str, patterns: &[String]) -> bool {
        patterns.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, table)
            } else {
                pattern == table
            }
        })
    }

    /// Check if a table may have no relationships
    pub fn is_isolation_allowed(&self, table: &str) -> bool {
        Self::matches_pattern(table, &self.isolated_tables)
    }

    /// Check if a table may link to itself
    pub fn is_self_link_allowed(&self, table: &str) -> bool {
        Self::matches_pattern(table, &self.self_links)
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Fail the run on warnings as well as errors
    #[serde(default)]
    pub fail_on_warnings: bool,

    /// Level overrides
    #[serde(default)]
    pub severity: SeverityThreshold,

    /// Allowlist rules
    #[serde(default)]
    pub allowlist: AllowlistRules,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(code) = config.severity.overrides.keys().find(|c| IssueCode::parse(c).is_none()) {
            return Err(ConfigError::UnknownCode(code.clone()));
        }

        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Apply allowlists and level overrides to validator output.
    ///
    /// Order of the surviving issues is unchanged. With a default config
    /// this returns its input untouched.
    pub fn apply(&self, issues: Vec<Issue>) -> Vec<Issue> {
        issues
            .into_iter()
            .filter(|issue| !self.is_allowlisted(issue))
            .map(|issue| {
                let level = self.severity.get_level(issue.code, issue.level);
                issue.with_level(level)
            })
            .collect()
    }

    fn is_allowlisted(&self, issue: &Issue) -> bool {
        let Some(table) = issue.table.as_deref() else {
            return false;
        };

        match issue.code {
            IssueCode::IsolatedTable => self.allowlist.is_isolation_allowed(table),
            IssueCode::SelfLink => self.allowlist.is_self_link_allowed(table),
            _ => false,
        }
    }

    /// Whether a report should fail the run
    pub fn should_fail(&self, report: &Report) -> bool {
        report.has_errors() || (self.fail_on_warnings && report.has_warnings())
    }
}

/// Glob matching where `*` matches any run of characters
fn glob_match(pattern: &str, text: &str) -> bool {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    Regex::new(&format!("^{}$", body))
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Unknown issue code in severity overrides: {0}")]
    UnknownCode(String),
}
