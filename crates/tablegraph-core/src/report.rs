//! Report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use crate::issue::{Issue, Level};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total number of issues
    pub total: usize,

    /// Number of errors
    pub errors: usize,

    /// Number of warnings
    pub warnings: usize,

    /// Number of tables in the validated schema
    pub tables_checked: usize,

    /// Number of relationship fields in the validated schema
    pub relationships_checked: usize,
}

/// Validation report (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Where the validated schema came from (file path, fixture name, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// SHA-256 of the raw schema document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    /// Summary statistics
    pub summary: ReportSummary,

    /// All issues, in reporting order
    pub issues: Vec<Issue>,
}

impl Report {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            source: None,
            fingerprint: None,
            summary: ReportSummary::default(),
            issues: Vec::new(),
        }
    }

    /// Create a report from issues, keeping their order
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        let mut report = Self::new();
        for issue in issues {
            report.add_issue(issue);
        }
        report
    }

    /// Add an issue to the report
    pub fn add_issue(&mut self, issue: Issue) {
        match issue.level {
            Level::Error => self.summary.errors += 1,
            Level::Warning => self.summary.warnings += 1,
        }

        self.summary.total += 1;
        self.issues.push(issue);
    }

    /// Set the source description
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the schema fingerprint
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    /// Record how much of the schema was checked
    pub fn with_counts(mut self, tables: usize, relationships: usize) -> Self {
        self.summary.tables_checked = tables;
        self.summary.relationships_checked = relationships;
        self
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    /// Check if the report has any warnings
    pub fn has_warnings(&self) -> bool {
        self.summary.warnings > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase hex SHA-256 of a schema document
pub fn fingerprint(contents: &[u8]) -> String {
    hex::encode(Sha256::digest(contents))
}
