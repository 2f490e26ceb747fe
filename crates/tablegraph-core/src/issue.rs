//! Issue codes and structured findings
//!
//! IMPORTANT: Issue codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Issue code registry (v1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    // Reference checks
    /// A relationship field points at a table that is not declared
    MissingTable,

    /// A link field names a display/join field the target table lacks
    MissingField,

    /// A relationship field points back at its own table
    SelfLink,

    // Topology checks
    /// A table never takes part in a multi-table relationship
    IsolatedTable,

    /// A directed cycle exists between tables
    CycleDetected,
}

impl IssueCode {
    /// All codes, in reporting order
    pub const ALL: [IssueCode; 5] = [
        Self::MissingTable,
        Self::MissingField,
        Self::SelfLink,
        Self::IsolatedTable,
        Self::CycleDetected,
    ];

    /// Get the issue code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingTable => "MISSING_TABLE",
            Self::MissingField => "MISSING_FIELD",
            Self::SelfLink => "SELF_LINK",
            Self::IsolatedTable => "ISOLATED_TABLE",
            Self::CycleDetected => "CYCLE_DETECTED",
        }
    }

    /// Level an issue with this code is reported at before any overrides
    pub fn default_level(&self) -> Level {
        match self {
            Self::IsolatedTable => Level::Warning,
            _ => Level::Error,
        }
    }

    /// Parse a stable string identifier back into a code
    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Issue level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Informational - does not block use of the schema
    Warning,

    /// Schema defect that should block downstream use
    Error,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A reported finding about the schema's relationship structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Stable issue code
    pub code: IssueCode,

    /// Level
    pub level: Level,

    /// Human-readable message naming the offending table/field
    pub message: String,

    /// Table the issue was found on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Relationship field the issue was found on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Table names along a cycle
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
}

impl Issue {
    /// Create an issue at the code's default level
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            level: code.default_level(),
            message: message.into(),
            table: None,
            field: None,
            path: Vec::new(),
        }
    }

    /// Set the table
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Set the field
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Set the cycle path
    pub fn with_path(mut self, path: Vec<String>) -> Self {
        self.path = path;
        self
    }

    /// Override the level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == Level::Warning
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.code, self.message)
    }
}
