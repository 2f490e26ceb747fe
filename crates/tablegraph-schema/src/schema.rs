//! Schema document parsing
//!
//! A schema is an ordered list of tables, each owning an ordered list of
//! typed fields. Only `sub-table` and `link-table` fields carry relationships;
//! every other field kind is passed through untouched.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Field type tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    /// Embedded child records (`"sub-table"`)
    SubTable,

    /// Reference to records of another table (`"link-table"`)
    LinkTable,

    /// Any non-relationship kind (text, rich-text, date-only, selection, ...)
    Other(String),
}

impl FieldKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::SubTable => "sub-table",
            Self::LinkTable => "link-table",
            Self::Other(kind) => kind,
        }
    }

    /// Whether fields of this kind point at another table
    pub fn is_relationship(&self) -> bool {
        matches!(self, Self::SubTable | Self::LinkTable)
    }
}

impl From<String> for FieldKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "sub-table" => Self::SubTable,
            "link-table" => Self::LinkTable,
            _ => Self::Other(kind),
        }
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Other(kind) => kind,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared target of a relationship field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship<'a> {
    /// Name of the referenced table
    pub target_table: &'a str,

    /// Field expected on the referenced table (display/join field)
    pub target_field: Option<&'a str>,
}

/// A typed attribute of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Type tag
    #[serde(rename = "type")]
    pub kind: FieldKind,

    /// Field name (unique within its table)
    pub name: String,

    /// Target table (relationship kinds only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Target field on the target table (`link-table` only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_field: Option<String>,

    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helptext: Option<String>,

    /// Choices for selection fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    /// Unit for numeric fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Selectable units for numeric fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub units: Vec<String>,

    /// Attributes tablegraph does not interpret
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Field {
    /// Create a field with no relationship or presentation metadata
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::from(kind.into()),
            name: name.into(),
            table: None,
            link_field: None,
            label: None,
            helptext: None,
            options: Vec::new(),
            unit: None,
            units: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Create a `sub-table` field
    pub fn sub_table(name: impl Into<String>, table: impl Into<String>) -> Self {
        let mut field = Self::new("sub-table", name);
        field.table = Some(table.into());
        field
    }

    /// Create a `link-table` field
    pub fn link_table(
        name: impl Into<String>,
        table: impl Into<String>,
        link_field: Option<&str>,
    ) -> Self {
        let mut field = Self::new("link-table", name);
        field.table = Some(table.into());
        field.link_field = link_field.map(str::to_string);
        field
    }

    /// Set the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The relationship this field declares, if it is a relationship kind
    pub fn relationship(&self) -> Option<Relationship<'_>> {
        if !self.kind.is_relationship() {
            return None;
        }

        self.table.as_deref().map(|target_table| Relationship {
            target_table,
            target_field: self.link_field.as_deref(),
        })
    }
}

/// A named entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name (unique within the schema, case-sensitive)
    pub name: String,

    /// Fields in declaration order
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Find a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Relationship fields with their declared targets, in declaration order
    pub fn relationship_fields(&self) -> impl Iterator<Item = (&Field, Relationship<'_>)> {
        self.fields
            .iter()
            .filter_map(|field| field.relationship().map(|rel| (field, rel)))
    }
}

/// A complete data-model description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Tables in declaration order
    pub tables: Vec<Table>,
}

impl Schema {
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    /// Load a schema from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        Self::load(path).map(|(schema, _)| schema)
    }

    /// Load a schema from a JSON file, keeping the raw document
    pub fn load(path: &Path) -> Result<(Self, String), SchemaError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::IoError(path.display().to_string(), e.to_string()))?;

        let schema = Self::from_json(&contents)?;
        tracing::info!(
            path = %path.display(),
            tables = schema.tables.len(),
            "loaded schema"
        );
        Ok((schema, contents))
    }

    /// Parse and check a schema from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let schema: Schema = serde_json::from_str(json)
            .map_err(|e| SchemaError::ParseError(e.to_string()))?;

        schema.check()?;
        Ok(schema)
    }

    /// Reject schemas the analyses are not defined for: empty or duplicate
    /// names, and relationship fields without a target table.
    pub fn check(&self) -> Result<(), SchemaError> {
        let mut table_names = HashSet::new();

        for (position, table) in self.tables.iter().enumerate() {
            if table.name.is_empty() {
                return Err(SchemaError::EmptyTableName(position));
            }
            if !table_names.insert(table.name.as_str()) {
                return Err(SchemaError::DuplicateTable(table.name.clone()));
            }

            let mut field_names = HashSet::new();
            for (index, field) in table.fields.iter().enumerate() {
                if field.name.is_empty() {
                    return Err(SchemaError::EmptyFieldName {
                        table: table.name.clone(),
                        index,
                    });
                }
                if !field_names.insert(field.name.as_str()) {
                    return Err(SchemaError::DuplicateField {
                        table: table.name.clone(),
                        field: field.name.clone(),
                    });
                }
                if field.kind.is_relationship() && field.table.as_deref().map_or(true, str::is_empty) {
                    return Err(SchemaError::MissingTarget {
                        table: table.name.clone(),
                        field: field.name.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Find a table by name
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Table names in declaration order
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Number of relationship fields across all tables
    pub fn relationship_count(&self) -> usize {
        self.tables
            .iter()
            .map(|t| t.relationship_fields().count())
            .sum()
    }
}

/// Schema loading errors
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Failed to read schema file {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse schema JSON: {0}")]
    ParseError(String),

    #[error("Table at position {0} has an empty name")]
    EmptyTableName(usize),

    #[error("Duplicate table name \"{0}\"")]
    DuplicateTable(String),

    #[error("Field at position {index} in table \"{table}\" has an empty name")]
    EmptyFieldName { table: String, index: usize },

    #[error("Duplicate field \"{field}\" in table \"{table}\"")]
    DuplicateField { table: String, field: String },

    #[error("Relationship field \"{field}\" in table \"{table}\" does not declare a target table")]
    MissingTarget { table: String, field: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SPEAKERS: &str = r#"{
        "tables": [
            {
                "name": "User",
                "fields": [
                    { "type": "text", "name": "name", "label": "Name", "helptext": "Full name." },
                    { "type": "selection", "name": "role", "options": ["Speaker", "Attendee"] }
                ]
            },
            {
                "name": "SessionSpeaker",
                "fields": [
                    { "type": "link-table", "name": "speaker", "table": "User", "linkField": "name", "x-order": 3 }
                ]
            }
        ]
    }"#;

    #[test]
    fn parse_tables_and_fields() {
        let schema = Schema::from_json(SPEAKERS).unwrap();

        assert_eq!(schema.table_names(), vec!["User", "SessionSpeaker"]);
        assert_eq!(schema.relationship_count(), 1);

        let user = schema.table("User").unwrap();
        assert_eq!(user.field_names(), vec!["name", "role"]);
        assert_eq!(user.field("role").unwrap().options, vec!["Speaker", "Attendee"]);
        assert_eq!(user.field("name").unwrap().kind, FieldKind::Other("text".to_string()));
        assert!(user.relationship_fields().next().is_none());

        let speaker = schema.table("SessionSpeaker").unwrap().field("speaker").unwrap();
        assert_eq!(speaker.kind, FieldKind::LinkTable);
        assert_eq!(
            speaker.relationship(),
            Some(Relationship { target_table: "User", target_field: Some("name") })
        );
        // unknown attributes survive
        assert_eq!(speaker.extra.get("x-order"), Some(&serde_json::json!(3)));
    }

    #[test]
    fn field_kind_roundtrip_keeps_tag() {
        let field = Field::new("date-only", "startDate");
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "date-only");

        let sub = serde_json::to_value(Field::sub_table("sessions", "Session")).unwrap();
        assert_eq!(sub["type"], "sub-table");
        assert_eq!(sub["table"], "Session");
        assert!(sub.get("linkField").is_none());
    }

    #[test]
    fn non_relationship_field_with_table_is_not_a_relationship() {
        let mut field = Field::new("text", "notes");
        field.table = Some("Elsewhere".to_string());
        assert!(field.relationship().is_none());
    }

    #[test]
    fn missing_fields_array_defaults_to_empty() {
        let schema = Schema::from_json(r#"{ "tables": [ { "name": "Empty" } ] }"#).unwrap();
        assert!(schema.tables[0].fields.is_empty());
    }

    #[test]
    fn reject_duplicate_table() {
        let err = Schema::from_json(
            r#"{ "tables": [ { "name": "A", "fields": [] }, { "name": "A", "fields": [] } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateTable(name) if name == "A"));
    }

    #[test]
    fn reject_duplicate_field() {
        let err = Schema::from_json(
            r#"{ "tables": [ { "name": "A", "fields": [
                { "type": "text", "name": "x" },
                { "type": "number", "name": "x" }
            ] } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { table, field } if table == "A" && field == "x"));
    }

    #[test]
    fn reject_relationship_without_target() {
        let err = Schema::from_json(
            r#"{ "tables": [ { "name": "A", "fields": [ { "type": "sub-table", "name": "children" } ] } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::MissingTarget { .. }));
    }

    #[test]
    fn reject_empty_names() {
        let err = Schema::from_json(r#"{ "tables": [ { "name": "", "fields": [] } ] }"#).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyTableName(0)));

        let err = Schema::from_json(
            r#"{ "tables": [ { "name": "A", "fields": [ { "type": "text", "name": "" } ] } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::EmptyFieldName { index: 0, .. }));
    }

    #[test]
    fn reject_malformed_json() {
        assert!(matches!(Schema::from_json("{ \"tables\": 3 }"), Err(SchemaError::ParseError(_))));
        assert!(matches!(Schema::from_json("{}"), Err(SchemaError::ParseError(_))));
    }

    #[test]
    fn from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");

        let err = Schema::from_file(&missing).unwrap_err();
        assert!(err.to_string().contains("missing.json"));

        let path = dir.path().join("schema.json");
        std::fs::write(&path, SPEAKERS).unwrap();
        assert_eq!(Schema::from_file(&path).unwrap().tables.len(), 2);
    }

    #[test]
    fn load_keeps_raw_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, SPEAKERS).unwrap();

        let (schema, contents) = Schema::load(&path).unwrap();
        assert_eq!(contents, SPEAKERS);
        assert_eq!(schema, Schema::from_json(SPEAKERS).unwrap());
    }

    #[test]
    fn builder_matches_parsed() {
        let built = Schema::new(vec![
            Table::new("User").with_field(Field::new("text", "name")),
            Table::new("SessionSpeaker")
                .with_field(Field::link_table("speaker", "User", Some("name"))),
        ]);

        assert!(built.check().is_ok());
        assert_eq!(built.relationship_count(), 1);
    }
}
