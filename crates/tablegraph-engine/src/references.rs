//! Reference validation
//!
//! Walks every relationship field of the unfiltered schema and confirms its
//! declared target table (and target field, when one is named) exists.
//! Self-references are reported independently of the existence checks.

use tablegraph_core::{Issue, IssueCode};
use tablegraph_schema::{RelationshipGraph, Schema};

/// Check every relationship field, in table-then-field declaration order
pub fn check_references(schema: &Schema, graph: &RelationshipGraph) -> Vec<Issue> {
    let mut issues = Vec::new();

    for table in &schema.tables {
        for (field, rel) in table.relationship_fields() {
            let target = graph
                .index_of(rel.target_table)
                .and_then(|index| schema.tables.get(index));

            match target {
                None => issues.push(
                    Issue::new(
                        IssueCode::MissingTable,
                        format!(
                            "Table \"{}\" referenced by field \"{}\" in source table \"{}\" does not exist.",
                            rel.target_table, field.name, table.name
                        ),
                    )
                    .with_table(&table.name)
                    .with_field(&field.name),
                ),
                Some(target) => {
                    if let Some(target_field) = rel.target_field {
                        if target.field(target_field).is_none() {
                            issues.push(
                                Issue::new(
                                    IssueCode::MissingField,
                                    format!(
                                        "Field \"{}\" referenced by field \"{}\" in source table \"{}\" does not exist.",
                                        target_field, field.name, table.name
                                    ),
                                )
                                .with_table(&table.name)
                                .with_field(&field.name),
                            );
                        }
                    }
                }
            }

            if rel.target_table == table.name {
                issues.push(
                    Issue::new(
                        IssueCode::SelfLink,
                        format!("Table \"{}\" is linked to itself.", table.name),
                    )
                    .with_table(&table.name)
                    .with_field(&field.name),
                );
            }
        }
    }

    tracing::debug!(issues = issues.len(), "reference check finished");
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tablegraph_core::Level;
    use tablegraph_schema::{Field, Table};

    fn run(schema: &Schema) -> Vec<Issue> {
        check_references(schema, &RelationshipGraph::build(schema))
    }

    fn messages(issues: &[Issue]) -> Vec<&str> {
        issues.iter().map(|i| i.message.as_str()).collect()
    }

    #[test]
    fn valid_references_produce_nothing() {
        let schema = Schema::new(vec![
            Table::new("User").with_field(Field::new("text", "name")),
            Table::new("SessionSpeaker")
                .with_field(Field::link_table("speaker", "User", Some("name"))),
        ]);

        assert!(run(&schema).is_empty());
    }

    #[test]
    fn missing_table() {
        let schema = Schema::new(vec![Table::new("A").with_field(Field::sub_table("bar", "Foo"))]);
        let issues = run(&schema);

        assert_eq!(
            messages(&issues),
            vec!["Table \"Foo\" referenced by field \"bar\" in source table \"A\" does not exist."]
        );
        assert_eq!(issues[0].code, IssueCode::MissingTable);
        assert_eq!(issues[0].level, Level::Error);
        assert_eq!(issues[0].table.as_deref(), Some("A"));
        assert_eq!(issues[0].field.as_deref(), Some("bar"));
    }

    #[test]
    fn missing_target_field() {
        let schema = Schema::new(vec![
            Table::new("User").with_field(Field::new("text", "name")),
            Table::new("Attendee")
                .with_field(Field::link_table("attendee", "User", Some("email"))),
        ]);

        assert_eq!(
            messages(&run(&schema)),
            vec!["Field \"email\" referenced by field \"attendee\" in source table \"Attendee\" does not exist."]
        );
    }

    #[test]
    fn target_field_not_checked_when_table_missing() {
        let schema = Schema::new(vec![Table::new("A")
            .with_field(Field::link_table("owner", "Ghost", Some("name")))]);

        let issues = run(&schema);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::MissingTable);
    }

    #[test]
    fn self_link_with_valid_target_field() {
        let schema = Schema::new(vec![Table::new("Category")
            .with_field(Field::new("text", "title"))
            .with_field(Field::link_table("parent", "Category", Some("title")))]);

        assert_eq!(messages(&run(&schema)), vec!["Table \"Category\" is linked to itself."]);
    }

    #[test]
    fn self_link_missing_target_field_reports_both() {
        let schema = Schema::new(vec![Table::new("Category")
            .with_field(Field::link_table("parent", "Category", Some("title")))]);

        let issues = run(&schema);
        assert_eq!(
            issues.iter().map(|i| i.code).collect::<Vec<_>>(),
            vec![IssueCode::MissingField, IssueCode::SelfLink]
        );
    }

    #[test]
    fn order_follows_declaration() {
        let schema = Schema::new(vec![
            Table::new("A")
                .with_field(Field::sub_table("first", "X"))
                .with_field(Field::new("text", "plain"))
                .with_field(Field::sub_table("second", "Y")),
            Table::new("B").with_field(Field::sub_table("third", "Z")),
        ]);

        let fields: Vec<_> = run(&schema).into_iter().filter_map(|i| i.field).collect();
        assert_eq!(fields, vec!["first", "second", "third"]);
    }

    #[test]
    fn graph_from_larger_schema_does_not_panic() {
        let large = Schema::new(vec![
            Table::new("A"),
            Table::new("B"),
            Table::new("User").with_field(Field::new("text", "name")),
        ]);
        let small = Schema::new(vec![Table::new("Attendee")
            .with_field(Field::link_table("attendee", "User", Some("name")))]);

        let issues = check_references(&small, &RelationshipGraph::build(&large));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::MissingTable);
    }

    #[test]
    fn non_relationship_fields_ignored() {
        let mut field = Field::new("text", "notes");
        field.table = Some("Nowhere".to_string());
        field.link_field = Some("nothing".to_string());

        let schema = Schema::new(vec![Table::new("A").with_field(field)]);
        assert!(run(&schema).is_empty());
    }
}
