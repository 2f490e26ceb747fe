//! Integration tests for schema validation

use pretty_assertions::assert_eq;
use std::path::Path;
use tablegraph_core::{Config, IssueCode, Level, Report};
use tablegraph_engine::{validate, Analysis};
use tablegraph_schema::{Field, RelationshipGraph, Schema, Table};

fn load(fixture: &str) -> Schema {
    let path = Path::new("../../fixtures").join(fixture).join("schema.json");
    Schema::from_file(&path).unwrap()
}

fn messages(schema: &Schema) -> Vec<String> {
    validate(schema).into_iter().map(|i| i.message).collect()
}

#[test]
fn event_app_fixture_is_clean() {
    let schema = load("event-app");

    assert_eq!(
        schema.table_names(),
        vec!["Event", "Session", "User", "SessionSpeaker", "SessionAttendee"]
    );
    assert!(validate(&schema).is_empty());

    // Depth-first order from the first table covers every table
    let graph = RelationshipGraph::build(&schema);
    assert_eq!(graph.adjacency(), vec![vec![1], vec![3, 4], vec![], vec![2], vec![2]]);
    assert_eq!(graph.reachable_from(0), vec![0, 1, 3, 2, 4]);
}

#[test]
fn broken_fixture_reports_every_category() {
    let schema = load("broken");

    assert_eq!(
        messages(&schema),
        vec![
            "Field \"fullName\" referenced by field \"customer\" in source table \"Order\" does not exist.",
            "Table \"Warehouse\" referenced by field \"warehouse\" in source table \"Order\" does not exist.",
            "Field \"nickname\" referenced by field \"referredBy\" in source table \"Customer\" does not exist.",
            "Table \"Customer\" is linked to itself.",
            "Table Settings has no relationships with other nodes.",
            "Cycle detected: Order -> Customer -> Customer",
            "Cycle detected: Order -> OrderLine -> Product -> Order",
            "Cycle detected: OrderLine -> Product -> Order -> Customer -> Customer",
            "Cycle detected: OrderLine -> Product -> Order -> OrderLine",
            "Cycle detected: Product -> Order -> Customer -> Customer",
            "Cycle detected: Product -> Order -> OrderLine -> Product",
            "Cycle detected: Customer -> Customer",
        ]
    );
}

#[test]
fn issue_count_is_sum_of_categories() {
    let schema = load("broken");
    let analysis = Analysis::run(&schema);

    assert_eq!(analysis.references.len(), 4);
    assert_eq!(analysis.reachability.len(), 1);
    assert_eq!(analysis.cycles.len(), 7);
    assert_eq!(validate(&schema).len(), analysis.len());
}

#[test]
fn missing_table_named_in_exactly_one_error() {
    let mut schema = load("event-app");
    schema.tables[2] = schema.tables[2]
        .clone()
        .with_field(Field::sub_table("bar", "Foo"));

    let matching: Vec<_> = validate(&schema)
        .into_iter()
        .filter(|i| i.message.contains("\"Foo\"") && i.message.contains("\"bar\""))
        .collect();

    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].code, IssueCode::MissingTable);
    assert_eq!(matching[0].level, Level::Error);
}

#[test]
fn three_table_cycle() {
    let schema = Schema::new(vec![
        Table::new("A").with_field(Field::link_table("next", "B", None)),
        Table::new("B").with_field(Field::link_table("next", "C", None)),
        Table::new("C").with_field(Field::link_table("next", "A", None)),
    ]);

    let issues = validate(&schema);
    assert!(issues.iter().all(|i| i.level != Level::Warning));

    let cycles: Vec<_> = issues.iter().filter(|i| i.code == IssueCode::CycleDetected).collect();
    assert_eq!(cycles.len(), 3);
    for cycle in cycles {
        assert_eq!(cycle.path.first(), cycle.path.last());
    }
}

#[test]
fn all_tables_without_relationships() {
    let schema = Schema::new(vec![
        Table::new("A").with_field(Field::new("text", "x")),
        Table::new("B").with_field(Field::new("date-only", "y")),
        Table::new("C"),
    ]);

    let issues = validate(&schema);
    assert_eq!(issues.len(), 3);
    assert!(issues.iter().all(|i| i.code == IssueCode::IsolatedTable));
}

#[test]
fn validation_is_idempotent() {
    let schema = load("broken");
    assert_eq!(validate(&schema), validate(&schema));
}

#[test]
fn config_policy_over_fixture() {
    let schema = load("broken");
    let config = Config::from_toml(
        r#"
[severity.overrides]
ISOLATED_TABLE = "error"

[allowlist]
self_links = ["Customer"]
"#,
    )
    .unwrap();

    let issues = config.apply(validate(&schema));
    assert!(issues.iter().all(|i| i.code != IssueCode::SelfLink));

    let report = Report::from_issues(issues);
    assert_eq!(report.summary.total, 11);
    assert_eq!(report.summary.warnings, 0);
    assert!(config.should_fail(&report));
}
