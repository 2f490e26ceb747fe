//! Issue reporting
//!
//! Builds a fresh relationship graph, runs the three analyses over it and
//! concatenates their findings: reference errors, then reachability
//! warnings, then cycle errors.

use tablegraph_core::Issue;
use tablegraph_schema::{RelationshipGraph, Schema};

use crate::{cycles, reachability, references};

/// Findings of one validation run, kept per analysis
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    /// Missing tables, missing target fields and self-links
    pub references: Vec<Issue>,

    /// Tables with no relationships
    pub reachability: Vec<Issue>,

    /// Directed cycles
    pub cycles: Vec<Issue>,
}

impl Analysis {
    /// Run every analysis over a schema
    pub fn run(schema: &Schema) -> Self {
        let graph = RelationshipGraph::build(schema);
        tracing::debug!(
            tables = graph.len(),
            edges = graph.edge_count(),
            "built relationship graph"
        );

        Self {
            references: references::check_references(schema, &graph),
            reachability: reachability::check_reachability(&graph),
            cycles: cycles::check_cycles(&graph),
        }
    }

    pub fn len(&self) -> usize {
        self.references.len() + self.reachability.len() + self.cycles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All issues in reporting order
    pub fn into_issues(self) -> Vec<Issue> {
        let mut issues = self.references;
        issues.extend(self.reachability);
        issues.extend(self.cycles);
        issues
    }
}

/// Validate a schema's relationship structure
pub fn validate(schema: &Schema) -> Vec<Issue> {
    Analysis::run(schema).into_issues()
}
