//! Reachability analysis
//!
//! A table participates in the relationship structure if some depth-first
//! traversal, started from any table, visits it together with at least one
//! other table. A table whose only edge is a self-loop does not participate.

use tablegraph_core::{Issue, IssueCode};
use tablegraph_schema::RelationshipGraph;

/// Participation flag per node, accumulated over a traversal from every node
pub fn participation(graph: &RelationshipGraph) -> Vec<bool> {
    let mut participating = vec![false; graph.len()];

    for start in 0..graph.len() {
        let visited = graph.reachable_from(start);
        if visited.len() > 1 {
            for node in visited {
                participating[node] = true;
            }
        }
    }

    participating
}

/// Nodes that never participate, in declaration order
pub fn isolated_tables(graph: &RelationshipGraph) -> Vec<usize> {
    participation(graph)
        .into_iter()
        .enumerate()
        .filter(|(_, participating)| !participating)
        .map(|(node, _)| node)
        .collect()
}

/// One warning per isolated table
pub fn check_reachability(graph: &RelationshipGraph) -> Vec<Issue> {
    let issues: Vec<Issue> = isolated_tables(graph)
        .into_iter()
        .map(|node| {
            let name = graph.name(node);
            Issue::new(
                IssueCode::IsolatedTable,
                format!("Table {} has no relationships with other nodes.", name),
            )
            .with_table(name)
        })
        .collect();

    tracing::debug!(isolated = issues.len(), tables = graph.len(), "reachability check finished");
    issues
}
