//! Relationship graph construction and traversal
//!
//! One node per table (in declaration order), one directed edge per
//! resolvable relationship field. Edges whose target table is not declared
//! are left out; reporting them is the reference check's job.

use std::collections::{HashMap, VecDeque};
use crate::schema::Schema;

/// A directed edge, labelled with the field that declares it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Relationship field on the source table
    pub field: String,

    /// Index of the target table
    pub target: usize,
}

/// Immutable directed multigraph of tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipGraph {
    /// Table names in declaration order
    nodes: Vec<String>,

    /// Name -> first index with that name
    index: HashMap<String, usize>,

    /// Outgoing edges per node, in field declaration order
    edges: Vec<Vec<Edge>>,
}

impl RelationshipGraph {
    /// Build the graph for a schema
    pub fn build(schema: &Schema) -> Self {
        let nodes: Vec<String> = schema.tables.iter().map(|t| t.name.clone()).collect();

        let mut index = HashMap::with_capacity(nodes.len());
        for (i, name) in nodes.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }

        let edges: Vec<Vec<Edge>> = schema
            .tables
            .iter()
            .map(|table| {
                table
                    .relationship_fields()
                    .filter_map(|(field, rel)| {
                        index.get(rel.target_table).map(|&target| Edge {
                            field: field.name.clone(),
                            target,
                        })
                    })
                    .collect()
            })
            .collect();

        Self { nodes, index, edges }
    }

    /// Table names, in traversal start order
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index of a table by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Name of the table at `index`
    pub fn name(&self, index: usize) -> &str {
        &self.nodes[index]
    }

    /// Outgoing edges of a node
    pub fn edges(&self, index: usize) -> &[Edge] {
        self.edges.get(index).map(Vec::as_slice).unwrap_or_default()
    }

    /// Targets of a node's outgoing edges, in declaration order
    pub fn neighbors(&self, index: usize) -> impl DoubleEndedIterator<Item = usize> + '_ {
        self.edges(index).iter().map(|edge| edge.target)
    }

    /// Plain adjacency lists
    pub fn adjacency(&self) -> Vec<Vec<usize>> {
        (0..self.len()).map(|i| self.neighbors(i).collect()).collect()
    }

    /// Total number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    /// Nodes reachable from `start` (including it), in depth-first pre-order
    pub fn reachable_from(&self, start: usize) -> Vec<usize> {
        if start >= self.len() {
            return Vec::new();
        }

        let mut visited = vec![false; self.len()];
        let mut order = Vec::new();
        let mut stack = vec![start];

        while let Some(node) = stack.pop() {
            if visited[node] {
                continue;
            }

            visited[node] = true;
            order.push(node);

            // Reversed so the first declared edge is explored first
            for next in self.neighbors(node).rev() {
                if !visited[next] {
                    stack.push(next);
                }
            }
        }

        order
    }

    /// Tables that reach `target` through one or more edges.
    ///
    /// Includes `target` itself when it lies on a cycle.
    pub fn referrers(&self, target: usize) -> Vec<usize> {
        if target >= self.len() {
            return Vec::new();
        }

        let mut reverse: Vec<Vec<usize>> = vec![Vec::new(); self.len()];
        for source in 0..self.len() {
            for next in self.neighbors(source) {
                if !reverse[next].contains(&source) {
                    reverse[next].push(source);
                }
            }
        }

        let mut visited = vec![false; self.len()];
        let mut queue: VecDeque<usize> = reverse[target].iter().copied().collect();
        let mut result = Vec::new();

        // BFS over reversed edges
        while let Some(current) = queue.pop_front() {
            if visited[current] {
                continue;
            }

            visited[current] = true;
            result.push(current);

            for &parent in &reverse[current] {
                if !visited[parent] {
                    queue.push_back(parent);
                }
            }
        }

        result
    }

    /// Graphviz rendering, edges labelled with field names
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph schema {\n");

        for name in &self.nodes {
            dot.push_str(&format!("    \"{}\";\n", escape(name)));
        }

        for (source, edges) in self.edges.iter().enumerate() {
            for edge in edges {
                dot.push_str(&format!(
                    "    \"{}\" -> \"{}\" [label=\"{}\"];\n",
                    escape(&self.nodes[source]),
                    escape(&self.nodes[edge.target]),
                    escape(&edge.field)
                ));
            }
        }

        dot.push_str("}\n");
        dot
    }
}

fn escape(id: &str) -> String {
    id.replace('\\', "\\\\").replace('"', "\\\"")
}
