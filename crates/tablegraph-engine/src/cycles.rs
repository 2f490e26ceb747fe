//! Cycle detection
//!
//! A depth-first search is started from every table, since a cycle need not
//! be reachable from the first one. Each run keeps its own visited set and
//! the current recursion path; an edge to a visited node still on the path
//! closes a cycle, recorded as the path followed by that node.
//!
//! The same cycle is reported once per start node that reaches it, possibly
//! in different rotations. Reports are not deduplicated.

use tablegraph_core::{Issue, IssueCode};
use tablegraph_schema::RelationshipGraph;

/// A cycle found during one start node's traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Node the traversal started from
    pub start: usize,

    /// Recursion path at the closing edge, followed by the repeated node
    pub path: Vec<usize>,
}

impl Cycle {
    /// The closed loop itself: the path from the repeated node's first
    /// occurrence onwards. Differs from `path` when the traversal walked
    /// into the loop from outside it.
    pub fn closed_loop(&self) -> &[usize] {
        let Some(&last) = self.path.last() else {
            return &[];
        };
        let first = self.path.iter().position(|&n| n == last).unwrap_or(0);
        &self.path[first..]
    }

    /// Table names along the path
    pub fn names<'g>(&self, graph: &'g RelationshipGraph) -> Vec<&'g str> {
        self.path.iter().map(|&n| graph.name(n)).collect()
    }

    /// `A -> B -> C -> A`
    pub fn render(&self, graph: &RelationshipGraph) -> String {
        self.names(graph).join(" -> ")
    }
}

/// Every cycle closed during a traversal from each node, in start order
pub fn find_cycles(graph: &RelationshipGraph) -> Vec<Cycle> {
    let mut cycles = Vec::new();
    for start in 0..graph.len() {
        Traversal::new(graph, start).run(&mut cycles);
    }
    cycles
}

/// Explicit-stack depth-first search state for one start node
struct Traversal<'g> {
    graph: &'g RelationshipGraph,
    start: usize,
    visited: Vec<bool>,
    on_path: Vec<bool>,
    path: Vec<usize>,
    /// (node, index of the next edge to follow)
    frames: Vec<(usize, usize)>,
}

impl<'g> Traversal<'g> {
    fn new(graph: &'g RelationshipGraph, start: usize) -> Self {
        Self {
            graph,
            start,
            visited: vec![false; graph.len()],
            on_path: vec![false; graph.len()],
            path: Vec::new(),
            frames: Vec::new(),
        }
    }

    fn enter(&mut self, node: usize) {
        self.visited[node] = true;
        self.on_path[node] = true;
        self.path.push(node);
        self.frames.push((node, 0));
    }

    fn run(mut self, cycles: &mut Vec<Cycle>) {
        let graph = self.graph;
        self.enter(self.start);

        while let Some(frame) = self.frames.last_mut() {
            let (node, next_edge) = *frame;

            let Some(edge) = graph.edges(node).get(next_edge) else {
                self.frames.pop();
                self.path.pop();
                self.on_path[node] = false;
                continue;
            };
            frame.1 += 1;

            let next = edge.target;
            if !self.visited[next] {
                self.enter(next);
            } else if self.on_path[next] {
                let mut path = self.path.clone();
                path.push(next);
                cycles.push(Cycle { start: self.start, path });
            }
        }
    }
}

/// One error per recorded cycle
pub fn check_cycles(graph: &RelationshipGraph) -> Vec<Issue> {
    let issues: Vec<Issue> = find_cycles(graph)
        .into_iter()
        .map(|cycle| {
            let names: Vec<String> = cycle.names(graph).into_iter().map(str::to_string).collect();
            Issue::new(
                IssueCode::CycleDetected,
                format!("Cycle detected: {}", cycle.render(graph)),
            )
            .with_table(graph.name(cycle.start))
            .with_path(names)
        })
        .collect();

    tracing::debug!(cycles = issues.len(), "cycle check finished");
    issues
}
