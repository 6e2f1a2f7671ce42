//! Adjacency-list graph, undirected unless built with [`Graph::directed`].
//!
//! Adjacency lists keep insertion order, which makes every traversal
//! deterministic. Adding a vertex or an edge is O(1) (plus an O(deg) duplicate
//! check); removing a vertex is O(V + E) since it is scrubbed from every list.
//! Traversals use a `VecDeque` frontier and a `HashSet` of visited vertices.

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;

#[derive(Debug, Clone, PartialEq)]
pub struct Edge<V> {
    pub to: V,
    pub weight: f64,
}

/// A vertex reached from a traversal start, with its hop distance.
#[derive(Debug, Clone, PartialEq)]
pub struct Reached<V> {
    pub vertex: V,
    pub depth: usize,
}

#[derive(Debug, Clone)]
pub struct Graph<V> {
    adjacency: HashMap<V, Vec<Edge<V>>>,
    directed: bool,
}

impl<V: Eq + Hash + Clone> Default for Graph<V> {
    fn default() -> Self {
        Self::undirected()
    }
}

impl<V: Eq + Hash + Clone> Graph<V> {
    pub fn undirected() -> Self {
        Graph {
            adjacency: HashMap::new(),
            directed: false,
        }
    }

    pub fn directed() -> Self {
        Graph {
            adjacency: HashMap::new(),
            directed: true,
        }
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Returns false when the vertex already existed.
    pub fn add_vertex(&mut self, vertex: V) -> bool {
        if self.adjacency.contains_key(&vertex) {
            return false;
        }
        self.adjacency.insert(vertex, Vec::new());
        true
    }

    pub fn has_vertex(&self, vertex: &V) -> bool {
        self.adjacency.contains_key(vertex)
    }

    fn link(&mut self, from: &V, to: &V, weight: f64) {
        let edges = self.adjacency.entry(from.clone()).or_default();
        match edges.iter_mut().find(|e| e.to == *to) {
            Some(edge) => edge.weight = weight,
            None => edges.push(Edge {
                to: to.clone(),
                weight,
            }),
        }
    }

    /// Adds (or re-weights) the edge `a -> b`, and `b -> a` when undirected.
    /// Missing vertices are created.
    pub fn add_edge(&mut self, a: &V, b: &V, weight: f64) {
        self.add_vertex(a.clone());
        self.add_vertex(b.clone());
        self.link(a, b, weight);
        if !self.directed {
            self.link(b, a, weight);
        }
    }

    pub fn has_edge(&self, a: &V, b: &V) -> bool {
        self.neighbors(a).iter().any(|e| e.to == *b)
    }

    pub fn remove_edge(&mut self, a: &V, b: &V) -> bool {
        let removed = self.unlink(a, b);
        if !self.directed {
            self.unlink(b, a);
        }
        removed
    }

    fn unlink(&mut self, from: &V, to: &V) -> bool {
        match self.adjacency.get_mut(from) {
            Some(edges) => {
                let before = edges.len();
                edges.retain(|e| e.to != *to);
                edges.len() != before
            }
            None => false,
        }
    }

    /// Removes the vertex and every edge pointing at it.
    pub fn remove_vertex(&mut self, vertex: &V) -> bool {
        if self.adjacency.remove(vertex).is_none() {
            return false;
        }
        for edges in self.adjacency.values_mut() {
            edges.retain(|e| e.to != *vertex);
        }
        true
    }

    pub fn neighbors(&self, vertex: &V) -> &[Edge<V>] {
        self.adjacency.get(vertex).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn vertices(&self) -> impl Iterator<Item = &V> {
        self.adjacency.keys()
    }

    /// Breadth-first order starting at `start`, `start` included.
    pub fn bfs(&self, start: &V) -> Vec<V> {
        self.walk_breadth_first(start, usize::MAX)
            .into_iter()
            .map(|r| r.vertex)
            .collect()
    }

    /// Depth-first pre-order starting at `start`, `start` included.
    pub fn dfs(&self, start: &V) -> Vec<V> {
        let mut order = Vec::new();
        if !self.has_vertex(start) {
            return order;
        }
        let mut visited: HashSet<&V> = HashSet::new();
        let mut stack: Vec<&V> = vec![start];
        while let Some(vertex) = stack.pop() {
            if !visited.insert(vertex) {
                continue;
            }
            order.push(vertex.clone());
            for edge in self.neighbors(vertex).iter().rev() {
                if !visited.contains(&edge.to) {
                    stack.push(&edge.to);
                }
            }
        }
        order
    }

    /// Every vertex within `max_depth` hops of `start`, nearest first. The
    /// start vertex itself is not reported.
    pub fn find_related(&self, start: &V, max_depth: usize) -> Vec<Reached<V>> {
        self.walk_breadth_first(start, max_depth)
            .into_iter()
            .filter(|r| r.depth > 0)
            .collect()
    }

    pub fn has_path(&self, from: &V, to: &V) -> bool {
        if !self.has_vertex(from) || !self.has_vertex(to) {
            return false;
        }
        self.walk_breadth_first(from, usize::MAX)
            .iter()
            .any(|r| r.vertex == *to)
    }

    fn walk_breadth_first(&self, start: &V, max_depth: usize) -> Vec<Reached<V>> {
        let mut reached = Vec::new();
        if !self.has_vertex(start) {
            return reached;
        }
        let mut visited: HashSet<&V> = HashSet::new();
        let mut frontier: VecDeque<(&V, usize)> = VecDeque::new();
        visited.insert(start);
        frontier.push_back((start, 0));

        while let Some((vertex, depth)) = frontier.pop_front() {
            reached.push(Reached {
                vertex: vertex.clone(),
                depth,
            });
            if depth >= max_depth {
                continue;
            }
            for edge in self.neighbors(vertex) {
                if visited.insert(&edge.to) {
                    frontier.push_back((&edge.to, depth + 1));
                }
            }
        }
        reached
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of edges; an undirected edge counts once.
    pub fn edge_count(&self) -> usize {
        let half_edges: usize = self.adjacency.values().map(Vec::len).sum();
        if self.directed {
            half_edges
        } else {
            half_edges / 2
        }
    }

    pub fn clear(&mut self) {
        self.adjacency.clear();
    }
}
