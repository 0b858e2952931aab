use crate::error::GenError;
use crate::naming::{context_param, field_ident};
use crate::schema::{Context, Member, Struct, Type};
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashSet, VecDeque};

/// A by-value containment of one struct in another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub from: String,
    pub to: String,
    pub field: String,
    /// True when the containment only happens inside a union case.
    pub conditional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclePath {
    pub cycle: Vec<String>,
}

#[derive(Debug, Default)]
pub struct DependencyGraph {
    pub nodes: IndexSet<String>,
    pub edges: Vec<Dependency>,
    pub adjacency_list: IndexMap<String, Vec<usize>>,
}

#[derive(Debug)]
pub struct DependencyAnalysis {
    pub graph: DependencyGraph,
    /// Cycles made only of unconditional containment.
    pub cycles: Vec<CyclePath>,
    pub topological_order: Option<Vec<String>>,
    pub validation_errors: Vec<GenError>,
}

impl DependencyAnalysis {
    pub fn has_errors(&self) -> bool {
        !self.cycles.is_empty() || !self.validation_errors.is_empty()
    }

    /// The first problem found, as a generation error.
    pub fn first_error(&self) -> Option<GenError> {
        if let Some(err) = self.validation_errors.first() {
            return Some(err.clone());
        }
        self.cycles.first().map(|c| GenError::InfiniteStruct {
            cycle: c.cycle.clone(),
        })
    }
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: &str) {
        if !self.nodes.contains(name) {
            self.nodes.insert(name.to_string());
            self.adjacency_list.insert(name.to_string(), Vec::new());
        }
    }

    pub fn add_dependency(&mut self, dep: Dependency) {
        self.add_node(&dep.from);
        self.add_node(&dep.to);

        let idx = self.edges.len();
        if let Some(out) = self.adjacency_list.get_mut(&dep.from) {
            out.push(idx);
        }
        self.edges.push(dep);
    }

    /// Build the containment graph of the given structs.
    pub fn build<'a>(structs: impl IntoIterator<Item = &'a Struct>) -> Self {
        let mut graph = Self::new();
        for s in structs {
            graph.add_node(&s.name);
            if s.is_extern() {
                continue;
            }
            graph.collect_members(&s.name, &s.members, false);
        }
        graph
    }

    fn collect_members(&mut self, owner: &str, members: &[Member], conditional: bool) {
        for member in members {
            match member {
                Member::Field(field) => {
                    self.collect_type(owner, &field.name, &field.field_type, conditional)
                }
                Member::Union(union) => {
                    for case in &union.cases {
                        self.collect_members(owner, &case.members, true);
                    }
                }
                Member::Eos | Member::Ignore | Member::Fail => {}
            }
        }
    }

    fn collect_type(&mut self, owner: &str, field: &str, ty: &Type, conditional: bool) {
        match ty {
            Type::StructRef(name) => self.add_dependency(Dependency {
                from: owner.to_string(),
                to: name.clone(),
                field: field.to_string(),
                conditional,
            }),
            Type::FixedArray(array) => self.collect_type(owner, field, &array.base, conditional),
            /* A variable array may be empty, so it never forces containment */
            Type::VarArray(_) => {}
            Type::Int(_) | Type::Char | Type::NulTermString | Type::RemainingOffset => {}
        }
    }

    fn successors<'g>(&'g self, node: &str, unconditional_only: bool) -> impl Iterator<Item = &'g str> {
        self.adjacency_list
            .get(node)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.edges[idx])
            .filter(move |dep| !(unconditional_only && dep.conditional))
            .map(|dep| dep.to.as_str())
    }

    /// Whether `to` is reachable from `from` through one or more containment edges.
    pub fn reaches(&self, from: &str, to: &str) -> bool {
        let mut visited = HashSet::new();
        let mut queue: VecDeque<&str> = self.successors(from, false).collect();

        while let Some(node) = queue.pop_front() {
            if node == to {
                return true;
            }
            if visited.insert(node) {
                queue.extend(self.successors(node, false));
            }
        }
        false
    }

    /// Detect cycles of unconditional containment using DFS.
    pub fn detect_cycles(&self) -> Vec<CyclePath> {
        let mut cycles = Vec::new();
        let mut visited = HashSet::new();
        let mut path = Vec::new();

        for node in &self.nodes {
            if !visited.contains(node.as_str()) {
                self.dfs_cycle_detection(node, &mut visited, &mut path, &mut cycles);
            }
        }
        cycles
    }

    fn dfs_cycle_detection<'g>(
        &'g self,
        node: &'g str,
        visited: &mut HashSet<&'g str>,
        path: &mut Vec<&'g str>,
        cycles: &mut Vec<CyclePath>,
    ) {
        visited.insert(node);
        path.push(node);

        for next in self.successors(node, true) {
            if let Some(start) = path.iter().position(|n| *n == next) {
                let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(next.to_string());
                cycles.push(CyclePath { cycle });
            } else if !visited.contains(next) {
                self.dfs_cycle_detection(next, visited, path, cycles);
            }
        }

        path.pop();
    }

    /// Contained structs before their containers, or `None` if any cycle exists.
    pub fn topological_sort(&self) -> Option<Vec<String>> {
        let mut pending: IndexMap<&str, usize> = self
            .nodes
            .iter()
            .map(|n| (n.as_str(), self.successors(n, false).count()))
            .collect();
        let mut ready: VecDeque<&str> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(n, _)| *n)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(node) = ready.pop_front() {
            order.push(node.to_string());
            for dep in self.edges.iter().filter(|d| d.to == node) {
                if let Some(count) = pending.get_mut(dep.from.as_str()) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push_back(dep.from.as_str());
                    }
                }
            }
        }

        (order.len() == self.nodes.len()).then_some(order)
    }
}

pub struct DependencyAnalyzer {
    validation_errors: Vec<GenError>,
}

impl DependencyAnalyzer {
    pub fn new() -> Self {
        Self {
            validation_errors: Vec::new(),
        }
    }

    pub fn analyze(&mut self, structs: &[&Struct], contexts: &[&Context]) -> DependencyAnalysis {
        self.validation_errors.clear();

        for context in contexts {
            self.validate_names(&context.name, context.fields.iter().map(|f| f.name.as_str()), &[], &[]);
        }
        for s in structs.iter().filter(|s| !s.is_extern()) {
            let params: Vec<String> = s.contexts.iter().map(|c| context_param(c)).collect();
            self.validate_members(&s.name, &s.members, &params, &[], false);
        }

        let graph = DependencyGraph::build(structs.iter().copied());
        let cycles = graph.detect_cycles();
        let topological_order = graph.topological_sort();

        DependencyAnalysis {
            graph,
            cycles,
            topological_order,
            validation_errors: std::mem::take(&mut self.validation_errors),
        }
    }

    /* Member names must be unique per struct and per union case once normalized.
       `bound` holds the names of enclosing union cases, which nested cases must not reuse. */
    fn validate_members(&mut self, owner: &str, members: &[Member], params: &[String], bound: &[String], in_case: bool) {
        self.validate_names(owner, members.iter().filter_map(|m| m.name()), params, bound);

        let mut inner = bound.to_vec();
        if in_case {
            inner.extend(members.iter().filter_map(|m| m.name()).map(field_ident));
        }
        for member in members {
            if let Member::Union(union) = member {
                for case in &union.cases {
                    self.validate_members(owner, &case.members, params, &inner, true);
                }
            }
        }
    }

    fn validate_names<'n>(
        &mut self,
        owner: &str,
        names: impl Iterator<Item = &'n str>,
        params: &[String],
        bound: &[String],
    ) {
        let mut seen = HashSet::new();
        for name in names {
            let ident = field_ident(name);
            if name.starts_with("__") || params.contains(&ident) {
                self.validation_errors.push(GenError::ReservedName {
                    owner: owner.to_string(),
                    name: name.to_string(),
                });
            } else if bound.contains(&ident) || !seen.insert(ident) {
                self.validation_errors.push(GenError::DuplicateMember {
                    owner: owner.to_string(),
                    name: name.to_string(),
                });
            }
        }
    }
}

impl Default for DependencyAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "dependency_tests.rs"]
mod tests;
