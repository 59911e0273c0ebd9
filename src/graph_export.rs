//! Graph export for dependency visualization and debugging.
//!
//! Builds a [`DependencyGraph`] from a container's registrations: one node per
//! registered name, one edge per argument or owner that names another
//! registered dependency. Building a graph never triggers resolution.
//!
//! DOT and Mermaid output are always available; JSON and YAML need the
//! `graph-export` feature.

use std::collections::{HashMap, HashSet};

#[cfg(feature = "graph-export")]
use serde::{Deserialize, Serialize};

use crate::container::Container;
use crate::descriptors::DependencyInfo;
use crate::error::{DiError, DiResult};

/// A node in the dependency graph representing one registered name.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
pub struct GraphNode {
    /// Dependency name
    pub id: String,
    /// Resolution strategy label (constant, factory, ...)
    pub strategy: String,
    /// Whether the value is already cached
    pub resolved: bool,
    /// Whether an explicit context was attached
    pub has_context: bool,
    /// Names of registered dependencies this one refers to
    pub dependencies: Vec<String>,
    /// Additional metadata about the dependency
    pub metadata: HashMap<String, String>,
}

/// An edge from a dependency to one it refers to.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
pub struct GraphEdge {
    /// Referring dependency
    pub from: String,
    /// Referenced dependency
    pub to: String,
    /// How the reference is made
    pub dependency_type: DependencyType,
}

/// How one dependency refers to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
pub enum DependencyType {
    /// Positional argument substituted before the call
    Argument,
    /// Owner whose member becomes the value
    Owner,
}

/// Graph-level counters.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
pub struct GraphMetadata {
    /// Registered dependencies
    pub dependency_count: usize,
    /// Resolved dependencies
    pub resolved_count: usize,
    /// Pending dependencies
    pub pending_count: usize,
    /// Whether a reference cycle exists among registered names
    pub has_circular_dependencies: bool,
    /// Export timestamp (RFC 3339 with `graph-export`, else "unknown")
    pub exported_at: String,
    /// Crate version that produced the export
    pub version: String,
}

/// Complete dependency graph.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
pub struct DependencyGraph {
    /// One node per registered name, in registration order
    pub nodes: Vec<GraphNode>,
    /// References between registered names
    pub edges: Vec<GraphEdge>,
    /// Graph-level metadata
    pub metadata: GraphMetadata,
}

impl DependencyGraph {
    /// Looks up a node by dependency name.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Graph export configuration options.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Include pending (unresolved) dependencies
    pub include_pending: bool,
    /// Include per-node metadata
    pub include_metadata: bool,
    /// Restrict output to these names (empty = all)
    pub name_filter: HashSet<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_pending: true,
            include_metadata: true,
            name_filter: HashSet::new(),
        }
    }
}

impl ExportOptions {
    fn wants(&self, node: &GraphNode) -> bool {
        (self.include_pending || node.resolved)
            && (self.name_filter.is_empty() || self.name_filter.contains(&node.id))
    }
}

/// Export formats supported for dependency graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// JSON (requires `graph-export`)
    Json,
    /// YAML (requires `graph-export`)
    Yaml,
    /// DOT format for Graphviz
    Dot,
    /// Mermaid format for documentation
    Mermaid,
}

/// Graph exporter for generating dependency visualizations.
pub trait GraphExporter {
    /// Exports the dependency graph in the specified format.
    fn export(&self, graph: &DependencyGraph, format: ExportFormat, options: &ExportOptions) -> DiResult<String>;
}

/// Default graph exporter implementation.
#[derive(Debug, Default)]
pub struct DefaultGraphExporter;

impl GraphExporter for DefaultGraphExporter {
    fn export(&self, graph: &DependencyGraph, format: ExportFormat, options: &ExportOptions) -> DiResult<String> {
        match format {
            ExportFormat::Json => self.export_json(graph, options),
            ExportFormat::Yaml => self.export_yaml(graph, options),
            ExportFormat::Dot => Ok(self.export_dot(graph, options)),
            ExportFormat::Mermaid => Ok(self.export_mermaid(graph, options)),
        }
    }
}

impl DefaultGraphExporter {
    #[cfg(feature = "graph-export")]
    fn export_json(&self, graph: &DependencyGraph, options: &ExportOptions) -> DiResult<String> {
        serde_json::to_string_pretty(&filtered(graph, options))
            .map_err(|e| DiError::Export(format!("JSON serialization failed: {}", e)))
    }

    #[cfg(not(feature = "graph-export"))]
    fn export_json(&self, _graph: &DependencyGraph, _options: &ExportOptions) -> DiResult<String> {
        Err(DiError::Export("JSON export requires the `graph-export` feature".into()))
    }

    #[cfg(feature = "graph-export")]
    fn export_yaml(&self, graph: &DependencyGraph, options: &ExportOptions) -> DiResult<String> {
        serde_yaml::to_string(&filtered(graph, options))
            .map_err(|e| DiError::Export(format!("YAML serialization failed: {}", e)))
    }

    #[cfg(not(feature = "graph-export"))]
    fn export_yaml(&self, _graph: &DependencyGraph, _options: &ExportOptions) -> DiResult<String> {
        Err(DiError::Export("YAML export requires the `graph-export` feature".into()))
    }

    /// Exports graph as DOT format for Graphviz.
    fn export_dot(&self, graph: &DependencyGraph, options: &ExportOptions) -> String {
        let graph = filtered(graph, options);
        let mut output = String::new();
        output.push_str("digraph DependencyGraph {\n");
        output.push_str("  rankdir=TB;\n");
        output.push_str("  node [shape=box];\n\n");

        for node in &graph.nodes {
            let color = if node.resolved { "lightblue" } else { "white" };
            output.push_str(&format!(
                "  \"{}\" [label=\"{}\\n({})\", fillcolor={}, style=filled];\n",
                node.id, node.id, node.strategy, color
            ));
        }

        output.push('\n');

        for edge in &graph.edges {
            let style = match edge.dependency_type {
                DependencyType::Argument => "solid",
                DependencyType::Owner => "dashed",
            };
            output.push_str(&format!(
                "  \"{}\" -> \"{}\" [style={}];\n",
                edge.from, edge.to, style
            ));
        }

        output.push_str("}\n");
        output
    }

    /// Exports graph as Mermaid format.
    fn export_mermaid(&self, graph: &DependencyGraph, options: &ExportOptions) -> String {
        let graph = filtered(graph, options);
        let ids: HashMap<&str, String> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.as_str(), format!("n{}", i)))
            .collect();

        let mut output = String::new();
        output.push_str("graph TD\n");

        for node in &graph.nodes {
            output.push_str(&format!("  {}[\"{} ({})\"]\n", ids[node.id.as_str()], node.id, node.strategy));
        }

        for edge in &graph.edges {
            let arrow = match edge.dependency_type {
                DependencyType::Argument => "-->",
                DependencyType::Owner => "-.->",
            };
            output.push_str(&format!("  {} {} {}\n", ids[edge.from.as_str()], arrow, ids[edge.to.as_str()]));
        }

        output.push_str("\n  classDef resolved fill:#e1f5fe\n");
        for node in graph.nodes.iter().filter(|n| n.resolved) {
            output.push_str(&format!("  class {} resolved\n", ids[node.id.as_str()]));
        }

        output
    }
}

/// Applies `options` to a graph, dropping edges whose endpoints were dropped.
fn filtered(graph: &DependencyGraph, options: &ExportOptions) -> DependencyGraph {
    let nodes: Vec<GraphNode> = graph
        .nodes
        .iter()
        .filter(|n| options.wants(n))
        .cloned()
        .map(|mut n| {
            if !options.include_metadata {
                n.metadata.clear();
            }
            n
        })
        .collect();
    let kept: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let edges = graph
        .edges
        .iter()
        .filter(|e| kept.contains(e.from.as_str()) && kept.contains(e.to.as_str()))
        .cloned()
        .collect();

    DependencyGraph {
        nodes,
        edges,
        metadata: graph.metadata.clone(),
    }
}

/// Builder for creating dependency graphs from containers.
///
/// ```
/// use ferrous_injector::{Container, ExportFormat, GraphBuilder};
///
/// # fn main() -> ferrous_injector::DiResult<()> {
/// let container = Container::new();
/// container.register("config")?.as_constant("cfg")?;
/// container
///     .register("db")?
///     .using_constructor(|call| Ok(call.arg_value(0)?.clone()))?
///     .with_args(["config"])?;
///
/// let builder = GraphBuilder::new();
/// let graph = builder.build_graph(&container);
/// assert_eq!(graph.nodes.len(), 2);
/// assert_eq!(graph.edges.len(), 1);
///
/// let dot = builder.export(&graph, ExportFormat::Dot)?;
/// assert!(dot.contains("\"db\" -> \"config\""));
/// # Ok(())
/// # }
/// ```
pub struct GraphBuilder {
    options: ExportOptions,
    exporter: Box<dyn GraphExporter>,
}

impl GraphBuilder {
    /// Creates a new graph builder with default options.
    pub fn new() -> Self {
        Self {
            options: ExportOptions::default(),
            exporter: Box::new(DefaultGraphExporter),
        }
    }

    /// Sets export options.
    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets a custom exporter.
    pub fn with_exporter(mut self, exporter: Box<dyn GraphExporter>) -> Self {
        self.exporter = exporter;
        self
    }

    /// Builds the graph from the container's current registrations.
    pub fn build_graph(&self, container: &Container) -> DependencyGraph {
        let infos = container.describe();
        let registered: HashSet<&str> = infos.iter().map(|i| i.name.as_str()).collect();

        let mut nodes = Vec::with_capacity(infos.len());
        let mut edges = Vec::new();

        for info in &infos {
            let mut dependencies = Vec::new();
            for arg in info.arguments.iter().filter(|a| registered.contains(a.as_str())) {
                dependencies.push(arg.clone());
                edges.push(GraphEdge {
                    from: info.name.clone(),
                    to: arg.clone(),
                    dependency_type: DependencyType::Argument,
                });
            }
            if let Some(owner) = info.owner.as_ref().filter(|o| registered.contains(o.as_str())) {
                dependencies.push(owner.clone());
                edges.push(GraphEdge {
                    from: info.name.clone(),
                    to: owner.clone(),
                    dependency_type: DependencyType::Owner,
                });
            }

            nodes.push(GraphNode {
                id: info.name.clone(),
                strategy: info.strategy.to_string(),
                resolved: info.resolved,
                has_context: info.has_context,
                dependencies,
                metadata: node_metadata(info),
            });
        }

        let resolved_count = infos.iter().filter(|i| i.resolved).count();
        let has_circular_dependencies = has_cycle(&nodes);

        DependencyGraph {
            metadata: GraphMetadata {
                dependency_count: infos.len(),
                resolved_count,
                pending_count: infos.len() - resolved_count,
                has_circular_dependencies,
                exported_at: timestamp(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            nodes,
            edges,
        }
    }

    /// Exports a graph using the configured exporter and options.
    pub fn export(&self, graph: &DependencyGraph, format: ExportFormat) -> DiResult<String> {
        self.exporter.export(graph, format, &self.options)
    }

    /// Builds and exports in one step.
    pub fn build_and_export(&self, container: &Container, format: ExportFormat) -> DiResult<String> {
        let graph = self.build_graph(container);
        self.export(&graph, format)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn node_metadata(info: &DependencyInfo) -> HashMap<String, String> {
    let mut meta = HashMap::new();
    if !info.arguments.is_empty() {
        meta.insert("arguments".to_string(), info.arguments.join(", "));
    }
    if let Some(owner) = &info.owner {
        meta.insert("owner".to_string(), owner.clone());
    }
    meta
}

// Iterative depth-first search over `dependencies`; grey = on the current
// path. Each stack frame is (node, next dependency to look at).
fn has_cycle(nodes: &[GraphNode]) -> bool {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        White,
        Grey,
        Black,
    }

    let index: HashMap<&str, usize> = nodes.iter().enumerate().map(|(i, n)| (n.id.as_str(), i)).collect();
    let mut marks = vec![Mark::White; nodes.len()];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..nodes.len() {
        if marks[root] != Mark::White {
            continue;
        }
        marks[root] = Mark::Grey;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            let Some(dep) = nodes[node].dependencies.get(next) else {
                marks[node] = Mark::Black;
                stack.pop();
                continue;
            };
            frame.1 += 1;

            if let Some(&j) = index.get(dep.as_str()) {
                let mark = marks[j];
                if mark == Mark::Grey {
                    return true;
                }
                if mark == Mark::White {
                    marks[j] = Mark::Grey;
                    stack.push((j, 0));
                }
            }
        }
    }

    false
}

#[cfg(feature = "graph-export")]
fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(not(feature = "graph-export"))]
fn timestamp() -> String {
    "unknown".to_string()
}

/// Convenience functions for one-shot exports with default options.
pub mod exports {
    use super::*;

    /// Exports to JSON (requires `graph-export`).
    pub fn to_json(container: &Container) -> DiResult<String> {
        GraphBuilder::new().build_and_export(container, ExportFormat::Json)
    }

    /// Exports to YAML (requires `graph-export`).
    pub fn to_yaml(container: &Container) -> DiResult<String> {
        GraphBuilder::new().build_and_export(container, ExportFormat::Yaml)
    }

    /// Exports to DOT.
    pub fn to_dot(container: &Container) -> DiResult<String> {
        GraphBuilder::new().build_and_export(container, ExportFormat::Dot)
    }

    /// Exports to Mermaid.
    pub fn to_mermaid(container: &Container) -> DiResult<String> {
        GraphBuilder::new().build_and_export(container, ExportFormat::Mermaid)
    }
}
