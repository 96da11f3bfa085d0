//! Rendering of one [`Analysis`] in pretty, text and JSON form.
//!
//! Components are written `C<i>`. Unreachable distances print as `INF` for
//! the shortest objective and `-INF` for the longest; JSON uses `null`.

use std::io::{self, Write};
use std::ops::Range;

use depdag_core::graph::CondensedEdge;
use depdag_core::{
    Analysis, ComponentId, DistanceResult, NodeId, Objective, SelectedPath, StageMetrics,
};
use petgraph::dot::{Config, Dot};
use serde::Serialize;

use crate::input::LoadedGraph;
use crate::output::{pretty_kv, pretty_section};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub show_metrics: bool,
    /// Print original-node expansions in human output.
    pub expand_nodes: bool,
}

#[derive(Debug, Serialize)]
pub struct GraphSummary {
    pub n: usize,
    pub edges: usize,
    pub directed: bool,
    pub weight_model: Option<String>,
    pub source: NodeId,
}

#[derive(Debug, Serialize)]
pub struct ComponentRow {
    pub id: ComponentId,
    pub size: usize,
    pub members: Vec<NodeId>,
}

#[derive(Debug, Serialize)]
pub struct DistanceSection {
    /// Indexed by component id; `None` when unreachable.
    pub distances: Vec<Option<i64>>,
    pub path: Option<SelectedPath>,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub graph: GraphSummary,
    pub components: Vec<ComponentRow>,
    pub condensation: Vec<CondensedEdge>,
    pub topo_order: Vec<ComponentId>,
    pub expanded_order: Vec<NodeId>,
    pub source_component: ComponentId,
    pub shortest: DistanceSection,
    pub longest: DistanceSection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<StageMetrics>,
    /// `condensation[out_ranges[c]]` holds the edges leaving component `c`.
    #[serde(skip)]
    out_ranges: Vec<Range<usize>>,
    #[serde(skip)]
    expand_nodes: bool,
}

impl Report {
    pub fn new(loaded: &LoadedGraph, analysis: &Analysis, options: ReportOptions) -> Self {
        let components = analysis
            .components()
            .iter()
            .enumerate()
            .map(|(id, c)| ComponentRow {
                id,
                size: c.len(),
                members: c.members.clone(),
            })
            .collect();
        let condensation: Vec<CondensedEdge> = analysis.condensation.edges().copied().collect();
        let out_ranges = out_ranges(&condensation, analysis.components().len());

        Self {
            graph: GraphSummary {
                n: loaded.graph.node_count(),
                edges: loaded.graph.edge_count(),
                directed: loaded.directed,
                weight_model: loaded.weight_model.clone(),
                source: analysis.source,
            },
            components,
            condensation,
            topo_order: analysis.order.as_slice().to_vec(),
            expanded_order: analysis.expanded_order.clone(),
            source_component: analysis.source_component,
            shortest: section(&analysis.shortest, analysis.shortest_path.clone()),
            longest: section(&analysis.longest, analysis.critical_path.clone()),
            metrics: options.show_metrics.then_some(analysis.metrics),
            out_ranges,
            expand_nodes: options.expand_nodes,
        }
    }

    fn component_count(&self) -> usize {
        self.out_ranges.len()
    }

    fn edges_from(&self, component: ComponentId) -> &[CondensedEdge] {
        self.out_ranges
            .get(component)
            .and_then(|range| self.condensation.get(range.clone()))
            .unwrap_or_default()
    }
}

/// Index the edge list, which arrives grouped by source component.
fn out_ranges(edges: &[CondensedEdge], component_count: usize) -> Vec<Range<usize>> {
    let mut ranges = vec![Range::default(); component_count];
    let mut start = 0;
    for group in edges.chunk_by(|a, b| a.from == b.from) {
        let end = start + group.len();
        if let Some(slot) = ranges.get_mut(group[0].from) {
            *slot = start..end;
        }
        start = end;
    }
    ranges
}

fn section(result: &DistanceResult, path: Option<SelectedPath>) -> DistanceSection {
    DistanceSection {
        distances: result.distances().iter().map(|d| d.finite()).collect(),
        path,
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

fn fmt_distance(d: Option<i64>, objective: Objective) -> String {
    match (d, objective) {
        (Some(d), _) => d.to_string(),
        (None, Objective::Shortest) => "INF".to_string(),
        (None, Objective::Longest) => "-INF".to_string(),
    }
}

fn fmt_component_path(path: &[ComponentId]) -> String {
    path.iter()
        .map(|c| format!("C{c}"))
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn fmt_nodes(nodes: &[NodeId]) -> String {
    let parts: Vec<String> = nodes.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

fn fmt_out_edges(edges: &[CondensedEdge]) -> String {
    edges
        .iter()
        .map(|e| format!("C{}(w={})", e.to, e.weight))
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

pub fn write_text(r: &Report, w: &mut dyn Write) -> io::Result<()> {
    let g = &r.graph;
    writeln!(
        w,
        "graph n={} edges={} directed={} weight_model={} source={}",
        g.n,
        g.edges,
        g.directed,
        g.weight_model.as_deref().unwrap_or("-"),
        g.source
    )?;

    writeln!(w, "components count={}", r.components.len())?;
    for c in &r.components {
        writeln!(w, "  C{} {} size={}", c.id, fmt_nodes(&c.members), c.size)?;
    }

    writeln!(
        w,
        "condensation components={} edges={}",
        r.component_count(),
        r.condensation.len()
    )?;
    for c in 0..r.component_count() {
        writeln!(w, "  C{c} -> {}", fmt_out_edges(r.edges_from(c)))?;
    }

    writeln!(w, "topo order: {}", fmt_component_path(&r.topo_order))?;
    if r.expand_nodes {
        writeln!(w, "expanded order: {}", fmt_nodes(&r.expanded_order))?;
    }
    writeln!(w, "source: node {} in C{}", g.source, r.source_component)?;

    let expand = r.expand_nodes;
    write_text_section(w, "shortest", &r.shortest, Objective::Shortest, expand)?;
    write_text_section(w, "longest", &r.longest, Objective::Longest, expand)?;

    if let Some(m) = &r.metrics {
        writeln!(
            w,
            "metrics scc node_visits={} edge_explorations={} elapsed_ns={}",
            m.scc.node_visits, m.scc.edge_explorations, m.scc.elapsed_ns
        )?;
        writeln!(
            w,
            "metrics topo queue_pushes={} queue_pops={} edge_removals={} elapsed_ns={}",
            m.topo.queue_pushes, m.topo.queue_pops, m.topo.edge_removals, m.topo.elapsed_ns
        )?;
        for (name, p) in [("shortest", &m.shortest), ("longest", &m.longest)] {
            writeln!(
                w,
                "metrics {name} relax_attempts={} relax_successes={} elapsed_ns={}",
                p.relax_attempts, p.relax_successes, p.elapsed_ns
            )?;
        }
    }
    Ok(())
}

fn write_text_section(
    w: &mut dyn Write,
    name: &str,
    section: &DistanceSection,
    objective: Objective,
    expand_nodes: bool,
) -> io::Result<()> {
    writeln!(w, "{name} distances:")?;
    for (c, d) in section.distances.iter().enumerate() {
        writeln!(w, "  C{c} = {}", fmt_distance(*d, objective))?;
    }
    let label = match objective {
        Objective::Shortest => "shortest path",
        Objective::Longest => "critical path",
    };
    match &section.path {
        Some(p) => {
            writeln!(
                w,
                "{label} to C{} length={}: {}",
                p.target,
                p.distance,
                fmt_component_path(&p.components)
            )?;
            if expand_nodes {
                writeln!(w, "  nodes: {}", fmt_nodes(&p.nodes))?;
            }
        }
        None => writeln!(w, "{label}: none")?,
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pretty
// ---------------------------------------------------------------------------

pub fn write_pretty(r: &Report, w: &mut dyn Write) -> io::Result<()> {
    let g = &r.graph;
    pretty_section(w, "Graph")?;
    pretty_kv(w, "Nodes", g.n.to_string())?;
    pretty_kv(w, "Edges", g.edges.to_string())?;
    pretty_kv(w, "Directed", if g.directed { "yes" } else { "no" })?;
    let weight_model = g.weight_model.as_deref().unwrap_or("(unspecified)");
    pretty_kv(w, "Weight model", weight_model)?;
    let source = format!("node {} (C{})", g.source, r.source_component);
    pretty_kv(w, "Source", source)?;
    writeln!(w)?;

    let cycles = r.components.iter().filter(|c| c.size > 1).count();
    pretty_section(
        w,
        &format!("Components ({}, {cycles} cyclic)", r.components.len()),
    )?;
    for c in &r.components {
        let marker = if c.size > 1 { "  cycle" } else { "" };
        writeln!(w, "  C{:<4} {}{marker}", c.id, fmt_nodes(&c.members))?;
    }
    writeln!(w)?;

    pretty_section(w, &format!("Condensation ({} edges)", r.condensation.len()))?;
    for c in 0..r.component_count() {
        let outs = fmt_out_edges(r.edges_from(c));
        if outs.is_empty() {
            writeln!(w, "  C{c}")?;
        } else {
            writeln!(w, "  C{c} -> {outs}")?;
        }
    }
    writeln!(w)?;

    pretty_section(w, "Order")?;
    pretty_kv(w, "Components", fmt_component_path(&r.topo_order))?;
    if r.expand_nodes {
        pretty_kv(w, "Tasks", fmt_nodes(&r.expanded_order))?;
    }
    writeln!(w)?;

    for (heading, section, objective) in [
        ("Shortest distances", &r.shortest, Objective::Shortest),
        ("Longest distances", &r.longest, Objective::Longest),
    ] {
        write_pretty_section(w, heading, section, objective, r.expand_nodes)?;
    }

    if let Some(m) = &r.metrics {
        pretty_section(w, "Metrics")?;
        pretty_kv(
            w,
            "SCC",
            format!(
                "{} visits, {} edges, {} ns",
                m.scc.node_visits, m.scc.edge_explorations, m.scc.elapsed_ns
            ),
        )?;
        pretty_kv(
            w,
            "Topo",
            format!(
                "{} pushes, {} pops, {} removals, {} ns",
                m.topo.queue_pushes, m.topo.queue_pops, m.topo.edge_removals, m.topo.elapsed_ns
            ),
        )?;
        for (name, p) in [("Shortest", &m.shortest), ("Longest", &m.longest)] {
            pretty_kv(
                w,
                name,
                format!(
                    "{} attempts, {} successes, {} ns",
                    p.relax_attempts, p.relax_successes, p.elapsed_ns
                ),
            )?;
        }
    }
    Ok(())
}

fn write_pretty_section(
    w: &mut dyn Write,
    heading: &str,
    section: &DistanceSection,
    objective: Objective,
    expand_nodes: bool,
) -> io::Result<()> {
    pretty_section(w, heading)?;
    for (c, d) in section.distances.iter().enumerate() {
        writeln!(w, "  C{c:<4} {}", fmt_distance(*d, objective))?;
    }
    let label = match objective {
        Objective::Shortest => "Path",
        Objective::Longest => "Critical path",
    };
    if let Some(p) = &section.path {
        writeln!(w)?;
        let path = fmt_component_path(&p.components);
        pretty_kv(w, label, format!("{path} (length {})", p.distance))?;
        if expand_nodes {
            pretty_kv(w, "Tasks", fmt_nodes(&p.nodes))?;
        }
    }
    writeln!(w)
}

// ---------------------------------------------------------------------------
// DOT
// ---------------------------------------------------------------------------

/// Graphviz DOT for the condensation DAG.
///
/// Nodes are labelled `C<i> [members]`, edges with their collapsed weight.
pub fn condensation_dot(analysis: &Analysis) -> String {
    let labelled = analysis.condensation.to_digraph().map(
        |_, &c| {
            let members = analysis
                .condensation
                .component(c)
                .map(|comp| fmt_nodes(&comp.members))
                .unwrap_or_default();
            format!("C{c} {members}")
        },
        |_, &w| w,
    );
    format!(
        "digraph condensation {{\n{}}}\n",
        Dot::with_config(&labelled, &[Config::GraphContentOnly])
    )
}
