//! Diagram description builder: step text → linear flowchart.
//!
//! DESIGN
//! ======
//! Each non-blank input line becomes one process step. Steps are chained
//! between synthetic `Start` and `End` terminals, so the graph is always a
//! single simple path of `n + 2` nodes and `n + 1` edges. An empty step list
//! collapses to a direct `Start --> End` edge.
//!
//! The builder is pure: the HTTP handler and the CLI wizard both call it,
//! and identical text always yields identical Mermaid output.

pub mod mermaid;

use std::fmt;

pub use mermaid::to_mermaid;

/// Identifier of the synthetic entry node.
pub const START_ID: &str = "Start";

/// Identifier of the synthetic exit node.
pub const END_ID: &str = "End";

// =============================================================================
// DIAGRAM KIND
// =============================================================================

/// Which of the two process lists a diagram was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagramKind {
    Manual,
    Automation,
}

impl DiagramKind {
    pub const ALL: [Self; 2] = [Self::Manual, Self::Automation];

    /// Type tag sent to the webhook (`Manual` / `Automation`).
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Manual => "Manual",
            Self::Automation => "Automation",
        }
    }

    /// Lowercase stem used in file names and JSON keys.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Automation => "automation",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Manual => "Manual Process Flow",
            Self::Automation => "Automated Process Flow",
        }
    }

    /// File name offered for a rasterized download.
    #[must_use]
    pub fn download_file_name(self) -> String {
        format!("{}-process-diagram.png", self.as_str())
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// GRAPH
// =============================================================================

/// Node shape in the rendered flowchart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    /// Stadium terminal (`([...])`) used for `Start` / `End`.
    Terminal,
    /// Rectangle (`["..."]`) used for steps.
    Process,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// A linear flowchart: `Start → Step1 → … → StepN → End`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowDiagram {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl FlowDiagram {
    /// Number of process steps, excluding the two terminals.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.nodes.len().saturating_sub(2)
    }

    #[must_use]
    pub fn to_mermaid(&self) -> String {
        to_mermaid(self)
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Split raw input into trimmed, non-blank step lines, preserving order.
#[must_use]
pub fn parse_steps(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty()).collect()
}

/// Replace double quotes so labels cannot terminate a `["..."]` node early.
#[must_use]
pub fn sanitize_label(text: &str) -> String {
    text.replace('"', "'")
}

/// Build the linear flowchart for one step list.
#[must_use]
pub fn build(text: &str) -> FlowDiagram {
    let steps = parse_steps(text);

    let mut nodes = Vec::with_capacity(steps.len() + 2);
    nodes.push(Node { id: START_ID.to_owned(), label: START_ID.to_owned(), shape: NodeShape::Terminal });
    for (index, step) in steps.iter().enumerate() {
        nodes.push(Node { id: step_id(index + 1), label: sanitize_label(step), shape: NodeShape::Process });
    }
    nodes.push(Node { id: END_ID.to_owned(), label: END_ID.to_owned(), shape: NodeShape::Terminal });

    let edges = nodes
        .windows(2)
        .map(|pair| Edge { from: pair[0].id.clone(), to: pair[1].id.clone() })
        .collect();

    FlowDiagram { nodes, edges }
}

/// Build and serialize in one step.
#[must_use]
pub fn mermaid(text: &str) -> String {
    build(text).to_mermaid()
}

fn step_id(position: usize) -> String {
    format!("Step{position}")
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
