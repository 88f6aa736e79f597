//! Mermaid `graph TD` serialization for [`FlowDiagram`].

use std::fmt::Write;

use super::{FlowDiagram, Node, NodeShape};

const INDENT: &str = "    ";

/// Serialize a flowchart as Mermaid source.
///
/// Node declarations come first, then a blank line, then edges in path order.
#[must_use]
pub fn to_mermaid(diagram: &FlowDiagram) -> String {
    let mut out = String::from("graph TD\n");

    for node in &diagram.nodes {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{INDENT}{}", node_decl(node));
        if node.id == super::END_ID {
            out.push('\n');
        }
    }

    for edge in &diagram.edges {
        let _ = writeln!(out, "{INDENT}{} --> {}", edge.from, edge.to);
    }

    out
}

fn node_decl(node: &Node) -> String {
    match node.shape {
        NodeShape::Terminal => format!("{}([{}])", node.id, node.label),
        NodeShape::Process => format!("{}[\"{}\"]", node.id, node.label),
    }
}
