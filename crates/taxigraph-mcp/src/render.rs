//! Plain-text renderings of graph state for tool responses

use serde::Deserialize;
use taxigraph_core::{AirportGraph, GraphStats, NodeType, PathOutcome, ValidationReport};

/// Connections listed before the graph summary truncates
pub const MAX_LISTED_CONNECTIONS: usize = 20;

/// What a producer says it has identified so far on a diagram
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisProgress {
    pub airport: String,
    pub runways_found: Vec<String>,
    pub taxiways_found: Vec<String>,
    #[serde(default)]
    pub fbos_found: Vec<String>,
    #[serde(default)]
    pub remaining_work: Option<String>,
}

fn joined_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None yet".to_string()
    } else {
        items.join(", ")
    }
}

/// Nodes grouped by type, then connections by name
pub fn graph_summary(graph: &AirportGraph) -> String {
    if graph.nodes.is_empty() {
        return format!("No nodes found for airport {}", graph.airport);
    }

    let mut lines = vec![
        format!("Graph for {}:", graph.airport),
        format!(
            "Total: {} nodes, {} connections",
            graph.nodes.len(),
            graph.edges.len()
        ),
        String::new(),
    ];

    for node_type in NodeType::ALL {
        let mut nodes: Vec<_> = graph.nodes_of_type(node_type).collect();
        if nodes.is_empty() {
            continue;
        }
        nodes.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        lines.push(format!("{}s:", node_type.label()));
        for node in nodes {
            lines.push(format!(
                "  - {} (id: {}, pos: {:.0},{:.0})",
                node.name, node.id, node.x, node.y
            ));
        }
        lines.push(String::new());
    }

    if !graph.edges.is_empty() {
        let index = graph.node_index();
        let name_of = |id: &str| index.get(id).map_or(id.to_string(), |n| n.name.clone());

        lines.push("Connections:".to_string());
        for edge in graph.edges.iter().take(MAX_LISTED_CONNECTIONS) {
            let hold = if edge.requires_hold { " [HOLD]" } else { "" };
            lines.push(format!(
                "  - {} -> {} via {}{}",
                name_of(&edge.from_id),
                name_of(&edge.to_id),
                edge.via,
                hold
            ));
        }
        if graph.edges.len() > MAX_LISTED_CONNECTIONS {
            lines.push(format!(
                "  ... and {} more",
                graph.edges.len() - MAX_LISTED_CONNECTIONS
            ));
        }
    }

    lines.join("\n").trim_end().to_string()
}

pub fn validation_report(report: &ValidationReport) -> String {
    let mut lines = vec![
        format!("Validation Results for {}:", report.airport),
        format!(
            "Nodes: {}, Connections: {}",
            report.node_count, report.edge_count
        ),
        String::new(),
    ];

    if !report.issues.is_empty() {
        lines.push(format!("## ISSUES ({}):", report.issues.len()));
        lines.extend(report.issues.iter().map(|f| format!("  ❌ {}", f)));
        lines.push(String::new());
    }

    if !report.warnings.is_empty() {
        lines.push(format!("## WARNINGS ({}):", report.warnings.len()));
        lines.extend(report.warnings.iter().map(|f| format!("  ⚠️  {}", f)));
        lines.push(String::new());
    }

    if report.issues.is_empty() && report.warnings.is_empty() {
        lines.push("✅ No issues or warnings found!".to_string());
    } else if report.issues.is_empty() {
        lines.push("✅ No critical issues found (warnings are non-blocking)".to_string());
    }

    lines.join("\n").trim_end().to_string()
}

pub fn path_outcome(from_id: &str, to_id: &str, outcome: &PathOutcome) -> String {
    match outcome {
        PathOutcome::Found(path) => {
            let mut lines = vec![
                format!("Path found from {} to {}:", from_id, to_id),
                String::new(),
                format!("Route: {}", path.route()),
            ];
            if !path.via.is_empty() {
                lines.push(format!("Via: {}", path.via.join(", ")));
            }
            lines.push(format!("Hold short positions: {}", path.hold_count()));
            lines.push(format!("Total distance: {}", path.total_distance));
            lines.push(String::new());
            lines.push("✅ Connectivity verified.".to_string());
            lines.join("\n")
        }
        PathOutcome::NoPath(reason) => [
            format!("❌ No path found from {} to {} ({})", from_id, to_id, reason),
            String::new(),
            "This indicates a connectivity issue. Check:".to_string(),
            "- Are all taxiway intersections connected?".to_string(),
            "- Are there missing connections between areas?".to_string(),
            "- Is the destination node properly connected?".to_string(),
        ]
        .join("\n"),
    }
}

pub fn stats(scope: &str, stats: &GraphStats) -> String {
    let mut lines = vec![
        format!("Graph statistics for {}:", scope),
        format!("Nodes: {}", stats.total_nodes),
    ];
    for (node_type, count) in &stats.nodes_by_type {
        lines.push(format!("  {}: {}", node_type, count));
    }
    lines.push(format!("Connections: {}", stats.total_edges));
    lines.join("\n")
}

/// Progress checklist with a suggested next step, using live store counts
pub fn progress(progress: &AnalysisProgress, stats: &GraphStats) -> String {
    let mut lines = vec![
        format!("Analysis Progress for {}:", progress.airport),
        String::new(),
        "## Elements Identified:".to_string(),
        format!("- Runways: {}", joined_or_none(&progress.runways_found)),
        format!("- Taxiways: {}", joined_or_none(&progress.taxiways_found)),
        format!("- FBOs: {}", joined_or_none(&progress.fbos_found)),
        String::new(),
        "## Graph Status:".to_string(),
        format!("- Nodes created: {}", stats.total_nodes),
        format!("- Connections created: {}", stats.total_edges),
        String::new(),
        "## Remaining Work:".to_string(),
        progress
            .remaining_work
            .clone()
            .unwrap_or_else(|| "Not specified".to_string()),
        String::new(),
        "## Next Steps:".to_string(),
    ];

    if progress.runways_found.is_empty() {
        lines.push("1. Identify all runways first".to_string());
    } else if progress.taxiways_found.is_empty() {
        lines.push("1. Identify all taxiways".to_string());
    } else if stats.total_nodes == 0 {
        lines.push("1. Start creating nodes for identified elements".to_string());
    } else if stats.total_edges == 0 {
        lines.push("1. Create connections between nodes".to_string());
    } else {
        lines.push("1. Continue creating remaining connections".to_string());
        lines.push("2. Verify all hold short positions are marked".to_string());
        lines.push("3. Run validation when complete".to_string());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxigraph_core::{Finding, NoPathReason};

    fn progress_for(runways: &[&str], taxiways: &[&str]) -> AnalysisProgress {
        AnalysisProgress {
            airport: "KTST".to_string(),
            runways_found: runways.iter().map(|s| s.to_string()).collect(),
            taxiways_found: taxiways.iter().map(|s| s.to_string()).collect(),
            fbos_found: Vec::new(),
            remaining_work: None,
        }
    }

    #[test]
    fn test_progress_next_steps() {
        let empty = GraphStats::default();
        let text = progress(&progress_for(&[], &[]), &empty);
        assert!(text.contains("- Runways: None yet"));
        assert!(text.contains("Not specified"));
        assert!(text.ends_with("1. Identify all runways first"));

        let text = progress(&progress_for(&["09/27"], &[]), &empty);
        assert!(text.ends_with("1. Identify all taxiways"));

        let text = progress(&progress_for(&["09/27"], &["A"]), &empty);
        assert!(text.ends_with("1. Start creating nodes for identified elements"));

        let nodes_only = GraphStats {
            total_nodes: 3,
            ..GraphStats::default()
        };
        let text = progress(&progress_for(&["09/27"], &["A"]), &nodes_only);
        assert!(text.ends_with("1. Create connections between nodes"));

        let both = GraphStats {
            total_nodes: 3,
            total_edges: 4,
            ..GraphStats::default()
        };
        let text = progress(&progress_for(&["09/27"], &["A", "B"]), &both);
        assert!(text.contains("- Taxiways: A, B"));
        assert!(text.ends_with("3. Run validation when complete"));
    }

    #[test]
    fn test_validation_footer() {
        let mut report = ValidationReport {
            airport: "KTST".to_string(),
            node_count: 4,
            edge_count: 6,
            issues: Vec::new(),
            warnings: Vec::new(),
        };
        assert!(validation_report(&report).ends_with("No issues or warnings found!"));

        report.warnings.push(Finding::FewNodes { count: 4 });
        let text = validation_report(&report);
        assert!(text.contains("## WARNINGS (1):"));
        assert!(text.ends_with("(warnings are non-blocking)"));

        report.issues.push(Finding::OddRunwayEndCount { count: 1 });
        let text = validation_report(&report);
        assert!(text.contains("## ISSUES (1):"));
        assert!(!text.contains("✅"));
    }

    #[test]
    fn test_no_path_names_reason() {
        let outcome = PathOutcome::NoPath(NoPathReason::UnknownEnd {
            id: "KTST_ghost".to_string(),
        });
        let text = path_outcome("KTST_ramp", "KTST_ghost", &outcome);
        assert!(text.starts_with("❌ No path found from KTST_ramp to KTST_ghost"));
        assert!(text.contains("KTST_ghost"));
    }

    #[test]
    fn test_empty_graph() {
        let text = graph_summary(&AirportGraph::new("KXYZ"));
        assert_eq!(text, "No nodes found for airport KXYZ");
    }
}
