//! Control-dependence graph construction: the simplified "region" policy
//! of spec §4.3.

use crate::config::Config;
use crate::features::flow_graph::domain::{Edge, EdgeKind, Graph, NodeId, NodeKind};

/// Build the CDG from an already-constructed CFG. Node identity is shared
/// verbatim; no new nodes are allocated.
pub fn construct_cdg(cfg: &Graph, config: &Config) -> Graph {
    let mut cdg = Graph::new();
    for node in cfg.nodes() {
        cdg.add_node(node.clone());
    }

    let Some(root) = cfg.root() else {
        return cdg;
    };

    let mut controlled = std::collections::HashSet::new();
    let branch_nodes: Vec<NodeId> = cfg
        .nodes()
        .iter()
        .filter(|n| n.is_branch)
        .map(|n| n.id)
        .collect();

    for branch_id in &branch_nodes {
        let branch_kind = cfg.node(*branch_id).unwrap().kind.clone();
        for edge in cfg.outgoing(*branch_id, EdgeKind::Cfg) {
            if edge.target == *branch_id {
                continue;
            }
            if !is_true_control_dependency(&branch_kind, &edge.label) {
                continue;
            }
            cdg.add_edge(Edge::new(*branch_id, edge.target, "", EdgeKind::Cdg));
            controlled.insert(edge.target);

            for t in find_transitively_controlled(cfg, edge.target, *branch_id, config.cdg_hop_limit) {
                cdg.add_edge(Edge::new(*branch_id, t, "", EdgeKind::Cdg));
                controlled.insert(t);
            }
        }
    }

    // Anchor every node without a control dependence to the function root
    // so the CDG stays connected (spec §4.3 step 5).
    for node in cfg.nodes() {
        if node.id == root.id || controlled.contains(&node.id) {
            continue;
        }
        let label = if node.is_branch { "branch" } else { "entry" };
        cdg.add_edge(Edge::new(root.id, node.id, label, EdgeKind::Cdg));
    }

    cdg
}

fn is_true_control_dependency(branch_kind: &NodeKind, label: &str) -> bool {
    match branch_kind {
        NodeKind::While | NodeKind::For => label == "Y",
        NodeKind::If => label == "Y" || label == "N",
        NodeKind::Switch => true,
        _ => label == "Y" || label == "N",
    }
}

/// Walk the unique-successor chain from `start`, stopping at a join point
/// (a node with another predecessor) or after `hop_limit` hops.
fn find_transitively_controlled(
    cfg: &Graph,
    start: NodeId,
    original_branch: NodeId,
    hop_limit: usize,
) -> Vec<NodeId> {
    let mut controlled = Vec::new();
    let mut visited = std::collections::HashSet::new();
    let mut current = start;
    let mut depth = 0;

    loop {
        if visited.contains(&current) || depth > hop_limit {
            break;
        }
        visited.insert(current);

        let outgoing: Vec<&Edge> = cfg.outgoing(current, EdgeKind::Cfg).collect();
        if outgoing.len() != 1 {
            break;
        }
        let target = outgoing[0].target;
        if target == original_branch {
            break;
        }

        let has_other_predecessor = cfg
            .incoming(target, EdgeKind::Cfg)
            .any(|e| e.source != current);
        if has_other_predecessor {
            break;
        }

        controlled.push(target);
        current = target;
        depth += 1;
    }

    controlled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::flow_graph::infrastructure::{find_function, CfgBuilder};
    use crate::features::parsing::{parse, Language};

    fn build(source: &str) -> (Graph, Graph) {
        let tree = parse(source, Language::C).unwrap();
        let func = find_function(tree.root_node(), source, None).unwrap();
        let mut builder = CfgBuilder::new(source);
        let mut cfg = Graph::new();
        builder.build_function(func, &mut cfg).unwrap();
        let cdg = construct_cdg(&cfg, &Config::default());
        (cfg, cdg)
    }

    #[test]
    fn test_root_has_no_incoming_cdg_edges() {
        let (cfg, cdg) = build("int add(int a, int b) { int c = a + b; return c; }");
        let root = cfg.root().unwrap();
        assert!(cdg.incoming(root.id, EdgeKind::Cdg).next().is_none());
    }

    #[test]
    fn test_every_non_root_node_has_cdg_predecessor() {
        let (cfg, cdg) = build("int max(int a, int b) { if (a > b) return a; else return b; }");
        let root = cfg.root().unwrap();
        for node in cfg.nodes() {
            if node.id == root.id {
                continue;
            }
            assert!(
                cdg.incoming(node.id, EdgeKind::Cdg).next().is_some(),
                "node {:?} has no CDG in-edge",
                node.kind
            );
        }
    }

    #[test]
    fn test_if_branches_are_control_dependent_on_condition() {
        let (cfg, cdg) = build("int max(int a, int b) { if (a > b) return a; else return b; }");
        let cond = cfg.nodes().iter().find(|n| n.kind == NodeKind::If).unwrap();
        let returns: Vec<&_> = cfg.nodes().iter().filter(|n| n.kind == NodeKind::Return).collect();
        assert_eq!(returns.len(), 2);
        for r in returns {
            assert!(cdg.incoming(r.id, EdgeKind::Cdg).any(|e| e.source == cond.id));
        }
    }

    #[test]
    fn test_while_only_y_edge_is_control_dependency() {
        let (cfg, cdg) = build("int f(int n) { int s = 0; while (n > 0) { s = s + n; n = n - 1; } return s; }");
        let header = cfg.nodes().iter().find(|n| n.kind == NodeKind::While).unwrap();
        // the statement after the loop (return s) must NOT be control dependent on the header
        let ret = cfg.nodes().iter().find(|n| n.kind == NodeKind::Return).unwrap();
        assert!(!cdg.incoming(ret.id, EdgeKind::Cdg).any(|e| e.source == header.id));
    }
}
