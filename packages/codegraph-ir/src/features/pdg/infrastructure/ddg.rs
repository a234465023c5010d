//! Data-dependence graph construction (spec §4.4): a line-order
//! approximation of reaching definitions over the CFG's node set. Nodes
//! on the same source line are not a tie — they're ordered by `NodeId`
//! (CST pre-order), so same-line def/use pairs still get an edge
//! (spec §5: "ties broken by CST pre-order").

use std::collections::BTreeSet;

use crate::features::flow_graph::domain::{Edge, EdgeKind, Graph};

/// Build the DDG from an already-constructed CFG.
pub fn construct_ddg(cfg: &Graph) -> Graph {
    let mut ddg = Graph::new();
    for node in cfg.nodes() {
        ddg.add_node(node.clone());
    }

    let ordered = cfg.nodes_in_source_order();

    for x in &ordered {
        for y in &ordered {
            if (x.line, x.id) >= (y.line, y.id) {
                continue;
            }

            let def_use: BTreeSet<String> = x.defs.intersection(&y.uses).cloned().collect();
            let use_def: BTreeSet<String> = x.uses.intersection(&y.defs).cloned().collect();
            let def_def: BTreeSet<String> = x.defs.intersection(&y.defs).cloned().collect();

            for variables in [def_use, use_def, def_def] {
                if variables.is_empty() {
                    continue;
                }
                if has_definition_clear_path(cfg, (x.line, x.id), (y.line, y.id), &variables) {
                    ddg.add_edge(
                        Edge::new(x.id, y.id, "", EdgeKind::Ddg).with_variables(variables),
                    );
                }
            }
        }
    }

    ddg
}

/// No intervening node strictly between `start` and `end` in the total
/// `(line, id)` source order may redefine any variable in `variables`
/// (spec §4.4's line-order approximation, ties broken by CST pre-order
/// per spec §5).
fn has_definition_clear_path(cfg: &Graph, start: (u32, usize), end: (u32, usize), variables: &BTreeSet<String>) -> bool {
    for node in cfg.nodes() {
        let pos = (node.line, node.id);
        if start < pos && pos < end && !variables.is_disjoint(&node.defs) {
            return false;
        }
    }
    true
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
        let ddg = construct_ddg(&cfg);
        (cfg, ddg)
    }

    #[test]
    fn test_straight_line_def_use_edge() {
        let (cfg, ddg) = build("int add(int a, int b) { int c = a + b; return c; }");
        let decl = cfg
            .nodes()
            .iter()
            .find(|n| n.defs.contains("c"))
            .unwrap();
        let ret = cfg
            .nodes()
            .iter()
            .find(|n| n.uses.contains("c") && n.kind == crate::features::flow_graph::domain::NodeKind::Return)
            .unwrap();
        let edge = ddg
            .outgoing(decl.id, EdgeKind::Ddg)
            .find(|e| e.target == ret.id)
            .unwrap();
        assert!(edge.variables.contains("c"));
    }

    #[test]
    fn test_every_edge_witness_set_is_nonempty_subset() {
        let (cfg, ddg) = build(
            "int sum(int n) { int s = 0; int i = 0; while (i < n) { i = i + 1; if (i % 2 == 0) continue; s = s + i; } return s; }",
        );
        for edge in ddg.edges() {
            assert!(!edge.variables.is_empty());
            let source = cfg.node(edge.source).unwrap();
            let target = cfg.node(edge.target).unwrap();
            let union: BTreeSet<String> = source
                .defs
                .union(&target.defs)
                .chain(source.uses.iter())
                .chain(target.uses.iter())
                .cloned()
                .collect();
            assert!(edge.variables.is_subset(&union));
        }
    }

    #[test]
    fn test_redefinition_blocks_dependence() {
        // x is redefined between the first def and the final use, so the
        // direct edge from the first definition must not appear.
        let source = "int f() {\n    int x = 1;\n    x = 2;\n    return x;\n}";
        let (cfg, ddg) = build(source);
        let first_def = cfg.nodes().iter().find(|n| n.line == 2).unwrap();
        let ret = cfg
            .nodes()
            .iter()
            .find(|n| n.kind == crate::features::flow_graph::domain::NodeKind::Return)
            .unwrap();
        assert!(ddg
            .outgoing(first_def.id, EdgeKind::Ddg)
            .find(|e| e.target == ret.id)
            .is_none());
    }
}
