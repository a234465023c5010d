//! Program-dependence graph composition (spec §4.5): the union of a
//! CDG's and a DDG's edges over one shared node set. Allocates no nodes.

use crate::features::flow_graph::domain::Graph;

/// Overlay `cdg` and `ddg` (built from the same CFG) into one graph. No
/// deduplication: if both produce an edge between the same pair, the PDG
/// carries both, distinguishable by `kind`.
pub fn construct_pdg(cdg: &Graph, ddg: &Graph) -> Graph {
    let mut pdg = Graph::new();
    for node in cdg.nodes() {
        pdg.add_node(node.clone());
    }
    for edge in cdg.edges() {
        pdg.add_edge(edge.clone());
    }
    for edge in ddg.edges() {
        pdg.add_edge(edge.clone());
    }
    pdg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::features::flow_graph::domain::EdgeKind;
    use crate::features::flow_graph::infrastructure::{find_function, CfgBuilder};
    use crate::features::parsing::{parse, Language};
    use crate::features::pdg::infrastructure::{construct_cdg, construct_ddg};

    #[test]
    fn test_pdg_is_exactly_cdg_union_ddg() {
        let source = "int sum(int n) { int s = 0; int i = 0; while (i < n) { i = i + 1; if (i % 2 == 0) continue; s = s + i; } return s; }";
        let tree = parse(source, Language::C).unwrap();
        let func = find_function(tree.root_node(), source, None).unwrap();
        let mut builder = CfgBuilder::new(source);
        let mut cfg = Graph::new();
        builder.build_function(func, &mut cfg).unwrap();

        let cdg = construct_cdg(&cfg, &Config::default());
        let ddg = construct_ddg(&cfg);
        let pdg = construct_pdg(&cdg, &ddg);

        assert_eq!(pdg.nodes().len(), cfg.nodes().len());
        assert_eq!(pdg.edges().len(), cdg.edges().len() + ddg.edges().len());
        assert!(pdg.edges().iter().all(|e| e.kind == EdgeKind::Cdg || e.kind == EdgeKind::Ddg));
    }
}
