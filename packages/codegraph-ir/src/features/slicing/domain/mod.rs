//! Pure graph algorithms over an already-built PDG (spec §4.6).
//!
//! Every function here is a fixpoint over `Graph::edges()`; none of them
//! touch a CST or a parser. Grounded in `original_source/slice/slicer.py`'s
//! `_backward_slice` / `_forward_slice` (recursive edge-following over the
//! combined CDG ∪ DDG edge set) and `slice_by_function_call`'s combination
//! step.

use std::collections::BTreeSet;

use crate::features::flow_graph::domain::{Graph, Node, NodeId, NodeKind};

/// Every node whose text contains the literal substring `"<callee>("`
/// (spec §4.6 "Find call-sites").
pub fn find_call_sites(pdg: &Graph, callee: &str) -> BTreeSet<NodeId> {
    let needle = format!("{callee}(");
    pdg.nodes()
        .iter()
        .filter(|n| n.text.contains(&needle))
        .map(|n| n.id)
        .collect()
}

/// Transitive closure over the PDG following edges *against* their
/// direction: start from `seeds`, and for every edge `p -> q` with `q` in
/// the slice, add `p`.
pub fn backward_slice(pdg: &Graph, seeds: &BTreeSet<NodeId>) -> BTreeSet<NodeId> {
    fixpoint(pdg, seeds, |source, target| (target, source))
}

/// Symmetric to [`backward_slice`]: for every edge `p -> q` with `p` in the
/// slice, add `q`.
pub fn forward_slice(pdg: &Graph, seeds: &BTreeSet<NodeId>) -> BTreeSet<NodeId> {
    fixpoint(pdg, seeds, |source, target| (source, target))
}

/// `backward(seed) ∪ forward(seed) ∪ backward(forward(seed) \ backward(seed))`
/// — the public "slice-by-function-call" combination (spec §4.6).
pub fn combined_slice(pdg: &Graph, seeds: &BTreeSet<NodeId>) -> BTreeSet<NodeId> {
    let backward = backward_slice(pdg, seeds);
    let forward = forward_slice(pdg, seeds);
    let forward_only: BTreeSet<NodeId> = forward.difference(&backward).copied().collect();
    let forward_deps = if forward_only.is_empty() {
        BTreeSet::new()
    } else {
        backward_slice(pdg, &forward_only)
    };
    backward
        .into_iter()
        .chain(forward)
        .chain(forward_deps)
        .collect()
}

/// Statements on a definition/control path between `source` and `target`:
/// `backward(target) ∩ forward(source)`. Not part of spec.md's exposed
/// surfaces; a direct generalization of the two primitives above (see
/// SPEC_FULL.md §4.6).
pub fn chop(pdg: &Graph, source: &BTreeSet<NodeId>, target: &BTreeSet<NodeId>) -> BTreeSet<NodeId> {
    let reaches_target = backward_slice(pdg, target);
    let reachable_from_source = forward_slice(pdg, source);
    reaches_target
        .intersection(&reachable_from_source)
        .copied()
        .collect()
}

/// For every variable in `uses ∪ defs` across `selected`, pull in any node
/// that defines that variable and has an empty `uses` set — a pure
/// declaration like `int x;` (spec §4.6 "Declaration closure").
pub fn declaration_closure(pdg: &Graph, selected: &BTreeSet<NodeId>) -> BTreeSet<NodeId> {
    let mut needed_vars: BTreeSet<String> = BTreeSet::new();
    for id in selected {
        if let Some(node) = pdg.node(*id) {
            needed_vars.extend(node.defs.iter().cloned());
            needed_vars.extend(node.uses.iter().cloned());
        }
    }

    let mut closed = selected.clone();
    for node in pdg.nodes() {
        if node.uses.is_empty() && !node.defs.is_empty() && !node.defs.is_disjoint(&needed_vars) {
            closed.insert(node.id);
        }
    }
    closed
}

/// Textual rendering of `selected`, in source order, wrapped in the
/// function's signature and braces (spec §4.6 "Emission"). The
/// `function_definition` node itself is never re-emitted as a body line —
/// its text supplies the signature.
pub fn emit_slice(pdg: &Graph, selected: &BTreeSet<NodeId>) -> String {
    let signature = pdg
        .root()
        .map(|r| r.text.clone())
        .unwrap_or_else(|| "void function()".to_string());

    let body: Vec<&Node> = pdg
        .nodes_in_source_order()
        .into_iter()
        .filter(|n| n.kind != NodeKind::FunctionDefinition && selected.contains(&n.id))
        .collect();

    let mut out = String::new();
    out.push_str(&signature);
    out.push_str(" {\n");
    for node in body {
        out.push_str("    ");
        out.push_str(&node.text);
        out.push('\n');
    }
    out.push('}');
    out
}

fn fixpoint(
    pdg: &Graph,
    seeds: &BTreeSet<NodeId>,
    project: impl Fn(NodeId, NodeId) -> (NodeId, NodeId),
) -> BTreeSet<NodeId> {
    let mut slice: BTreeSet<NodeId> = seeds.clone();
    let mut frontier: Vec<NodeId> = seeds.iter().copied().collect();

    while let Some(id) = frontier.pop() {
        for edge in pdg.edges() {
            let (from, to) = project(edge.source, edge.target);
            if from == id && slice.insert(to) {
                frontier.push(to);
            }
        }
    }

    slice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::features::flow_graph::infrastructure::{find_function, CfgBuilder};
    use crate::features::parsing::{parse, Language};
    use crate::features::pdg::infrastructure::{construct_cdg, construct_ddg, construct_pdg};
    use pretty_assertions::assert_eq;

    fn build_pdg(source: &str) -> Graph {
        let tree = parse(source, Language::C).unwrap();
        let func = find_function(tree.root_node(), source, None).unwrap();
        let mut builder = CfgBuilder::new(source);
        let mut cfg = Graph::new();
        builder.build_function(func, &mut cfg).unwrap();
        let cdg = construct_cdg(&cfg, &Config::default());
        let ddg = construct_ddg(&cfg);
        construct_pdg(&cdg, &ddg)
    }

    #[test]
    fn test_backward_slice_is_idempotent() {
        let source = "int sum(int n) { int s = 0; int i = 0; while (i < n) { i = i + 1; if (i % 2 == 0) continue; s = s + i; } return s; }";
        let pdg = build_pdg(source);
        let ret = pdg.nodes().iter().find(|n| n.kind == NodeKind::Return).unwrap();
        let seeds: BTreeSet<NodeId> = [ret.id].into_iter().collect();
        let once = backward_slice(&pdg, &seeds);
        let twice = backward_slice(&pdg, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_forward_slice_is_idempotent() {
        let source = "int max(int a, int b) { if (a > b) return a; else return b; }";
        let pdg = build_pdg(source);
        let cond = pdg.nodes().iter().find(|n| n.kind == NodeKind::If).unwrap();
        let seeds: BTreeSet<NodeId> = [cond.id].into_iter().collect();
        let once = forward_slice(&pdg, &seeds);
        let twice = forward_slice(&pdg, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_call_site_slice_contains_callee() {
        let source = "int f(int x) { int y = x + 1; if (g(y)) return y; return -1; }";
        let pdg = build_pdg(source);
        let seeds = find_call_sites(&pdg, "g");
        assert_eq!(seeds.len(), 1);
        let combined = combined_slice(&pdg, &seeds);
        let sliced_text = emit_slice(&pdg, &declaration_closure(&pdg, &combined));
        assert!(sliced_text.contains("g("));
    }

    #[test]
    fn test_combined_slice_scenario_five() {
        let source = "int f(int x) { int y = x + 1; if (g(y)) return y; return -1; }";
        let pdg = build_pdg(source);
        let seeds = find_call_sites(&pdg, "g");
        let combined = combined_slice(&pdg, &seeds);
        let closed = declaration_closure(&pdg, &combined);
        let text = emit_slice(&pdg, &closed);
        assert!(text.contains("int y = x + 1;"));
        assert!(text.contains("if (g(y))"));
        assert!(text.contains("return y;"));
        assert!(text.contains("return -1;"));
    }

    #[test]
    fn test_declaration_closure_pulls_in_pure_declarations() {
        let source = "int f() { int x; x = 1; return x; }";
        let pdg = build_pdg(source);
        let ret = pdg.nodes().iter().find(|n| n.kind == NodeKind::Return).unwrap();
        let seeds: BTreeSet<NodeId> = [ret.id].into_iter().collect();
        let backward = backward_slice(&pdg, &seeds);
        let closed = declaration_closure(&pdg, &backward);
        let decl = pdg
            .nodes()
            .iter()
            .find(|n| n.uses.is_empty() && n.defs.contains("x"))
            .unwrap();
        assert!(closed.contains(&decl.id));
    }
}
