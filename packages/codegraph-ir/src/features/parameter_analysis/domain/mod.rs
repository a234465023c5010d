//! Pure parameter-interaction algorithms over an already-built PDG
//! (spec §4.7). Grounded in
//! `original_source/slicer/slicer_core.py::perform_parameter_slice_analysis`:
//! the Python walks a line-level dependency graph; this walks the same
//! PDG the slicing feature already builds, reusing its backward/forward
//! primitives instead of re-deriving line reachability.

use std::collections::BTreeSet;

use crate::features::flow_graph::domain::{Graph, NodeId, NodeKind};
use crate::features::slicing::domain::{backward_slice, forward_slice};

/// The earliest (by source line) node where `param` is used but not also
/// (re)defined in the same node — the classic "first use" seed for a
/// per-parameter forward slice. Returns `None` when the parameter is never
/// read (e.g. an unused parameter, or one only ever overwritten).
pub fn first_use_without_define(pdg: &Graph, param: &str) -> Option<NodeId> {
    pdg.nodes()
        .iter()
        .filter(|n| n.kind != NodeKind::FunctionDefinition)
        .filter(|n| n.uses.contains(param) && !n.defs.contains(param))
        .min_by_key(|n| n.line)
        .map(|n| n.id)
}

/// Forward slice of `param` from its first use-without-define (spec §4.7
/// "per-parameter forward slice"). Empty when the parameter is never used.
pub fn parameter_forward_slice(pdg: &Graph, param: &str) -> BTreeSet<NodeId> {
    match first_use_without_define(pdg, param) {
        Some(seed) => forward_slice(pdg, &[seed].into_iter().collect()),
        None => BTreeSet::new(),
    }
}

/// Every `return_statement` node in the graph.
pub fn return_nodes(pdg: &Graph) -> BTreeSet<NodeId> {
    pdg.nodes()
        .iter()
        .filter(|n| n.kind == NodeKind::Return)
        .map(|n| n.id)
        .collect()
}

/// Union of the backward slice from every return statement (spec §4.7
/// "return slice"): every statement any returned value transitively
/// depends on.
pub fn return_backward_slice(pdg: &Graph) -> BTreeSet<NodeId> {
    let returns = return_nodes(pdg);
    if returns.is_empty() {
        return BTreeSet::new();
    }
    backward_slice(pdg, &returns)
}

/// Lines, within `param`'s forward slice, where some other parameter is
/// redefined — a witness that `param`'s value reaches and overwrites that
/// other parameter (spec §4.7 "parameter interactions").
pub fn interaction_witness_lines(pdg: &Graph, param_forward_slice: &BTreeSet<NodeId>, other_param: &str) -> Vec<u32> {
    let mut lines: Vec<u32> = param_forward_slice
        .iter()
        .filter_map(|id| pdg.node(*id))
        .filter(|n| n.defs.contains(other_param))
        .map(|n| n.line)
        .collect();
    lines.sort_unstable();
    lines.dedup();
    lines
}
