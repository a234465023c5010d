//! The two exposed slicing surfaces (spec §6): `slice_by_function_call` and
//! `slice_by_variable`. Both take raw source text and a [`Language`],
//! running the whole construction pipeline internally — callers never see
//! the intermediate CFG/CDG/DDG/PDG.
//!
//! Grounded in `original_source/slice/slicer.py::FunctionSlicer` (the
//! call-site path) and `original_source/slicer/function_slice.py`'s
//! `FunctionLevelSlicer` (the variable fallback, used when no PDG edge
//! reaches a use of the variable directly).

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::config::Config;
use crate::features::flow_graph::domain::Graph;
use crate::features::flow_graph::infrastructure::{find_function, CfgBuilder};
use crate::features::parsing::{has_error, parse, Language};
use crate::features::pdg::infrastructure::{construct_cdg, construct_ddg, construct_pdg};
use crate::features::slicing::domain::{
    combined_slice, declaration_closure, emit_slice, find_call_sites,
};
use crate::shared::Result;

/// Parses, finds the target function, and builds its PDG — the shared
/// front half of both slicing surfaces and the parameter analyzer. A
/// syntax error or a missing function both yield `Ok(None)` (spec §7:
/// slicing APIs "return nothing and signal failure without aborting").
pub(crate) fn build_pdg(source: &str, language: Language, function_name: Option<&str>) -> Result<Option<Graph>> {
    let tree = parse(source, language)?;
    if has_error(&tree) {
        warn!("build_pdg: syntax error in source, returning no slice");
        return Ok(None);
    }
    let Some(func_node) = find_function(tree.root_node(), source, function_name) else {
        return Ok(None);
    };

    let mut builder = CfgBuilder::new(source);
    let mut cfg = Graph::new();
    builder.build_function(func_node, &mut cfg)?;

    let config = Config::default();
    let cdg = construct_cdg(&cfg, &config);
    let ddg = construct_ddg(&cfg);
    Ok(Some(construct_pdg(&cdg, &ddg)))
}

/// Slice every function in `source` by every call site of `callee`, scoped
/// to the first function tree-sitter finds (spec §4.6 "scope: one function
/// definition per analysis"). Returns `Ok(None)` when either the source has
/// no function or no call site mentions `callee` — a missing target is not
/// an error (spec §7).
pub fn slice_by_function_call(
    source: &str,
    language: Language,
    callee: &str,
) -> Result<Option<String>> {
    let Some(pdg) = build_pdg(source, language, None)? else {
        return Ok(None);
    };

    let seeds = find_call_sites(&pdg, callee);
    if seeds.is_empty() {
        debug!("slice_by_function_call: no call site for {callee}");
        return Ok(None);
    }
    debug!("slice_by_function_call: {} call site(s) for {callee}", seeds.len());

    let combined = combined_slice(&pdg, &seeds);
    let closed = declaration_closure(&pdg, &combined);
    Ok(Some(emit_slice(&pdg, &closed)))
}

/// Fallback slicer used when a caller wants every statement touching
/// `variable`, independent of any particular call site (spec §4.6
/// "slice-by-variable"). Seeds on every node whose `defs`/`uses` mention
/// `variable`, then runs the same backward/forward/declaration-closure
/// pipeline, bounded by `Config::slice_by_variable_iteration_limit` passes
/// over the seed set to reach a fixpoint on variables touched
/// transitively through control dependence.
pub fn slice_by_variable(source: &str, language: Language, variable: &str) -> Result<String> {
    let Some(pdg) = build_pdg(source, language, None)? else {
        return Ok(String::new());
    };

    let config = Config::default();
    let mut tracked: BTreeSet<String> = [variable.to_string()].into_iter().collect();
    let mut selected: BTreeSet<_> = BTreeSet::new();

    for _ in 0..config.slice_by_variable_iteration_limit {
        let seeds: BTreeSet<_> = pdg
            .nodes()
            .iter()
            .filter(|n| n.defs.iter().any(|v| tracked.contains(v)) || n.uses.iter().any(|v| tracked.contains(v)))
            .map(|n| n.id)
            .collect();

        if seeds.is_empty() {
            break;
        }

        let combined = combined_slice(&pdg, &seeds);
        let closed = declaration_closure(&pdg, &combined);

        if closed == selected {
            break;
        }
        selected = closed;

        let mut next_tracked = tracked.clone();
        for id in &selected {
            if let Some(node) = pdg.node(*id) {
                next_tracked.extend(node.defs.iter().cloned());
                next_tracked.extend(node.uses.iter().cloned());
            }
        }
        if next_tracked == tracked {
            break;
        }
        tracked = next_tracked;
    }

    if selected.is_empty() {
        return Ok(String::new());
    }

    Ok(emit_slice(&pdg, &selected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_by_function_call_finds_seed_and_deps() {
        let source = "int f(int x) { int y = x + 1; if (g(y)) return y; return -1; }";
        let result = slice_by_function_call(source, Language::C, "g").unwrap();
        let text = result.expect("call site present");
        assert!(text.contains("g("));
        assert!(text.contains("int y = x + 1;"));
    }

    #[test]
    fn test_slice_by_function_call_missing_callee_is_none() {
        let source = "int f(int x) { return x; }";
        let result = slice_by_function_call(source, Language::C, "never_called").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_slice_by_function_call_no_function_is_none() {
        let source = "int x;";
        let result = slice_by_function_call(source, Language::C, "g").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_slice_by_variable_follows_reassignment() {
        let source = "int f() { int a = 1; int b = a + 1; int c = 2; return b; }";
        let text = slice_by_variable(source, Language::C, "a").unwrap();
        assert!(text.contains("int a = 1;"));
        assert!(text.contains("int b = a + 1;"));
        assert!(!text.contains("int c = 2;"));
    }

    #[test]
    fn test_slice_by_variable_unused_variable_is_empty() {
        let source = "int f() { int a = 1; return 0; }";
        let text = slice_by_variable(source, Language::C, "nonexistent").unwrap();
        assert!(text.is_empty());
    }
}
