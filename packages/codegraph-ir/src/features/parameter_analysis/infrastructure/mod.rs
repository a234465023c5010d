//! Exposes `parameter_analysis` (spec §6's third surface): given a source
//! file, a language, and an optional function name, produce a per-parameter
//! forward slice, a return-statement backward slice, and every
//! parameter-to-parameter interaction witnessed in the body.
//!
//! Parameter *order* matters here in a way the rest of the crate does not
//! care about, so extraction walks the `parameter_list` CST directly
//! rather than going through `Node::defs` (a `BTreeSet`, alphabetized).
//! Grounded in `original_source/slicer/slicer_core.py::extract_function_parameters`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tree_sitter::Node as TsNode;

use crate::features::flow_graph::infrastructure::find_function;
use crate::features::parameter_analysis::domain::{
    interaction_witness_lines, parameter_forward_slice, return_backward_slice,
};
use crate::features::parsing::{parse, Language};
use crate::features::slicing::domain::{declaration_closure, emit_slice};
use crate::features::slicing::infrastructure::build_pdg;
use crate::shared::utils::tree_sitter::{extract_node_text_owned, find_descendant_by_kind, find_descendants_by_kind};
use crate::shared::Result;

/// One witnessed interaction between two parameters: every line in
/// `source_parameter`'s forward slice that redefines `target_parameter`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInteraction {
    pub source_parameter: String,
    pub target_parameter: String,
    pub witness_lines: Vec<u32>,
}

/// Full result of a parameter-interaction analysis (spec §4.7).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterSliceResult {
    /// Parameter names, in declaration order.
    pub function_parameters: Vec<String>,
    /// Per-parameter forward-slice code fragment, keyed by parameter name.
    pub parameter_slices: BTreeMap<String, String>,
    /// Backward slice of every return statement, as a single code fragment.
    pub return_slice: String,
    /// Every (ordered) pair of parameters with a non-empty witness set.
    pub parameter_interactions: Vec<ParameterInteraction>,
}

/// Parameter names, in the order they appear in `function_declarator`'s
/// `parameter_list` (spec §4.7 "parameter order is the declared order").
fn extract_parameters(func_node: TsNode, source: &str) -> Vec<String> {
    let Some(declarator) = find_descendant_by_kind(&func_node, "function_declarator") else {
        return Vec::new();
    };
    let Some(params) = find_descendant_by_kind(&declarator, "parameter_list") else {
        return Vec::new();
    };

    find_descendants_by_kind(&params, "parameter_declaration")
        .into_iter()
        .filter_map(|decl| {
            find_descendants_by_kind(&decl, "identifier")
                .into_iter()
                .next()
                .map(|ident| extract_node_text_owned(&ident, source))
        })
        .collect()
}

/// Run the full parameter-interaction analysis on `source` (spec §6's
/// third surface). `function_name` of `None` selects the first function
/// tree-sitter finds, matching the other two surfaces' default scoping.
///
/// A source with no matching function yields a default (empty) result, not
/// an error — consistent with the "missing target is a legal `Ok`" policy
/// (spec §7).
pub fn parameter_analysis(
    source: &str,
    language: Language,
    function_name: Option<&str>,
) -> Result<ParameterSliceResult> {
    let tree = parse(source, language)?;
    if crate::features::parsing::has_error(&tree) {
        return Ok(ParameterSliceResult::default());
    }
    let Some(func_node) = find_function(tree.root_node(), source, function_name) else {
        return Ok(ParameterSliceResult::default());
    };

    let parameters = extract_parameters(func_node, source);

    let Some(pdg) = build_pdg(source, language, function_name)? else {
        return Ok(ParameterSliceResult::default());
    };

    let mut parameter_slices = BTreeMap::new();
    let mut forward_slices: BTreeMap<String, _> = BTreeMap::new();
    for param in &parameters {
        let forward = parameter_forward_slice(&pdg, param);
        if !forward.is_empty() {
            let closed = declaration_closure(&pdg, &forward);
            parameter_slices.insert(param.clone(), emit_slice(&pdg, &closed));
        }
        forward_slices.insert(param.clone(), forward);
    }

    let return_backward = return_backward_slice(&pdg);
    let return_slice = if return_backward.is_empty() {
        String::new()
    } else {
        let closed = declaration_closure(&pdg, &return_backward);
        emit_slice(&pdg, &closed)
    };

    let mut parameter_interactions = Vec::new();
    for source_param in &parameters {
        let forward = &forward_slices[source_param];
        if forward.is_empty() {
            continue;
        }
        for target_param in &parameters {
            if source_param == target_param {
                continue;
            }
            let witnesses = interaction_witness_lines(&pdg, forward, target_param);
            if !witnesses.is_empty() {
                parameter_interactions.push(ParameterInteraction {
                    source_parameter: source_param.clone(),
                    target_parameter: target_param.clone(),
                    witness_lines: witnesses,
                });
            }
        }
    }

    Ok(ParameterSliceResult {
        function_parameters: parameters,
        parameter_slices,
        return_slice,
        parameter_interactions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_order_is_declaration_order() {
        let source = "int f(int z, int a, int m) { return z + a + m; }";
        let result = parameter_analysis(source, Language::C, None).unwrap();
        assert_eq!(result.function_parameters, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_return_slice_present_for_every_parameter_used_in_return() {
        let source = "int f(int a, int b) { int c = a + b; return c; }";
        let result = parameter_analysis(source, Language::C, None).unwrap();
        assert!(result.return_slice.contains("int c = a + b;"));
        assert!(result.return_slice.contains("return c;"));
    }

    #[test]
    fn test_parameter_interaction_detected_scenario_six() {
        let source = "int f(int a, int b) { b = a; return b; }";
        let result = parameter_analysis(source, Language::C, None).unwrap();
        assert!(result
            .parameter_interactions
            .iter()
            .any(|i| i.source_parameter == "a" && i.target_parameter == "b"));
    }

    #[test]
    fn test_unused_parameter_has_no_slice() {
        let source = "int f(int used, int unused) { return used; }";
        let result = parameter_analysis(source, Language::C, None).unwrap();
        assert!(!result.parameter_slices.contains_key("unused"));
        assert!(result.parameter_slices.contains_key("used"));
    }

    #[test]
    fn test_missing_function_is_default_result() {
        let source = "int x;";
        let result = parameter_analysis(source, Language::C, None).unwrap();
        assert!(result.function_parameters.is_empty());
    }
}
