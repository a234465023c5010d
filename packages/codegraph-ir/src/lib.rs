//! codegraph-ir — intraprocedural control/data/program dependence graphs
//! for C and C++, plus slicing and parameter-interaction analysis built on
//! top of them.
//!
//! Feature-first layout, one module per pipeline stage:
//! - [`features::parsing`]: the only external collaborator (tree-sitter).
//! - [`features::flow_graph`]: CST → CFG (spec §4.2).
//! - [`features::pdg`]: CFG → CDG, CFG → DDG, CDG+DDG → PDG (spec §4.3-§4.5).
//! - [`features::slicing`]: backward/forward/combined slicing over a PDG
//!   (spec §4.6), and the two source-to-source slicing surfaces.
//! - [`features::parameter_analysis`]: per-parameter forward slices, the
//!   return-statement backward slice, and parameter-interaction witnesses
//!   (spec §4.7).
//!
//! Three functions at this crate's root are the whole public contract: the
//! graph-construction API, the slicer API, and the parameter-analyzer API.
//! Everything else is an implementation detail reachable only because Rust
//! has no private-to-crate-but-testable visibility short of `pub`.

pub mod config;
pub mod features;
pub mod shared;

pub use config::Config;
pub use features::flow_graph::domain::{Edge, EdgeKind, Graph, Node, NodeId, NodeKind};
pub use features::parameter_analysis::{parameter_analysis, ParameterInteraction, ParameterSliceResult};
pub use features::parsing::Language;
pub use features::slicing::{slice_by_function_call, slice_by_variable};
pub use shared::{CodegraphError, Result};

use tracing::{debug, warn};

use features::flow_graph::infrastructure::{find_function, CfgBuilder};
use features::parsing::{has_error, parse};
use features::pdg::infrastructure::{construct_cdg as build_cdg, construct_ddg as build_ddg, construct_pdg as build_pdg};

/// Parse `source` and build the control-flow graph of one function (spec
/// §4.2). `function_name` of `None` selects the first function tree-sitter
/// finds. Returns `Ok(Graph::default())`, not an error, when no function
/// matches (spec §7) or when the parse tree carries a syntax error (spec
/// §7's "graph-construction API returns an empty graph and surfaces the
/// condition" policy — surfaced here as a `warn!`, not an `Err`, since a
/// syntax error is a legal, non-fatal outcome).
pub fn construct_cfg(source: &str, language: Language, function_name: Option<&str>) -> Result<Graph> {
    debug!("construct_cfg: function_name={:?}, {} bytes of source", function_name, source.len());
    let tree = parse(source, language)?;
    if has_error(&tree) {
        warn!("construct_cfg: syntax error in source, returning empty graph");
        return Ok(Graph::default());
    }
    let Some(func_node) = find_function(tree.root_node(), source, function_name) else {
        debug!("construct_cfg: no matching function, returning empty graph");
        return Ok(Graph::default());
    };

    let mut builder = CfgBuilder::new(source);
    let mut graph = Graph::new();
    builder.build_function(func_node, &mut graph)?;
    Ok(graph)
}

/// Build the control-dependence graph of one function (spec §4.3): the CFG
/// plus, for every branch, an edge to each node it transitively controls.
pub fn construct_cdg(source: &str, language: Language, function_name: Option<&str>, config: &Config) -> Result<Graph> {
    let cfg = construct_cfg(source, language, function_name)?;
    Ok(build_cdg(&cfg, config))
}

/// Build the data-dependence graph of one function (spec §4.4): an edge
/// from every definition/use site to every line it reaches without an
/// intervening redefinition.
pub fn construct_ddg(source: &str, language: Language, function_name: Option<&str>) -> Result<Graph> {
    let cfg = construct_cfg(source, language, function_name)?;
    Ok(build_ddg(&cfg))
}

/// Build the program-dependence graph of one function (spec §4.5): CDG
/// edges union DDG edges over shared node identity.
pub fn construct_pdg(source: &str, language: Language, function_name: Option<&str>, config: &Config) -> Result<Graph> {
    let cfg = construct_cfg(source, language, function_name)?;
    let cdg = build_cdg(&cfg, config);
    let ddg = build_ddg(&cfg);
    let pdg = build_pdg(&cdg, &ddg);
    debug!("construct_pdg: {} nodes, {} edges", pdg.nodes().len(), pdg.edges().len());
    Ok(pdg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct_cfg_on_simple_function() {
        let source = "int f(int x) { return x + 1; }";
        let cfg = construct_cfg(source, Language::C, None).unwrap();
        assert!(cfg.root().is_some());
    }

    #[test]
    fn test_construct_cfg_missing_function_is_default() {
        let source = "int x;";
        let cfg = construct_cfg(source, Language::C, None).unwrap();
        assert!(cfg.nodes().is_empty());
    }

    #[test]
    fn test_construct_pdg_end_to_end() {
        let source = "int f(int x) { int y = x + 1; return y; }";
        let pdg = construct_pdg(source, Language::C, None, &Config::default()).unwrap();
        assert!(pdg.edges().iter().any(|e| e.kind == EdgeKind::Ddg));
    }

    #[test]
    fn test_slice_by_function_call_surface() {
        let source = "int f(int x) { int y = x + 1; if (g(y)) return y; return -1; }";
        let slice = slice_by_function_call(source, Language::C, "g").unwrap();
        assert!(slice.is_some());
    }

    #[test]
    fn test_parameter_analysis_surface() {
        let source = "int f(int a, int b) { b = a; return b; }";
        let result = parameter_analysis(source, Language::C, None).unwrap();
        assert_eq!(result.function_parameters, vec!["a", "b"]);
    }
}
