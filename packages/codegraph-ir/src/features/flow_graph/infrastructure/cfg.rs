//! Recursive, syntax-directed CFG lowering (spec §4.2).
//!
//! `build` mirrors the source's `create_cfg`: it threads a pending
//! predecessor set (`in_nodes`) through each construct and returns the
//! pending successors (`out_nodes`). It additionally returns `entry_ids`,
//! the node(s) that directly receive whatever `in_nodes` was supplied —
//! needed so `do_statement` can wire its condition's `Y` edge straight to
//! the body's first statement without a sentinel node.

use std::collections::HashMap;

use tree_sitter::Node as TsNode;

use crate::features::flow_graph::domain::{Edge, EdgeKind, Graph, NodeId};
use crate::features::flow_graph::infrastructure::node_builder::build_node;
use crate::shared::utils::tree_sitter::extract_node_text;
use crate::shared::{CodegraphError, Result};

/// A pending predecessor: the id of a node already placed in the graph,
/// plus the label the eventual edge into the next node should carry.
type InEdge = (NodeId, String);

pub struct CfgBuilder<'a> {
    source: &'a str,
    spans: HashMap<(usize, usize), NodeId>,
    next_id: NodeId,
}

impl<'a> CfgBuilder<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            spans: HashMap::new(),
            next_id: 0,
        }
    }

    fn intern(&mut self, ts_node: &TsNode) -> NodeId {
        let key = (ts_node.start_byte(), ts_node.end_byte());
        if let Some(id) = self.spans.get(&key) {
            return *id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.spans.insert(key, id);
        id
    }

    /// Get-or-create the graph node for `ts_node`, interning its span.
    fn make_node(&mut self, ts_node: &TsNode, graph: &mut Graph, force_branch: bool) -> NodeId {
        let id = self.intern(ts_node);
        if graph.node(id).is_none() {
            graph.add_node(build_node(id, *ts_node, self.source, force_branch));
        }
        id
    }

    fn wire_incoming(&self, in_nodes: &[InEdge], target: NodeId, graph: &mut Graph) {
        for (src, label) in in_nodes {
            graph.add_edge(Edge::new(*src, target, label.clone(), EdgeKind::Cfg));
        }
    }

    /// Build the CFG for a whole function; `func_node` is the CST
    /// `function_definition` node. Returns the root node id.
    pub fn build_function(&mut self, func_node: TsNode<'a>, graph: &mut Graph) -> Result<NodeId> {
        let root_id = self.make_node(&func_node, graph, false);
        let body = func_node
            .child_by_field_name("body")
            .ok_or_else(|| CodegraphError::cfg("function definition has no body"))?;
        self.build(body, &[(root_id, String::new())], graph);
        Ok(root_id)
    }

    /// Recursive dispatcher. Returns `(out_nodes, entry_ids)`.
    fn build(
        &mut self,
        ts_node: TsNode<'a>,
        in_nodes: &[InEdge],
        graph: &mut Graph,
    ) -> (Vec<InEdge>, Vec<NodeId>) {
        if ts_node.child_count() == 0 || in_nodes.is_empty() {
            return (in_nodes.to_vec(), Vec::new());
        }

        match ts_node.kind() {
            "compound_statement" => self.build_compound(ts_node, in_nodes, graph),
            "if_statement" => self.build_if(ts_node, in_nodes, graph),
            "while_statement" | "for_statement" => self.build_loop(ts_node, in_nodes, graph),
            "switch_statement" => self.build_switch(ts_node, in_nodes, graph),
            "case_statement" => self.build_case(ts_node, in_nodes, graph),
            "do_statement" => self.build_do(ts_node, in_nodes, graph),
            "return_statement" | "break_statement" | "continue_statement" => {
                let id = self.make_node(&ts_node, graph, false);
                self.wire_incoming(in_nodes, id, graph);
                (Vec::new(), vec![id])
            }
            _ => {
                let id = self.make_node(&ts_node, graph, false);
                self.wire_incoming(in_nodes, id, graph);
                (vec![(id, String::new())], vec![id])
            }
        }
    }

    fn build_compound(
        &mut self,
        node: TsNode<'a>,
        in_nodes: &[InEdge],
        graph: &mut Graph,
    ) -> (Vec<InEdge>, Vec<NodeId>) {
        let mut pending = in_nodes.to_vec();
        let mut entry_ids: Option<Vec<NodeId>> = None;
        for i in 0..node.child_count() {
            let Some(child) = node.child(i) else { continue };
            let (out, entries) = self.build(child, &pending, graph);
            if entry_ids.is_none() && !entries.is_empty() {
                entry_ids = Some(entries);
            }
            pending = out;
        }
        (pending, entry_ids.unwrap_or_default())
    }

    fn build_if(
        &mut self,
        node: TsNode<'a>,
        in_nodes: &[InEdge],
        graph: &mut Graph,
    ) -> (Vec<InEdge>, Vec<NodeId>) {
        let cond_id = self.make_node(&node, graph, false);
        self.wire_incoming(in_nodes, cond_id, graph);

        let consequence = node.child_by_field_name("consequence").unwrap();
        let (then_out, _) = self.build(consequence, &[(cond_id, "Y".to_string())], graph);

        let out_nodes = match node.child_by_field_name("alternative") {
            Some(alt) => {
                let (else_out, _) = self.build(alt, &[(cond_id, "N".to_string())], graph);
                [then_out, else_out].concat()
            }
            None => {
                let mut out = then_out;
                out.push((cond_id, "N".to_string()));
                out
            }
        };

        (out_nodes, vec![cond_id])
    }

    fn build_loop(
        &mut self,
        node: TsNode<'a>,
        in_nodes: &[InEdge],
        graph: &mut Graph,
    ) -> (Vec<InEdge>, Vec<NodeId>) {
        let header_id = self.make_node(&node, graph, false);
        self.wire_incoming(in_nodes, header_id, graph);

        let body = node.child_by_field_name("body").unwrap();
        let (body_out, _) = self.build(body, &[(header_id, "Y".to_string())], graph);

        // Back-edges: every body exit re-enters the header. Attached to
        // the header's *incoming* list, per spec §9's resolved open question.
        for (out_id, _) in &body_out {
            graph.add_edge(Edge::new(*out_id, header_id, String::new(), EdgeKind::Cfg));
        }

        let (break_nodes, continue_nodes) = collect_break_continue(&node);
        for c in &continue_nodes {
            let cid = self.intern(c);
            graph.add_edge(Edge::new(cid, header_id, String::new(), EdgeKind::Cfg));
        }

        let mut out_nodes = vec![(header_id, "N".to_string())];
        for b in &break_nodes {
            let bid = self.intern(b);
            out_nodes.push((bid, String::new()));
        }

        (out_nodes, vec![header_id])
    }

    /// `do { body } while (cond);` The body runs first; `cond`'s `Y` arm
    /// loops back to the body's own entry, never to itself — the source's
    /// continue-self-loop defect (spec §9) is not reproduced here.
    fn build_do(
        &mut self,
        node: TsNode<'a>,
        in_nodes: &[InEdge],
        graph: &mut Graph,
    ) -> (Vec<InEdge>, Vec<NodeId>) {
        let body = node.child_by_field_name("body").unwrap();
        let (body_out, body_entries) = self.build(body, in_nodes, graph);

        let cond = node.child_by_field_name("condition").unwrap();
        let cond_id = self.make_node(&cond, graph, true);
        self.wire_incoming(&body_out, cond_id, graph);

        for entry in &body_entries {
            graph.add_edge(Edge::new(cond_id, *entry, "Y".to_string(), EdgeKind::Cfg));
        }

        let (break_nodes, continue_nodes) = collect_break_continue(&node);
        for c in &continue_nodes {
            let cid = self.intern(c);
            graph.add_edge(Edge::new(cid, cond_id, String::new(), EdgeKind::Cfg));
        }

        let mut out_nodes = vec![(cond_id, "N".to_string())];
        for b in &break_nodes {
            let bid = self.intern(b);
            out_nodes.push((bid, String::new()));
        }

        (out_nodes, vec![cond_id])
    }

    fn build_switch(
        &mut self,
        node: TsNode<'a>,
        in_nodes: &[InEdge],
        graph: &mut Graph,
    ) -> (Vec<InEdge>, Vec<NodeId>) {
        let switch_id = self.make_node(&node, graph, false);
        self.wire_incoming(in_nodes, switch_id, graph);

        let Some(body) = node.child_by_field_name("body") else {
            return (vec![(switch_id, String::new())], vec![switch_id]);
        };

        // Every top-level case_statement gets a direct edge from the switch
        // (spec §3/§4.2: switch arms are labelled "case <value>"), in
        // addition to the fall-through edge threaded from the previous
        // case's own "N" out-node when it lacks a break.
        let mut pending: Vec<InEdge> = Vec::new();
        for i in 0..body.child_count() {
            let Some(child) = body.child(i) else { continue };
            if !child.is_named() {
                continue;
            }
            if child.kind() == "case_statement" {
                let mut in_edges = vec![(switch_id, case_switch_label(&child, self.source))];
                in_edges.extend(pending.iter().cloned());
                let (out, _) = self.build(child, &in_edges, graph);
                pending = out;
            } else {
                let (out, _) = self.build(child, &pending, graph);
                pending = out;
            }
        }

        let mut body_out = pending;
        let (break_nodes, _) = collect_break_continue(&node);
        for b in &break_nodes {
            let bid = self.intern(b);
            body_out.push((bid, String::new()));
        }

        (body_out, vec![switch_id])
    }

    fn build_case(
        &mut self,
        node: TsNode<'a>,
        in_nodes: &[InEdge],
        graph: &mut Graph,
    ) -> (Vec<InEdge>, Vec<NodeId>) {
        let case_id = self.make_node(&node, graph, false);
        self.wire_incoming(in_nodes, case_id, graph);

        let is_case_with_value = node.child(0).map(|c| c.kind() == "case").unwrap_or(false);
        let skip = if is_case_with_value { 3 } else { 2 };
        let mut pending = if is_case_with_value {
            vec![(case_id, "Y".to_string())]
        } else {
            vec![(case_id, String::new())]
        };

        for i in skip..node.child_count() {
            let Some(stmt) = node.child(i) else { continue };
            let (out, _) = self.build(stmt, &pending, graph);
            pending = out;
        }

        if is_case_with_value {
            pending.push((case_id, "N".to_string()));
        }

        (pending, vec![case_id])
    }
}

/// The switch-arm CFG label for a `case_statement` child: `"case <value>"`
/// for a value-bearing case (spec §3), `"default"` for the catch-all arm.
fn case_switch_label(case_node: &TsNode, source: &str) -> String {
    match case_node.child_by_field_name("value") {
        Some(value) => format!("case {}", extract_node_text(&value, source)),
        None => "default".to_string(),
    }
}

/// Collect `break_statement`/`continue_statement` descendants of `node`,
/// not descending into a nested `for`/`while`/`switch` (those own their
/// break/continue targets).
fn collect_break_continue<'a>(node: &TsNode<'a>) -> (Vec<TsNode<'a>>, Vec<TsNode<'a>>) {
    let mut breaks = Vec::new();
    let mut continues = Vec::new();
    for i in 0..node.child_count() {
        let Some(child) = node.child(i) else { continue };
        match child.kind() {
            "break_statement" => breaks.push(child),
            "continue_statement" => continues.push(child),
            "for_statement" | "while_statement" | "switch_statement" => {}
            _ => {
                let (b, c) = collect_break_continue(&child);
                breaks.extend(b);
                continues.extend(c);
            }
        }
    }
    (breaks, continues)
}

/// Find the single `function_definition` in `root`, optionally by name.
/// With no name, the first function in source order is used.
pub fn find_function<'a>(
    root: TsNode<'a>,
    source: &str,
    function_name: Option<&str>,
) -> Option<TsNode<'a>> {
    let mut stack = vec![root];
    let mut candidates = Vec::new();
    while let Some(current) = stack.pop() {
        if current.kind() == "function_definition" {
            candidates.push(current);
        }
        for i in (0..current.child_count()).rev() {
            if let Some(child) = current.child(i) {
                stack.push(child);
            }
        }
    }
    candidates.reverse();

    match function_name {
        None => candidates.into_iter().next(),
        Some(name) => candidates.into_iter().find(|f| declarator_name_matches(f, source, name)),
    }
}

fn declarator_name_matches(func_node: &TsNode, source: &str, name: &str) -> bool {
    let Some(declarator) = func_node.child_by_field_name("declarator") else {
        return false;
    };
    let mut stack = vec![declarator];
    while let Some(current) = stack.pop() {
        if current.kind() == "identifier" && extract_node_text(&current, source) == name {
            return true;
        }
        if current.kind() == "function_declarator" {
            if let Some(inner) = current.child_by_field_name("declarator") {
                stack.push(inner);
                continue;
            }
        }
        for i in 0..current.child_count() {
            if let Some(child) = current.child(i) {
                stack.push(child);
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::flow_graph::domain::NodeKind;
    use crate::features::parsing::{parse, Language};

    fn build_cfg(source: &str) -> Graph {
        let tree = parse(source, Language::C).unwrap();
        let func = find_function(tree.root_node(), source, None).unwrap();
        let mut builder = CfgBuilder::new(source);
        let mut graph = Graph::new();
        builder.build_function(func, &mut graph).unwrap();
        graph
    }

    #[test]
    fn test_straight_line_add() {
        let graph = build_cfg("int add(int a, int b) { int c = a + b; return c; }");
        assert_eq!(graph.nodes().len(), 3);
        let root = graph.root().unwrap();
        assert_eq!(root.kind, NodeKind::FunctionDefinition);
        assert!(graph.outgoing(root.id, EdgeKind::Cfg).next().is_none());
    }

    #[test]
    fn test_if_else_has_two_out_edges() {
        let graph = build_cfg("int max(int a, int b) { if (a > b) return a; else return b; }");
        let cond = graph
            .nodes()
            .iter()
            .find(|n| n.kind == NodeKind::If)
            .unwrap();
        let out: Vec<_> = graph.outgoing(cond.id, EdgeKind::Cfg).collect();
        assert_eq!(out.len(), 2);
        let labels: Vec<&str> = out.iter().map(|e| e.label.as_str()).collect();
        assert!(labels.contains(&"Y"));
        assert!(labels.contains(&"N"));
    }

    #[test]
    fn test_while_continue_redirects_to_header() {
        let source = "int sum(int n) { int s = 0; int i = 0; while (i < n) { i = i + 1; if (i % 2 == 0) continue; s = s + i; } return s; }";
        let graph = build_cfg(source);
        let header = graph
            .nodes()
            .iter()
            .find(|n| n.kind == NodeKind::While)
            .unwrap();
        let cont = graph
            .nodes()
            .iter()
            .find(|n| n.kind == NodeKind::Continue)
            .unwrap();
        let incoming: Vec<_> = graph.incoming(header.id, EdgeKind::Cfg).collect();
        assert!(incoming.iter().any(|e| e.source == cont.id));
    }

    #[test]
    fn test_switch_fallthrough_chains_cases() {
        let source = "int grade_to_points(char g) { int p; switch (g) { case 'A': p = 4; break; case 'B': p = 3; break; default: p = 0; } return p; }";
        let graph = build_cfg(source);
        let switch = graph
            .nodes()
            .iter()
            .find(|n| n.kind == NodeKind::Switch)
            .unwrap();
        let out: Vec<_> = graph.outgoing(switch.id, EdgeKind::Cfg).collect();
        assert_eq!(out.len(), 3, "every case and the default arm gets a direct switch edge");
        let labels: Vec<&str> = out.iter().map(|e| e.label.as_str()).collect();
        assert!(labels.contains(&"case 'A'"));
        assert!(labels.contains(&"case 'B'"));
        assert!(labels.contains(&"default"));
        let breaks: Vec<_> = graph
            .nodes()
            .iter()
            .filter(|n| n.kind == NodeKind::Break)
            .collect();
        assert_eq!(breaks.len(), 2);
        for b in breaks {
            assert!(graph.outgoing(b.id, EdgeKind::Cfg).next().is_none());
        }
    }

    #[test]
    fn test_return_break_continue_have_no_outgoing_edges() {
        let graph = build_cfg("int f() { return 1; }");
        let ret = graph
            .nodes()
            .iter()
            .find(|n| n.kind == NodeKind::Return)
            .unwrap();
        assert!(graph.outgoing(ret.id, EdgeKind::Cfg).next().is_none());
    }
}
