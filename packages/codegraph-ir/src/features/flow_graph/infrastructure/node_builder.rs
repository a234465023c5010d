//! Lifts a CST subtree into an analysis [`Node`], including def/use
//! extraction (spec §4.1).

use std::collections::BTreeSet;

use tree_sitter::Node as TsNode;

use crate::features::flow_graph::domain::{Node, NodeId, NodeKind};
use crate::shared::utils::tree_sitter::{extract_node_text, extract_node_text_owned, node_line};

/// Functions that write through their `&variable` argument; an identifier
/// passed this way counts as a definition (spec §4.1 rule 5).
const SCANF_FAMILY: &[&str] = &["scanf", "fscanf", "sscanf", "gets", "fgets"];

/// Build the analysis `Node` for `ts_node`.
///
/// `force_branch` is set for the condition child of a `do_statement`: its
/// own CST kind carries no branch marker, only its position does.
pub fn build_node(id: NodeId, ts_node: TsNode, source: &str, force_branch: bool) -> Node {
    let kind = NodeKind::from_cst_kind(ts_node.kind());
    let line = node_line(&ts_node);
    let text = node_text(&ts_node, &kind, source);
    let is_branch = force_branch || default_is_branch(&kind);

    let mut node = Node::new(id, kind.clone(), line, text, is_branch);
    let (defs, uses) = def_use_info(&ts_node, &kind, source);
    node.defs = defs;
    node.uses = uses;
    node
}

fn default_is_branch(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::If | NodeKind::While | NodeKind::For | NodeKind::Case
    )
}

/// `text` rules from spec §3 / §4.1.
fn node_text(ts_node: &TsNode, kind: &NodeKind, source: &str) -> String {
    match kind {
        NodeKind::FunctionDefinition => {
            let declarator = ts_node.child_by_field_name("declarator");
            let type_node = ts_node.child_by_field_name("type");
            match (type_node, declarator) {
                (Some(t), Some(d)) => format!(
                    "{} {}",
                    extract_node_text(&t, source),
                    extract_node_text(&d, source)
                ),
                (None, Some(d)) => extract_node_text_owned(&d, source),
                _ => "function".to_string(),
            }
        }
        NodeKind::If | NodeKind::While | NodeKind::For | NodeKind::Switch => {
            let body = if matches!(kind, NodeKind::If) {
                ts_node.child_by_field_name("consequence")
            } else {
                ts_node.child_by_field_name("body")
            };
            prefix_before(ts_node, body, source)
        }
        NodeKind::Case => {
            if let Some(colon) = find_colon_child(ts_node) {
                source[ts_node.start_byte()..colon.end_byte()]
                    .trim()
                    .to_string()
            } else {
                extract_node_text_owned(ts_node, source)
            }
        }
        _ => extract_node_text_owned(ts_node, source),
    }
}

fn prefix_before(ts_node: &TsNode, boundary: Option<TsNode>, source: &str) -> String {
    match boundary {
        Some(b) => source[ts_node.start_byte()..b.start_byte()]
            .trim_end()
            .to_string(),
        None => extract_node_text_owned(ts_node, source),
    }
}

fn find_colon_child<'a>(node: &TsNode<'a>) -> Option<TsNode<'a>> {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.kind() == ":" {
                return Some(child);
            }
        }
    }
    None
}

/// Def/use extraction, dispatched by kind per spec §4.1.
fn def_use_info(ts_node: &TsNode, kind: &NodeKind, source: &str) -> (BTreeSet<String>, BTreeSet<String>) {
    match kind {
        NodeKind::FunctionDefinition => function_signature_def_use(ts_node, source),
        NodeKind::If | NodeKind::While | NodeKind::Switch => {
            branch_condition_def_use(ts_node, kind, source)
        }
        NodeKind::For => for_statement_def_use(ts_node, source),
        _ => generic_def_use(ts_node, source),
    }
}

/// Only the parameter list is scanned; every parameter identifier is a
/// definition.
fn function_signature_def_use(ts_node: &TsNode, source: &str) -> (BTreeSet<String>, BTreeSet<String>) {
    let mut defs = BTreeSet::new();
    let uses = BTreeSet::new();
    if let Some(declarator) = find_descendant_kind(ts_node, "function_declarator") {
        if let Some(params) = find_descendant_kind(&declarator, "parameter_list") {
            for ident in collect_identifiers(&params) {
                defs.insert(extract_node_text_owned(&ident, source));
            }
        }
    }
    (defs, uses)
}

/// Scan only the condition sub-tree of an if/while/switch.
fn branch_condition_def_use(
    ts_node: &TsNode,
    kind: &NodeKind,
    source: &str,
) -> (BTreeSet<String>, BTreeSet<String>) {
    let field = match kind {
        NodeKind::Switch => "value",
        _ => "condition",
    };
    if let Some(condition) = ts_node.child_by_field_name(field) {
        return classify_region(&[condition], source);
    }
    // Fallback: scan every child up to the body/consequence.
    let body = if matches!(kind, NodeKind::If) {
        ts_node.child_by_field_name("consequence")
    } else {
        ts_node.child_by_field_name("body")
    };
    let children = children_before(ts_node, body);
    classify_region(&children, source)
}

/// `for` scans init + condition + update, stopping at the body.
fn for_statement_def_use(ts_node: &TsNode, source: &str) -> (BTreeSet<String>, BTreeSet<String>) {
    let body = ts_node.child_by_field_name("body");
    let children = children_before(ts_node, body);
    classify_region(&children, source)
}

/// Ordinary statements: scan the whole subtree.
fn generic_def_use(ts_node: &TsNode, source: &str) -> (BTreeSet<String>, BTreeSet<String>) {
    classify_region(&[*ts_node], source)
}

fn children_before<'a>(node: &TsNode<'a>, boundary: Option<TsNode<'a>>) -> Vec<TsNode<'a>> {
    let mut out = Vec::new();
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if let Some(b) = boundary {
                if child.id() == b.id() {
                    break;
                }
            }
            out.push(child);
        }
    }
    out
}

/// Classify every identifier in `region` as def/use, then apply the
/// conservative call-argument rule (spec §4.1 rule 6) to every
/// `call_expression` reachable within the same region.
fn classify_region(region: &[TsNode], source: &str) -> (BTreeSet<String>, BTreeSet<String>) {
    let mut defs = BTreeSet::new();
    let mut uses = BTreeSet::new();

    for node in region {
        for ident in collect_identifiers(node) {
            let name = extract_node_text_owned(&ident, source);
            if is_update_expression_operand(&ident) {
                defs.insert(name.clone());
                uses.insert(name);
            } else if is_definition(&ident, source) {
                defs.insert(name);
            } else {
                uses.insert(name);
            }
        }
        for call in find_descendants_kind(node, "call_expression") {
            for var in call_argument_variables(&call, source) {
                defs.insert(var.clone());
                uses.insert(var);
            }
        }
    }

    (defs, uses)
}

/// All `identifier` descendants, excluding one that is the callee name of
/// a `call_expression` (its immediate parent).
fn collect_identifiers<'a>(node: &TsNode<'a>) -> Vec<TsNode<'a>> {
    let mut out = Vec::new();
    let mut stack = vec![*node];
    while let Some(current) = stack.pop() {
        if current.kind() == "identifier" {
            let is_callee = current
                .parent()
                .map(|p| p.kind() == "call_expression")
                .unwrap_or(false);
            if !is_callee {
                out.push(current);
            }
        }
        for i in (0..current.child_count()).rev() {
            if let Some(child) = current.child(i) {
                stack.push(child);
            }
        }
    }
    out.reverse();
    out
}

fn find_descendant_kind<'a>(node: &TsNode<'a>, kind: &str) -> Option<TsNode<'a>> {
    let mut stack = vec![*node];
    while let Some(current) = stack.pop() {
        if current.kind() == kind {
            return Some(current);
        }
        for i in (0..current.child_count()).rev() {
            if let Some(child) = current.child(i) {
                stack.push(child);
            }
        }
    }
    None
}

fn find_descendants_kind<'a>(node: &TsNode<'a>, kind: &str) -> Vec<TsNode<'a>> {
    let mut out = Vec::new();
    let mut stack = vec![*node];
    while let Some(current) = stack.pop() {
        if current.kind() == kind {
            out.push(current);
        }
        for i in (0..current.child_count()).rev() {
            if let Some(child) = current.child(i) {
                stack.push(child);
            }
        }
    }
    out.reverse();
    out
}

/// Rule 4 (spec §4.1): the operand of `++`/`--` counts as both a definition
/// and a use, unlike every other rule which is exclusively one or the
/// other. Checked ahead of [`is_definition`] so `classify_region` can add
/// the identifier to both sets.
fn is_update_expression_operand(identifier: &TsNode) -> bool {
    identifier
        .parent()
        .map(|p| p.kind() == "update_expression")
        .unwrap_or(false)
}

/// Def/use classification rules from spec §4.1, in order, first match wins.
fn is_definition(identifier: &TsNode, source: &str) -> bool {
    let Some(parent) = identifier.parent() else {
        return false;
    };

    match parent.kind() {
        "declaration" => return true,
        "init_declarator" => {
            return parent
                .child_by_field_name("declarator")
                .map(|d| contains_node(&d, identifier))
                .unwrap_or(false);
        }
        "parameter_declaration" => return true,
        "array_declarator" => {
            if let Some(grandparent) = parent.parent() {
                if grandparent.kind() == "parameter_declaration" {
                    return true;
                }
            }
        }
        "assignment_expression" => {
            if let Some(left) = parent.child_by_field_name("left") {
                if contains_node(&left, identifier) {
                    return true;
                }
            }
        }
        "update_expression" => return true,
        "unary_expression" | "pointer_expression" => {
            if parent.child(0).map(|op| extract_node_text(&op, source) == "&").unwrap_or(false)
                && is_scanf_family_argument(&parent, source)
            {
                return true;
            }
        }
        _ => {}
    }

    false
}

fn is_scanf_family_argument(addr_of_expr: &TsNode, source: &str) -> bool {
    let Some(argument_list) = addr_of_expr.parent() else {
        return false;
    };
    if argument_list.kind() != "argument_list" {
        return false;
    }
    let Some(call) = argument_list.parent() else {
        return false;
    };
    if call.kind() != "call_expression" {
        return false;
    }
    call.child_by_field_name("function")
        .map(|f| SCANF_FAMILY.contains(&extract_node_text(&f, source)))
        .unwrap_or(false)
}

fn contains_node(ancestor: &TsNode, target: &TsNode) -> bool {
    if ancestor.id() == target.id() {
        return true;
    }
    for i in 0..ancestor.child_count() {
        if let Some(child) = ancestor.child(i) {
            if contains_node(&child, target) {
                return true;
            }
        }
    }
    false
}

/// Variables passed to a call's argument list, excluding string/numeric
/// literals — conservative over-approximation (spec §4.1 rule 6).
fn call_argument_variables(call: &TsNode, source: &str) -> BTreeSet<String> {
    let mut vars = BTreeSet::new();
    let Some(args) = call.child_by_field_name("arguments") else {
        return vars;
    };
    for i in 0..args.child_count() {
        let Some(arg) = args.child(i) else { continue };
        if arg.kind() == "," {
            continue;
        }
        for ident in collect_identifiers(&arg) {
            let name = extract_node_text_owned(&ident, source);
            if !name.is_empty() && !name.starts_with('"') && !name.chars().all(|c| c.is_ascii_digit()) {
                vars.insert(name);
            }
        }
    }
    vars
}
