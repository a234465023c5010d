//! Tree-sitter utility functions
//!
//! Small helpers for walking a tree-sitter CST and pulling text/position
//! information out of it. Shared by the node builder and the CFG builder.

use crate::shared::models::Span;
use tree_sitter::Node;

/// Find a direct child node by kind.
#[inline]
pub fn find_child_by_kind<'a>(node: &'a Node, kind: &str) -> Option<Node<'a>> {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.kind() == kind {
                return Some(child);
            }
        }
    }
    None
}

/// Find a child node by kind recursively (depth-first, pre-order).
pub fn find_descendant_by_kind<'a>(node: &'a Node, kind: &str) -> Option<Node<'a>> {
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

/// Find all descendants by kind, in pre-order.
pub fn find_descendants_by_kind<'a>(node: &'a Node, kind: &str) -> Vec<Node<'a>> {
    let mut result = Vec::new();
    let mut stack = vec![*node];
    while let Some(current) = stack.pop() {
        if current.kind() == kind {
            result.push(current);
        }
        for i in (0..current.child_count()).rev() {
            if let Some(child) = current.child(i) {
                stack.push(child);
            }
        }
    }
    result.reverse();
    result
}

/// Extract text content from a node.
#[inline]
pub fn extract_node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    let start = node.start_byte();
    let end = node.end_byte();
    &source[start..end]
}

/// Extract text content from a node as an owned String.
#[inline]
pub fn extract_node_text_owned(node: &Node, source: &str) -> String {
    extract_node_text(node, source).to_string()
}

/// Convert a tree-sitter node's position to a 1-indexed Span.
#[inline]
pub fn node_to_span(node: &Node) -> Span {
    let start_pos = node.start_position();
    let end_pos = node.end_position();

    Span::new(
        start_pos.row as u32 + 1,
        start_pos.column as u32,
        end_pos.row as u32 + 1,
        end_pos.column as u32,
    )
}

/// 1-based source line of a node's first token.
#[inline]
pub fn node_line(node: &Node) -> u32 {
    node.start_position().row as u32 + 1
}
