//! Thin wrapper over the tree-sitter C/C++ grammars.
//!
//! Downstream passes never touch `tree_sitter::Parser` directly; they call
//! [`parse`] and consume the resulting `Tree`/`Node` through the shared
//! utilities in `crate::shared::utils::tree_sitter`.

use tree_sitter::{Parser, Tree};

use crate::shared::{CodegraphError, Result};

/// The two concrete-syntax grammars this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    C,
    Cpp,
}

impl Language {
    fn grammar(self) -> tree_sitter::Language {
        match self {
            Language::C => tree_sitter_c::language(),
            Language::Cpp => tree_sitter_cpp::language(),
        }
    }
}

/// Parse `source` with the given language, returning the resulting CST.
///
/// A parser instance is never shared across calls: some tree-sitter
/// language backends are not thread-safe, so each call gets its own.
pub fn parse(source: &str, language: Language) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&language.grammar())
        .map_err(|e| CodegraphError::internal(format!("failed to load grammar: {e}")))?;
    parser
        .parse(source, None)
        .ok_or_else(|| CodegraphError::parse("tree-sitter returned no tree"))
}

/// True if the parsed tree contains any syntax error node.
pub fn has_error(tree: &Tree) -> bool {
    tree.root_node().has_error()
}
