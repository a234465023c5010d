//! Error types for codegraph-ir
//!
//! Unified error handling across the parsing, flow-graph, dependence, and
//! slicing passes.

use thiserror::Error;

/// Main error type for codegraph-ir operations.
///
/// Per spec: syntax errors and missing-target outcomes are *not* represented
/// here — they are legal `Ok` values (`Ok(Graph::default())`, `Ok(None)`,
/// `Ok(String::new())`). Only parser back-end failures and genuinely
/// unexpected CST shapes become `Err`.
#[derive(Debug, Error)]
pub enum CodegraphError {
    /// CST parsing errors (grammar load failure, parser returned no tree).
    #[error("parse error: {0}")]
    Parse(String),

    /// CFG construction errors (malformed function shape).
    #[error("cfg error: {0}")]
    Cfg(String),

    /// CDG construction errors.
    #[error("cdg error: {0}")]
    Cdg(String),

    /// DDG construction errors.
    #[error("ddg error: {0}")]
    Ddg(String),

    /// PDG composition errors.
    #[error("pdg error: {0}")]
    Pdg(String),

    /// Slicing errors.
    #[error("slicing error: {0}")]
    Slicing(String),

    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),

    /// Internal invariant violations (unexpected CST shape, recursion bound
    /// exceeded beyond what the recovery policy can paper over).
    #[error("internal error: {0}")]
    Internal(String),
}

impl CodegraphError {
    pub fn parse(msg: impl Into<String>) -> Self {
        CodegraphError::Parse(msg.into())
    }

    pub fn cfg(msg: impl Into<String>) -> Self {
        CodegraphError::Cfg(msg.into())
    }

    pub fn cdg(msg: impl Into<String>) -> Self {
        CodegraphError::Cdg(msg.into())
    }

    pub fn ddg(msg: impl Into<String>) -> Self {
        CodegraphError::Ddg(msg.into())
    }

    pub fn pdg(msg: impl Into<String>) -> Self {
        CodegraphError::Pdg(msg.into())
    }

    pub fn slicing(msg: impl Into<String>) -> Self {
        CodegraphError::Slicing(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        CodegraphError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        CodegraphError::Internal(msg.into())
    }
}

/// Result type alias for codegraph operations.
pub type Result<T> = std::result::Result<T, CodegraphError>;
