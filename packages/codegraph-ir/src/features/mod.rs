//! Feature modules, one per pipeline stage (spec §2).
//!
//! `parsing` is the external-collaborator boundary (§6); everything else is
//! a pure function of the CST it hands back.

pub mod flow_graph;
pub mod parameter_analysis;
pub mod parsing;
pub mod pdg;
pub mod slicing;
