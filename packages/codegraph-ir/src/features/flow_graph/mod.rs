pub mod domain;
pub mod infrastructure;

pub use domain::{Edge, EdgeKind, Graph, Node, NodeId, NodeKind};
