pub mod cfg;
pub mod node_builder;

pub use cfg::{find_function, CfgBuilder};
