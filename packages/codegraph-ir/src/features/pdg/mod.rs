pub mod infrastructure;

pub use infrastructure::{construct_cdg, construct_ddg, construct_pdg};
