pub mod domain;
pub mod infrastructure;

pub use infrastructure::{parameter_analysis, ParameterInteraction, ParameterSliceResult};
