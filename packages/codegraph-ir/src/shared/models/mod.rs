pub mod error;
pub mod span;

pub use error::{CodegraphError, Result};
pub use span::{Location, Span};
