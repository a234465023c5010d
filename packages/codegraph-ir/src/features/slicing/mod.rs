pub mod domain;
pub mod infrastructure;

pub use domain::{backward_slice, chop, combined_slice, declaration_closure, emit_slice, find_call_sites, forward_slice};
pub use infrastructure::{slice_by_function_call, slice_by_variable};
