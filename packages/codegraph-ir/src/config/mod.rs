//! Tunable bounds for the recursion/fixpoint passes.
//!
//! Kept deliberately tiny: the pipeline is a pure function of its input
//! source, so there is no configuration file format to parse, only a
//! handful of recursion guards the caller may want to adjust.

/// Bounds shared across the CDG, DDG, and slicing passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Hop limit for the CDG's transitive-controlled-node walk (§4.3).
    pub cdg_hop_limit: usize,
    /// Iteration cap for `slice_by_variable`'s dependency-closure loop.
    pub slice_by_variable_iteration_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cdg_hop_limit: 10,
            slice_by_variable_iteration_limit: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let cfg = Config::default();
        assert_eq!(cfg.cdg_hop_limit, 10);
        assert_eq!(cfg.slice_by_variable_iteration_limit, 10);
    }
}
