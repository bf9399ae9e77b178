//! Bounds on the work done per template

/// Engine configuration, passed explicitly to every walking operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// maximum number of occurrences visited for a single template
    /// before the walk is abandoned and reported
    pub max_walk: usize,
}

impl Limits {
    pub const DEFAULT_MAX_WALK: usize = 10_000;
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_walk: Self::DEFAULT_MAX_WALK }
    }
}
