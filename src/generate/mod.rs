//! Trait selection: weighted sampling and uniqueness-seeking combination generation.

/// Full trait combinations and the uniqueness-seeking generator.
pub mod combination;
/// Weighted draw over one category.
pub mod sampler;
