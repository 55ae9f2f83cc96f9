/// Beat opacity and offset evaluation.
pub mod engine;
/// Beat definitions and the shipped set.
pub mod model;
