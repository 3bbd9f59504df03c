pub mod awards;
pub mod catalog;
pub mod evaluator;
pub mod points;
pub mod reconciler;
pub mod trigger;
