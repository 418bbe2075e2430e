pub mod evaluator;
pub mod messages;
pub mod stats;

pub use evaluator::OutcomeEvaluator;
pub use messages::format_outcome_message;
pub use stats::ResolutionStats;
