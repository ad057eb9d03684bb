/// Targeting Engine
///
/// Decides whether a customer is eligible for a piece of advertising content.
///
/// # Architecture
/// - **Predicate layer**: a closed set of eligibility rules, each evaluating
///   to a tri-state result against the request context
/// - **Evaluator layer**: concurrent per-predicate evaluation with an
///   all-must-hold fold per targeting group
/// - **Translation layer**: attribute-map wire shape ↔ internal predicates
pub mod comparison;
pub mod evaluator;
pub mod predicate;
pub mod translate;

pub use comparison::Comparison;
pub use evaluator::TargetingEvaluator;
pub use predicate::{PredicateDeps, PredicateKind, PredicateResult, TargetingPredicate};
pub use translate::{predicate_from_dto, predicate_to_dto, TargetingPredicateDto};
