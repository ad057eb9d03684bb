use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::Comparison;
use crate::clients::{CustomerClient, PrimeBenefitClient};
use crate::error::Result;
use crate::models::RequestContext;

/// Outcome of evaluating a targeting predicate. `Indeterminate` means the
/// predicate could not be evaluated (missing upstream data); it is never
/// treated as a passing result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredicateResult {
    True,
    False,
    Indeterminate,
}

impl PredicateResult {
    pub fn is_true(self) -> bool {
        matches!(self, PredicateResult::True)
    }

    /// The logical inverse. Inverting "unknown" is still "unknown", so
    /// `Indeterminate` maps to itself.
    pub fn invert(self) -> Self {
        match self {
            PredicateResult::True => PredicateResult::False,
            PredicateResult::False => PredicateResult::True,
            PredicateResult::Indeterminate => PredicateResult::Indeterminate,
        }
    }
}

impl From<bool> for PredicateResult {
    fn from(value: bool) -> Self {
        if value {
            PredicateResult::True
        } else {
            PredicateResult::False
        }
    }
}

/// The collaborators predicate evaluation reads from, shared across all
/// concurrent evaluations of one selection request.
#[derive(Clone)]
pub struct PredicateDeps {
    pub customer: Arc<dyn CustomerClient>,
    pub prime: Arc<dyn PrimeBenefitClient>,
}

/// One eligibility rule of a targeting group. The variant set is closed; each
/// variant evaluates itself against the request context, and `negate` inverts
/// the raw outcome as a final step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetingPredicate {
    #[serde(default)]
    pub negate: bool,
    #[serde(flatten)]
    pub kind: PredicateKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredicateKind {
    /// Customer's estimated age range equals the target.
    Age { age_range: String },
    /// Number of purchases in a category compared against a target.
    CategorySpendFrequency {
        category: String,
        comparison: Comparison,
        target_purchases: i32,
    },
    /// Rounded USD spent in a category compared against a target.
    CategorySpendValue {
        category: String,
        comparison: Comparison,
        target_value: i32,
    },
    /// Customer holds the named prime benefit.
    PrimeBenefit { benefit: String },
    /// Customer's profile indicates parental status.
    Parent,
    /// A non-blank customer id was supplied with the request.
    Recognized,
}

impl TargetingPredicate {
    pub fn new(kind: PredicateKind) -> Self {
        Self {
            negate: false,
            kind,
        }
    }

    pub fn negated(kind: PredicateKind) -> Self {
        Self { negate: true, kind }
    }

    /// Evaluate against the request context, applying `negate` last.
    ///
    /// Collaborator transport failures are hard errors; missing upstream data
    /// resolves to `Indeterminate`.
    pub async fn evaluate(
        &self,
        ctx: &RequestContext,
        deps: &PredicateDeps,
    ) -> Result<PredicateResult> {
        let raw = self.evaluate_raw(ctx, deps).await?;
        Ok(if self.negate { raw.invert() } else { raw })
    }

    async fn evaluate_raw(
        &self,
        ctx: &RequestContext,
        deps: &PredicateDeps,
    ) -> Result<PredicateResult> {
        let customer_id = match ctx.customer_id() {
            Some(id) => id,
            // Only the recognized predicate can decide anything about an
            // unrecognized customer.
            None => {
                return Ok(match self.kind {
                    PredicateKind::Recognized => PredicateResult::False,
                    _ => PredicateResult::Indeterminate,
                })
            }
        };

        match &self.kind {
            PredicateKind::Recognized => Ok(PredicateResult::True),

            PredicateKind::Age { age_range } => {
                let profile = deps.customer.customer_profile(customer_id).await?;
                Ok(match profile.and_then(|p| p.age_range) {
                    Some(observed) => observed.eq_ignore_ascii_case(age_range).into(),
                    None => PredicateResult::Indeterminate,
                })
            }

            PredicateKind::Parent => {
                let profile = deps.customer.customer_profile(customer_id).await?;
                Ok(match profile.and_then(|p| p.is_parent) {
                    Some(is_parent) => is_parent.into(),
                    None => PredicateResult::Indeterminate,
                })
            }

            PredicateKind::CategorySpendFrequency {
                category,
                comparison,
                target_purchases,
            } => {
                let spend = deps
                    .customer
                    .spend_by_category(customer_id, ctx.marketplace_id())
                    .await?;
                Ok(match spend.get(category) {
                    Some(observed) => comparison
                        .holds(observed.number_of_purchases, *target_purchases)
                        .into(),
                    None => PredicateResult::Indeterminate,
                })
            }

            PredicateKind::CategorySpendValue {
                category,
                comparison,
                target_value,
            } => {
                let spend = deps
                    .customer
                    .spend_by_category(customer_id, ctx.marketplace_id())
                    .await?;
                Ok(match spend.get(category) {
                    Some(observed) => comparison.holds(observed.usd_spent, *target_value).into(),
                    None => PredicateResult::Indeterminate,
                })
            }

            PredicateKind::PrimeBenefit { benefit } => {
                let benefits = deps
                    .prime
                    .benefit_types(customer_id, ctx.marketplace_id())
                    .await?;
                Ok(benefits.iter().any(|b| b == benefit).into())
            }
        }
    }
}
