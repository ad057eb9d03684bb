use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::warn;

use super::{PredicateDeps, PredicateResult};
use crate::error::{AppError, Result};
use crate::models::{RequestContext, TargetingGroup};

/// Evaluates targeting groups for one request context.
///
/// Each predicate of a group is evaluated on its own task so a predicate
/// blocked on a collaborator does not stall its siblings; the shared
/// semaphore bounds how many evaluations run at once across the whole
/// process. All outcomes are gathered before the verdict is decided.
pub struct TargetingEvaluator {
    context: Arc<RequestContext>,
    deps: PredicateDeps,
    permits: Arc<Semaphore>,
    predicate_timeout: Duration,
}

impl TargetingEvaluator {
    pub fn new(
        context: Arc<RequestContext>,
        deps: PredicateDeps,
        permits: Arc<Semaphore>,
        predicate_timeout: Duration,
    ) -> Self {
        Self {
            context,
            deps,
            permits,
            predicate_timeout,
        }
    }

    /// Evaluate a targeting group: `True` iff every predicate evaluates to
    /// `True`. A group with no predicates is unrestricted and passes for
    /// everyone. Any `False` or `Indeterminate` predicate makes the group
    /// verdict `False`; a predicate error fails the whole evaluation call.
    pub async fn evaluate(&self, group: &TargetingGroup) -> Result<PredicateResult> {
        if group.predicates.is_empty() {
            return Ok(PredicateResult::True);
        }

        let tasks: Vec<_> = group
            .predicates
            .iter()
            .cloned()
            .map(|predicate| {
                let ctx = Arc::clone(&self.context);
                let deps = self.deps.clone();
                let permits = Arc::clone(&self.permits);
                let timeout_after = self.predicate_timeout;
                tokio::spawn(async move {
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .map_err(|_| AppError::Internal("evaluation pool closed".to_string()))?;
                    match tokio::time::timeout(timeout_after, predicate.evaluate(&ctx, &deps)).await
                    {
                        Ok(result) => result,
                        Err(_) => {
                            warn!(
                                timeout_ms = timeout_after.as_millis() as u64,
                                "Predicate evaluation timed out"
                            );
                            Ok(PredicateResult::Indeterminate)
                        }
                    }
                })
            })
            .collect();

        let outcomes = join_all(tasks).await;

        let mut verdict = PredicateResult::True;
        for outcome in outcomes {
            let result = outcome
                .map_err(|e| AppError::Internal(format!("predicate evaluation task failed: {e}")))??;
            if !result.is_true() {
                verdict = PredicateResult::False;
            }
        }
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{CustomerProfile, MockCustomerClient, MockPrimeBenefitClient};
    use crate::targeting::{PredicateKind, TargetingPredicate};
    use uuid::Uuid;

    const TEST_TIMEOUT: Duration = Duration::from_millis(200);

    fn evaluator(customer: MockCustomerClient, prime: MockPrimeBenefitClient) -> TargetingEvaluator {
        TargetingEvaluator::new(
            Arc::new(RequestContext::new(Some("c-1"), "US")),
            PredicateDeps {
                customer: Arc::new(customer),
                prime: Arc::new(prime),
            },
            Arc::new(Semaphore::new(8)),
            TEST_TIMEOUT,
        )
    }

    fn group_of(predicates: Vec<TargetingPredicate>) -> TargetingGroup {
        TargetingGroup::new(Uuid::new_v4(), predicates)
    }

    #[tokio::test]
    async fn empty_group_is_vacuously_true() {
        let eval = evaluator(MockCustomerClient::new(), MockPrimeBenefitClient::new());
        let result = eval.evaluate(&group_of(vec![])).await.unwrap();
        assert_eq!(result, PredicateResult::True);
    }

    #[tokio::test]
    async fn all_true_predicates_make_group_true() {
        let mut customer = MockCustomerClient::new();
        customer.expect_customer_profile().returning(|_| {
            Ok(Some(CustomerProfile {
                is_parent: Some(true),
                ..Default::default()
            }))
        });
        let eval = evaluator(customer, MockPrimeBenefitClient::new());

        let group = group_of(vec![
            TargetingPredicate::new(PredicateKind::Recognized),
            TargetingPredicate::new(PredicateKind::Parent),
        ]);
        let result = eval.evaluate(&group).await.unwrap();
        assert_eq!(result, PredicateResult::True);
    }

    #[tokio::test]
    async fn single_false_predicate_fails_group() {
        let mut customer = MockCustomerClient::new();
        customer.expect_customer_profile().returning(|_| {
            Ok(Some(CustomerProfile {
                is_parent: Some(false),
                ..Default::default()
            }))
        });
        let eval = evaluator(customer, MockPrimeBenefitClient::new());

        let group = group_of(vec![
            TargetingPredicate::new(PredicateKind::Recognized),
            TargetingPredicate::new(PredicateKind::Parent),
            TargetingPredicate::new(PredicateKind::Recognized),
        ]);
        let result = eval.evaluate(&group).await.unwrap();
        assert_eq!(result, PredicateResult::False);
    }

    #[tokio::test]
    async fn indeterminate_predicate_fails_group() {
        let mut customer = MockCustomerClient::new();
        customer
            .expect_customer_profile()
            .returning(|_| Ok(Some(CustomerProfile::default())));
        let eval = evaluator(customer, MockPrimeBenefitClient::new());

        let group = group_of(vec![
            TargetingPredicate::new(PredicateKind::Recognized),
            TargetingPredicate::new(PredicateKind::Parent),
        ]);
        let result = eval.evaluate(&group).await.unwrap();
        assert_eq!(result, PredicateResult::False);
    }

    /// Never answers within the evaluation timeout.
    struct StalledCustomerClient;

    #[async_trait::async_trait]
    impl crate::clients::CustomerClient for StalledCustomerClient {
        async fn customer_profile(&self, _customer_id: &str) -> Result<Option<CustomerProfile>> {
            tokio::time::sleep(TEST_TIMEOUT * 4).await;
            Ok(Some(CustomerProfile {
                is_parent: Some(true),
                ..Default::default()
            }))
        }

        async fn spend_by_category(
            &self,
            _customer_id: &str,
            _marketplace_id: &str,
        ) -> Result<std::collections::HashMap<String, crate::clients::Spend>> {
            Ok(std::collections::HashMap::new())
        }
    }

    #[tokio::test]
    async fn slow_predicate_times_out_as_indeterminate() {
        let eval = TargetingEvaluator::new(
            Arc::new(RequestContext::new(Some("c-1"), "US")),
            PredicateDeps {
                customer: Arc::new(StalledCustomerClient),
                prime: Arc::new(MockPrimeBenefitClient::new()),
            },
            Arc::new(Semaphore::new(8)),
            TEST_TIMEOUT,
        );

        let group = group_of(vec![TargetingPredicate::new(PredicateKind::Parent)]);
        let result = eval.evaluate(&group).await.unwrap();
        assert_eq!(result, PredicateResult::False);
    }

    #[tokio::test]
    async fn predicate_error_fails_the_evaluation_call() {
        let mut customer = MockCustomerClient::new();
        customer
            .expect_customer_profile()
            .returning(|_| Err(AppError::Collaborator("boom".to_string())));
        let eval = evaluator(customer, MockPrimeBenefitClient::new());

        let group = group_of(vec![
            TargetingPredicate::new(PredicateKind::Parent),
            TargetingPredicate::new(PredicateKind::Recognized),
        ]);
        assert!(eval.evaluate(&group).await.is_err());
    }
}
