/// Advertisement Selection
///
/// Picks the advertisement to render for one customer in one marketplace:
/// fetch the marketplace's content, keep each content's highest-rated
/// eligible targeting group, and render the content whose eligible group has
/// the highest click-through rate overall.
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::EvaluationConfig;
use crate::db::{ContentStore, TargetingGroupStore};
use crate::error::Result;
use crate::models::{AdvertisementContent, GeneratedAdvertisement, RequestContext, TargetingGroup};
use crate::targeting::{PredicateDeps, TargetingEvaluator};

pub struct AdSelectionService {
    content_store: Arc<dyn ContentStore>,
    targeting_store: Arc<dyn TargetingGroupStore>,
    deps: PredicateDeps,
    eval_permits: Arc<Semaphore>,
    predicate_timeout: Duration,
}

impl AdSelectionService {
    pub fn new(
        content_store: Arc<dyn ContentStore>,
        targeting_store: Arc<dyn TargetingGroupStore>,
        deps: PredicateDeps,
        evaluation: &EvaluationConfig,
    ) -> Self {
        Self {
            content_store,
            targeting_store,
            deps,
            eval_permits: Arc::new(Semaphore::new(evaluation.max_concurrent_predicate_evaluations)),
            predicate_timeout: Duration::from_millis(evaluation.predicate_timeout_ms),
        }
    }

    /// Select the advertisement the customer is most likely to click on.
    ///
    /// Returns the empty advertisement when the marketplace id is blank or no
    /// content is eligible. Store and collaborator failures are returned to
    /// the caller; the generate-ad handler masks them into an empty
    /// advertisement.
    pub async fn select_advertisement(
        &self,
        customer_id: Option<&str>,
        marketplace_id: &str,
    ) -> Result<GeneratedAdvertisement> {
        if marketplace_id.trim().is_empty() {
            warn!("Marketplace id cannot be blank; returning empty advertisement");
            return Ok(GeneratedAdvertisement::empty());
        }

        let context = Arc::new(RequestContext::new(customer_id, marketplace_id));
        let evaluator = TargetingEvaluator::new(
            Arc::clone(&context),
            self.deps.clone(),
            Arc::clone(&self.eval_permits),
            self.predicate_timeout,
        );

        let contents = self
            .content_store
            .content_for_marketplace(marketplace_id)
            .await?;
        let candidate_count = contents.len();

        let mut winner: Option<(TargetingGroup, AdvertisementContent)> = None;
        for content in contents {
            let Some(group) = self.first_eligible_group(&evaluator, &content).await? else {
                continue;
            };

            let replace = match &winner {
                None => true,
                Some((best_group, best_content)) => {
                    match group
                        .click_through_rate
                        .partial_cmp(&best_group.click_through_rate)
                        .unwrap_or(Ordering::Equal)
                    {
                        Ordering::Greater => true,
                        // Equal rates are broken by the smaller content id so
                        // the outcome does not depend on fetch order.
                        Ordering::Equal => content.content_id < best_content.content_id,
                        Ordering::Less => false,
                    }
                }
            };
            if replace {
                winner = Some((group, content));
            }
        }

        Ok(match winner {
            Some((group, content)) => {
                info!(
                    marketplace_id = %marketplace_id,
                    content_id = %content.content_id,
                    targeting_group_id = %group.targeting_group_id,
                    click_through_rate = group.click_through_rate,
                    candidate_count,
                    "Selected advertisement"
                );
                GeneratedAdvertisement::new(content)
            }
            None => {
                info!(
                    marketplace_id = %marketplace_id,
                    candidate_count,
                    "No eligible advertisement; returning empty advertisement"
                );
                GeneratedAdvertisement::empty()
            }
        })
    }

    /// The content's highest-rated eligible group, if any. Groups are tried
    /// in descending click-through-rate order and the first passing group
    /// wins; lower-rated groups are not evaluated.
    async fn first_eligible_group(
        &self,
        evaluator: &TargetingEvaluator,
        content: &AdvertisementContent,
    ) -> Result<Option<TargetingGroup>> {
        let mut groups = self
            .targeting_store
            .groups_for_content(content.content_id)
            .await?;
        groups.sort_by(|a, b| {
            b.click_through_rate
                .partial_cmp(&a.click_through_rate)
                .unwrap_or(Ordering::Equal)
        });

        for group in groups {
            if evaluator.evaluate(&group).await?.is_true() {
                return Ok(Some(group));
            }
            debug!(
                content_id = %content.content_id,
                targeting_group_id = %group.targeting_group_id,
                "Targeting group not eligible"
            );
        }
        Ok(None)
    }
}
