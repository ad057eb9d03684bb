use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::db::{content_repo, targeting_repo};
use crate::error::{AppError, Result};
use crate::models::TargetingGroup;
use crate::targeting::TargetingPredicate;

/// Targeting group mutations: adding a group to existing content and
/// overwriting a group's learned click-through rate.
pub struct TargetingGroupService {
    pool: PgPool,
}

impl TargetingGroupService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a targeting group to an existing piece of content. Without
    /// predicates the group is viewable by any customer. New groups start at
    /// a click-through rate of 1.0 so a true rate can be learned.
    pub async fn add_targeting_group(
        &self,
        content_id: Uuid,
        predicates: Vec<TargetingPredicate>,
    ) -> Result<TargetingGroup> {
        content_repo::find_content_by_id(&self.pool, content_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No content exists with the ID {content_id}")))?;

        let group = TargetingGroup::new(content_id, predicates);
        targeting_repo::create_targeting_group(&self.pool, &group).await?;

        info!(
            content_id = %content_id,
            targeting_group_id = %group.targeting_group_id,
            predicate_count = group.predicates.len(),
            "Added targeting group"
        );
        Ok(group)
    }

    /// Overwrite the click-through rate learned for a targeting group.
    pub async fn update_click_through_rate(
        &self,
        targeting_group_id: Uuid,
        click_through_rate: f64,
    ) -> Result<TargetingGroup> {
        let group =
            targeting_repo::update_click_through_rate(&self.pool, targeting_group_id, click_through_rate)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "No targeting group exists with the ID {targeting_group_id}"
                    ))
                })?;

        info!(
            targeting_group_id = %targeting_group_id,
            click_through_rate,
            "Updated click-through rate"
        );
        Ok(group)
    }
}
