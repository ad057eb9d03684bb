use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::db::{content_repo, targeting_repo};
use crate::error::{AppError, Result};
use crate::models::{AdvertisementContent, TargetingGroup};
use crate::targeting::TargetingPredicate;

/// Content CRUD. Creating content also creates its initial targeting group;
/// deleting content cascades to every group it owns.
pub struct ContentService {
    pool: PgPool,
}

impl ContentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new piece of advertising content together with its first
    /// targeting group. An empty predicate list makes the content viewable by
    /// any customer.
    pub async fn create_content(
        &self,
        marketplace_id: &str,
        renderable_content: &str,
        predicates: Vec<TargetingPredicate>,
    ) -> Result<(AdvertisementContent, TargetingGroup)> {
        if marketplace_id.trim().is_empty() {
            return Err(AppError::Validation(
                "marketplace_id cannot be blank".to_string(),
            ));
        }

        let content =
            content_repo::create_content(&self.pool, marketplace_id, renderable_content).await?;

        let group = TargetingGroup::new(content.content_id, predicates);
        targeting_repo::create_targeting_group(&self.pool, &group).await?;

        info!(
            content_id = %content.content_id,
            marketplace_id = %marketplace_id,
            targeting_group_id = %group.targeting_group_id,
            "Created content"
        );
        Ok((content, group))
    }

    /// Overwrite a content's renderable content and/or marketplace. Omitted
    /// fields keep their stored value. Returns the updated content and its
    /// targeting groups.
    pub async fn update_content(
        &self,
        content_id: Uuid,
        marketplace_id: Option<&str>,
        renderable_content: Option<&str>,
    ) -> Result<(AdvertisementContent, Vec<TargetingGroup>)> {
        let existing = content_repo::find_content_by_id(&self.pool, content_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No content exists with the ID {content_id}")))?;

        let marketplace_id = marketplace_id.unwrap_or(&existing.marketplace_id);
        let renderable_content = renderable_content.unwrap_or(&existing.renderable_content);

        let updated =
            content_repo::update_content(&self.pool, content_id, marketplace_id, renderable_content)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("No content exists with the ID {content_id}"))
                })?;

        let groups = targeting_repo::find_groups_by_content(&self.pool, content_id).await?;

        info!(content_id = %content_id, marketplace_id = %marketplace_id, "Updated content");
        Ok((updated, groups))
    }

    /// Delete a piece of content and every targeting group associated with
    /// it.
    pub async fn delete_content(&self, content_id: Uuid) -> Result<AdvertisementContent> {
        let existing = content_repo::find_content_by_id(&self.pool, content_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Unable to find content to delete with contentId: {content_id}"
                ))
            })?;

        let deleted_groups = targeting_repo::delete_groups_by_content(&self.pool, content_id).await?;
        content_repo::delete_content(&self.pool, content_id).await?;

        info!(
            content_id = %content_id,
            deleted_groups,
            "Deleted content and its targeting groups"
        );
        Ok(existing)
    }
}
