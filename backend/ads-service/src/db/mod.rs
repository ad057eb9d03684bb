/// Database access layer
///
/// Repositories are free functions over a `PgPool` (one module per table).
/// The selection logic reads through the `ContentStore` and
/// `TargetingGroupStore` traits so tests can substitute in-memory stores.
pub mod content_repo;
pub mod targeting_repo;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{AdvertisementContent, TargetingGroup};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All advertisement content that could be shown in a marketplace.
    async fn content_for_marketplace(
        &self,
        marketplace_id: &str,
    ) -> Result<Vec<AdvertisementContent>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait TargetingGroupStore: Send + Sync {
    /// All targeting groups tied to a piece of content.
    async fn groups_for_content(&self, content_id: Uuid) -> Result<Vec<TargetingGroup>>;
}

/// Postgres-backed content store.
#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn content_for_marketplace(
        &self,
        marketplace_id: &str,
    ) -> Result<Vec<AdvertisementContent>> {
        Ok(content_repo::find_content_by_marketplace(&self.pool, marketplace_id).await?)
    }
}

/// Postgres-backed targeting group store.
#[derive(Clone)]
pub struct PgTargetingGroupStore {
    pool: PgPool,
}

impl PgTargetingGroupStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TargetingGroupStore for PgTargetingGroupStore {
    async fn groups_for_content(&self, content_id: Uuid) -> Result<Vec<TargetingGroup>> {
        Ok(targeting_repo::find_groups_by_content(&self.pool, content_id).await?)
    }
}
