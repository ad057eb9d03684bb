use crate::models::AdvertisementContent;
use sqlx::PgPool;
use uuid::Uuid;

/// Create a new piece of advertisement content.
/// Returns the created row.
pub async fn create_content(
    pool: &PgPool,
    marketplace_id: &str,
    renderable_content: &str,
) -> Result<AdvertisementContent, sqlx::Error> {
    let content = sqlx::query_as::<_, AdvertisementContent>(
        r#"
        INSERT INTO advertisement_content (content_id, marketplace_id, renderable_content)
        VALUES ($1, $2, $3)
        RETURNING content_id, renderable_content, marketplace_id, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(marketplace_id)
    .bind(renderable_content)
    .fetch_one(pool)
    .await?;

    Ok(content)
}

/// Find a piece of content by ID.
pub async fn find_content_by_id(
    pool: &PgPool,
    content_id: Uuid,
) -> Result<Option<AdvertisementContent>, sqlx::Error> {
    let content = sqlx::query_as::<_, AdvertisementContent>(
        r#"
        SELECT content_id, renderable_content, marketplace_id, created_at, updated_at
        FROM advertisement_content
        WHERE content_id = $1
        "#,
    )
    .bind(content_id)
    .fetch_optional(pool)
    .await?;

    Ok(content)
}

/// Find all content scheduled in a marketplace.
pub async fn find_content_by_marketplace(
    pool: &PgPool,
    marketplace_id: &str,
) -> Result<Vec<AdvertisementContent>, sqlx::Error> {
    let contents = sqlx::query_as::<_, AdvertisementContent>(
        r#"
        SELECT content_id, renderable_content, marketplace_id, created_at, updated_at
        FROM advertisement_content
        WHERE marketplace_id = $1
        ORDER BY created_at
        "#,
    )
    .bind(marketplace_id)
    .fetch_all(pool)
    .await?;

    Ok(contents)
}

/// Overwrite a content row's renderable content and marketplace.
/// Returns `None` when no row matches the id.
pub async fn update_content(
    pool: &PgPool,
    content_id: Uuid,
    marketplace_id: &str,
    renderable_content: &str,
) -> Result<Option<AdvertisementContent>, sqlx::Error> {
    let content = sqlx::query_as::<_, AdvertisementContent>(
        r#"
        UPDATE advertisement_content
        SET marketplace_id = $1, renderable_content = $2, updated_at = NOW()
        WHERE content_id = $3
        RETURNING content_id, renderable_content, marketplace_id, created_at, updated_at
        "#,
    )
    .bind(marketplace_id)
    .bind(renderable_content)
    .bind(content_id)
    .fetch_optional(pool)
    .await?;

    Ok(content)
}

/// Delete a content row. Returns whether a row was deleted.
pub async fn delete_content(pool: &PgPool, content_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM advertisement_content WHERE content_id = $1")
        .bind(content_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
