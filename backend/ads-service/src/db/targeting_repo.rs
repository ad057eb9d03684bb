use crate::models::TargetingGroup;
use crate::targeting::TargetingPredicate;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(FromRow)]
struct TargetingGroupRow {
    targeting_group_id: Uuid,
    content_id: Uuid,
    click_through_rate: f64,
    predicates: Json<Vec<TargetingPredicate>>,
}

impl From<TargetingGroupRow> for TargetingGroup {
    fn from(row: TargetingGroupRow) -> Self {
        TargetingGroup {
            targeting_group_id: row.targeting_group_id,
            content_id: row.content_id,
            click_through_rate: row.click_through_rate,
            predicates: row.predicates.0,
        }
    }
}

/// Persist a new targeting group.
pub async fn create_targeting_group(
    pool: &PgPool,
    group: &TargetingGroup,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO targeting_groups (targeting_group_id, content_id, click_through_rate, predicates)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(group.targeting_group_id)
    .bind(group.content_id)
    .bind(group.click_through_rate)
    .bind(Json(&group.predicates))
    .execute(pool)
    .await?;

    Ok(())
}

/// Find all targeting groups for a piece of content.
pub async fn find_groups_by_content(
    pool: &PgPool,
    content_id: Uuid,
) -> Result<Vec<TargetingGroup>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TargetingGroupRow>(
        r#"
        SELECT targeting_group_id, content_id, click_through_rate, predicates
        FROM targeting_groups
        WHERE content_id = $1
        "#,
    )
    .bind(content_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(TargetingGroup::from).collect())
}

/// Overwrite a targeting group's click-through rate.
/// Returns `None` when no row matches the id.
pub async fn update_click_through_rate(
    pool: &PgPool,
    targeting_group_id: Uuid,
    click_through_rate: f64,
) -> Result<Option<TargetingGroup>, sqlx::Error> {
    let row = sqlx::query_as::<_, TargetingGroupRow>(
        r#"
        UPDATE targeting_groups
        SET click_through_rate = $1, updated_at = NOW()
        WHERE targeting_group_id = $2
        RETURNING targeting_group_id, content_id, click_through_rate, predicates
        "#,
    )
    .bind(click_through_rate)
    .bind(targeting_group_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(TargetingGroup::from))
}

/// Delete every targeting group owned by a piece of content.
/// Returns the number of groups deleted.
pub async fn delete_groups_by_content(
    pool: &PgPool,
    content_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM targeting_groups WHERE content_id = $1")
        .bind(content_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
