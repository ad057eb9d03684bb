/// Targeting group handlers - HTTP endpoints for group mutations.
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::TargetingGroupResponse;
use crate::error::{AppError, Result};
use crate::services::TargetingGroupService;
use crate::targeting::{predicate_from_dto, TargetingPredicateDto};

#[derive(Debug, Deserialize)]
pub struct AddTargetingGroupRequest {
    pub targeting_predicates: Option<Vec<TargetingPredicateDto>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateClickThroughRateRequest {
    pub click_through_rate: f64,
}

/// Add a targeting group to an existing piece of content.
pub async fn add_targeting_group(
    pool: web::Data<PgPool>,
    content_id: web::Path<Uuid>,
    req: web::Json<AddTargetingGroupRequest>,
) -> Result<HttpResponse> {
    let predicates = req
        .targeting_predicates
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(predicate_from_dto)
        .collect::<Result<Vec<_>>>()?;

    let service = TargetingGroupService::new(pool.get_ref().clone());
    let group = service.add_targeting_group(*content_id, predicates).await?;

    Ok(HttpResponse::Created().json(TargetingGroupResponse::from(group)))
}

/// Overwrite the click-through rate learned for a targeting group.
pub async fn update_click_through_rate(
    pool: web::Data<PgPool>,
    targeting_group_id: web::Path<Uuid>,
    req: web::Json<UpdateClickThroughRateRequest>,
) -> Result<HttpResponse> {
    let rate = req.click_through_rate;
    if !rate.is_finite() || rate < 0.0 {
        return Err(AppError::Validation(format!(
            "click_through_rate must be a non-negative number, got {rate}"
        )));
    }

    let service = TargetingGroupService::new(pool.get_ref().clone());
    let group = service
        .update_click_through_rate(*targeting_group_id, rate)
        .await?;

    Ok(HttpResponse::Ok().json(TargetingGroupResponse::from(group)))
}
