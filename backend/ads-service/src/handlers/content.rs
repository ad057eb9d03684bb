/// Content handlers - HTTP endpoints for advertising content CRUD.
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ContentResponse, TargetingGroupResponse};
use crate::error::Result;
use crate::services::ContentService;
use crate::targeting::{predicate_from_dto, TargetingPredicate, TargetingPredicateDto};

#[derive(Debug, Deserialize)]
pub struct CreateContentRequest {
    pub marketplace_id: String,
    pub content: String,
    pub targeting_predicates: Option<Vec<TargetingPredicateDto>>,
}

#[derive(Debug, Serialize)]
pub struct CreateContentResponse {
    pub advertising_content: ContentResponse,
    pub targeting_group: TargetingGroupResponse,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContentRequest {
    pub marketplace_id: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateContentResponse {
    pub advertising_content: ContentResponse,
    pub targeting_groups: Vec<TargetingGroupResponse>,
}

fn predicates_from_request(
    predicates: Option<&[TargetingPredicateDto]>,
) -> Result<Vec<TargetingPredicate>> {
    predicates
        .unwrap_or_default()
        .iter()
        .map(predicate_from_dto)
        .collect()
}

/// Create a new piece of advertising content along with its initial targeting
/// group.
pub async fn create_content(
    pool: web::Data<PgPool>,
    req: web::Json<CreateContentRequest>,
) -> Result<HttpResponse> {
    let predicates = predicates_from_request(req.targeting_predicates.as_deref())?;

    let service = ContentService::new(pool.get_ref().clone());
    let (content, group) = service
        .create_content(&req.marketplace_id, &req.content, predicates)
        .await?;

    Ok(HttpResponse::Created().json(CreateContentResponse {
        advertising_content: content.into(),
        targeting_group: group.into(),
    }))
}

/// Update a piece of advertising content: the rendered advertisement itself
/// and/or the marketplace it is scheduled in.
pub async fn update_content(
    pool: web::Data<PgPool>,
    content_id: web::Path<Uuid>,
    req: web::Json<UpdateContentRequest>,
) -> Result<HttpResponse> {
    let service = ContentService::new(pool.get_ref().clone());
    let (content, groups) = service
        .update_content(
            *content_id,
            req.marketplace_id.as_deref(),
            req.content.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(UpdateContentResponse {
        advertising_content: content.into(),
        targeting_groups: groups.into_iter().map(Into::into).collect(),
    }))
}

/// Delete a piece of advertising content and the targeting groups associated
/// with it.
pub async fn delete_content(
    pool: web::Data<PgPool>,
    content_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = ContentService::new(pool.get_ref().clone());
    let deleted = service.delete_content(*content_id).await?;

    Ok(HttpResponse::Ok().json(ContentResponse::from(deleted)))
}
