/// Advertisement generation endpoint.
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::models::GeneratedAdvertisement;
use crate::services::AdSelectionService;

#[derive(Debug, Deserialize)]
pub struct GenerateAdvertisementQuery {
    pub customer_id: Option<String>,
    pub marketplace_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdvertisementResponse {
    pub id: Uuid,
    pub content_id: Option<Uuid>,
    pub renderable_content: String,
}

impl From<GeneratedAdvertisement> for AdvertisementResponse {
    fn from(ad: GeneratedAdvertisement) -> Self {
        let content_id = (!ad.is_empty()).then_some(ad.content.content_id);
        Self {
            id: ad.id,
            content_id,
            renderable_content: ad.content.renderable_content,
        }
    }
}

/// Decide on the advertisement most likely to be clicked on by the customer,
/// out of the content they are eligible to see.
///
/// This endpoint never fails: any selection error is logged and masked into
/// an empty advertisement.
pub async fn generate_advertisement(
    selection: web::Data<AdSelectionService>,
    query: web::Query<GenerateAdvertisementQuery>,
) -> HttpResponse {
    let customer_id = query.customer_id.as_deref();
    let marketplace_id = query.marketplace_id.as_deref().unwrap_or("");

    info!(
        customer_id = customer_id.unwrap_or("<unrecognized>"),
        marketplace_id = %marketplace_id,
        "Generating advertisement"
    );

    let ad = match selection
        .select_advertisement(customer_id, marketplace_id)
        .await
    {
        Ok(ad) => ad,
        Err(e) => {
            error!(
                error = %e,
                marketplace_id = %marketplace_id,
                "Advertisement selection failed; returning empty advertisement"
            );
            GeneratedAdvertisement::empty()
        }
    };

    HttpResponse::Ok().json(AdvertisementResponse::from(ad))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{MockCustomerClient, MockPrimeBenefitClient};
    use crate::config::EvaluationConfig;
    use crate::db::{MockContentStore, MockTargetingGroupStore};
    use crate::error::AppError;
    use crate::targeting::PredicateDeps;
    use actix_web::{test, App};
    use std::sync::Arc;

    fn failing_selection_service() -> AdSelectionService {
        let mut contents = MockContentStore::new();
        contents
            .expect_content_for_marketplace()
            .returning(|_| Err(AppError::Internal("content store down".to_string())));

        AdSelectionService::new(
            Arc::new(contents),
            Arc::new(MockTargetingGroupStore::new()),
            PredicateDeps {
                customer: Arc::new(MockCustomerClient::new()),
                prime: Arc::new(MockPrimeBenefitClient::new()),
            },
            &EvaluationConfig {
                max_concurrent_predicate_evaluations: 8,
                predicate_timeout_ms: 200,
            },
        )
    }

    #[actix_web::test]
    async fn selection_failure_degrades_to_empty_advertisement() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(failing_selection_service()))
                .route(
                    "/advertisements",
                    web::get().to(generate_advertisement),
                ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/advertisements?customer_id=c-1&marketplace_id=US")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["renderable_content"], "");
        assert!(body["content_id"].is_null());
        assert!(body["id"].is_string());
    }
}
