use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::{CustomerClient, CustomerProfile, Spend};
use crate::error::{AppError, Result};

/// Client for the customer service, source of demographic profiles and
/// spend-by-category data.
#[derive(Debug, Clone)]
pub struct HttpCustomerClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CustomerProfileResponse {
    customer_profile: CustomerProfile,
}

#[derive(Debug, Deserialize)]
struct SpendCategoriesResponse {
    spend_categories: HashMap<String, Spend>,
}

impl HttpCustomerClient {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build customer client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl CustomerClient for HttpCustomerClient {
    async fn customer_profile(&self, customer_id: &str) -> Result<Option<CustomerProfile>> {
        let url = format!("{}/customers/{}/profile", self.base_url, customer_id);
        let response = self.http.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(customer_id = %customer_id, "No profile for customer");
            return Ok(None);
        }

        let body: CustomerProfileResponse = response.error_for_status()?.json().await?;
        Ok(Some(body.customer_profile))
    }

    async fn spend_by_category(
        &self,
        customer_id: &str,
        marketplace_id: &str,
    ) -> Result<HashMap<String, Spend>> {
        let url = format!("{}/customers/{}/spend-categories", self.base_url, customer_id);
        let response = self
            .http
            .get(&url)
            .query(&[("marketplace_id", marketplace_id)])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(customer_id = %customer_id, "No spend data for customer");
            return Ok(HashMap::new());
        }

        let body: SpendCategoriesResponse = response.error_for_status()?.json().await?;
        Ok(body.spend_categories)
    }
}
