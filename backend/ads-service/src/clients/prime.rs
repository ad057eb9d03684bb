use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::PrimeBenefitClient;
use crate::error::{AppError, Result};

/// Client for the prime-club service, source of a customer's benefit types.
#[derive(Debug, Clone)]
pub struct HttpPrimeClubClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PrimeBenefit {
    benefit_type: String,
}

#[derive(Debug, Deserialize)]
struct PrimeBenefitsResponse {
    prime_benefits: Vec<PrimeBenefit>,
}

impl HttpPrimeClubClient {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build prime club client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl PrimeBenefitClient for HttpPrimeClubClient {
    async fn benefit_types(&self, customer_id: &str, marketplace_id: &str) -> Result<Vec<String>> {
        let url = format!("{}/customers/{}/benefits", self.base_url, customer_id);
        let response = self
            .http
            .get(&url)
            .query(&[("marketplace_id", marketplace_id)])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(customer_id = %customer_id, "No benefits for customer");
            return Ok(Vec::new());
        }

        let body: PrimeBenefitsResponse = response.error_for_status()?.json().await?;
        Ok(body
            .prime_benefits
            .into_iter()
            .map(|b| b.benefit_type)
            .collect())
    }
}
