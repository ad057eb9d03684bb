/// HTTP clients for the external customer and prime-club services.
///
/// Predicate evaluation consumes these through the `CustomerClient` and
/// `PrimeBenefitClient` traits so tests can substitute mocks. An unknown
/// customer is a soft miss (`Ok(None)` / empty collections); transport
/// failures are hard errors and propagate to the caller.
mod customer;
mod prime;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;

#[cfg(test)]
use mockall::automock;

pub use customer::HttpCustomerClient;
pub use prime::HttpPrimeClubClient;

/// A customer's estimated demographic profile. Any field may be absent when
/// the upstream service has no estimate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub age_range: Option<String>,
    pub is_parent: Option<bool>,
    pub home_region: Option<String>,
}

/// Purchases and rounded USD spent in one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spend {
    pub number_of_purchases: i32,
    pub usd_spent: i32,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CustomerClient: Send + Sync {
    /// Fetch the demographic profile for a customer. `Ok(None)` for an
    /// unknown customer.
    async fn customer_profile(&self, customer_id: &str) -> Result<Option<CustomerProfile>>;

    /// Fetch the customer's spend keyed by category for one marketplace.
    async fn spend_by_category(
        &self,
        customer_id: &str,
        marketplace_id: &str,
    ) -> Result<HashMap<String, Spend>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait PrimeBenefitClient: Send + Sync {
    /// Fetch the benefit types a customer holds in a marketplace. An empty
    /// list means the customer is not prime.
    async fn benefit_types(&self, customer_id: &str, marketplace_id: &str) -> Result<Vec<String>>;
}
