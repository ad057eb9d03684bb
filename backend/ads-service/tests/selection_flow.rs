//! End-to-end selection flow over in-memory stores and collaborator fakes.
//!
//! No database or network: the point is that the full pipeline (content
//! lookup, per-group concurrent predicate evaluation, CTR ranking) behaves as
//! one unit.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use ads_service::clients::{CustomerClient, CustomerProfile, PrimeBenefitClient, Spend};
use ads_service::config::EvaluationConfig;
use ads_service::db::{ContentStore, TargetingGroupStore};
use ads_service::error::Result;
use ads_service::models::{AdvertisementContent, TargetingGroup};
use ads_service::services::AdSelectionService;
use ads_service::targeting::{Comparison, PredicateDeps, PredicateKind, TargetingPredicate};

struct InMemoryContentStore {
    contents: Vec<AdvertisementContent>,
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn content_for_marketplace(
        &self,
        marketplace_id: &str,
    ) -> Result<Vec<AdvertisementContent>> {
        Ok(self
            .contents
            .iter()
            .filter(|c| c.marketplace_id == marketplace_id)
            .cloned()
            .collect())
    }
}

struct InMemoryGroupStore {
    groups: Vec<TargetingGroup>,
}

#[async_trait]
impl TargetingGroupStore for InMemoryGroupStore {
    async fn groups_for_content(&self, content_id: Uuid) -> Result<Vec<TargetingGroup>> {
        Ok(self
            .groups
            .iter()
            .filter(|g| g.content_id == content_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct FakeCustomerClient {
    profiles: HashMap<String, CustomerProfile>,
    spend: HashMap<String, HashMap<String, Spend>>,
}

#[async_trait]
impl CustomerClient for FakeCustomerClient {
    async fn customer_profile(&self, customer_id: &str) -> Result<Option<CustomerProfile>> {
        Ok(self.profiles.get(customer_id).cloned())
    }

    async fn spend_by_category(
        &self,
        customer_id: &str,
        _marketplace_id: &str,
    ) -> Result<HashMap<String, Spend>> {
        Ok(self.spend.get(customer_id).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
struct FakePrimeClient {
    benefits: HashMap<String, Vec<String>>,
}

#[async_trait]
impl PrimeBenefitClient for FakePrimeClient {
    async fn benefit_types(&self, customer_id: &str, _marketplace_id: &str) -> Result<Vec<String>> {
        Ok(self.benefits.get(customer_id).cloned().unwrap_or_default())
    }
}

fn content(id: u128, marketplace_id: &str) -> AdvertisementContent {
    let now = Utc::now();
    AdvertisementContent {
        content_id: Uuid::from_u128(id),
        renderable_content: format!("<div>ad {id}</div>"),
        marketplace_id: marketplace_id.to_string(),
        created_at: now,
        updated_at: now,
    }
}

fn group(content_id: u128, ctr: f64, predicates: Vec<TargetingPredicate>) -> TargetingGroup {
    TargetingGroup {
        targeting_group_id: Uuid::new_v4(),
        content_id: Uuid::from_u128(content_id),
        click_through_rate: ctr,
        predicates,
    }
}

/// A marketplace with three ads:
/// - 1: targets parents, CTR 0.6
/// - 2: targets frequent Kindle buyers, CTR 0.9
/// - 3: unrestricted, CTR 0.2
fn marketplace_service() -> AdSelectionService {
    let contents = InMemoryContentStore {
        contents: vec![content(1, "US"), content(2, "US"), content(3, "US")],
    };
    let groups = InMemoryGroupStore {
        groups: vec![
            group(
                1,
                0.6,
                vec![
                    TargetingPredicate::new(PredicateKind::Recognized),
                    TargetingPredicate::new(PredicateKind::Parent),
                ],
            ),
            group(
                2,
                0.9,
                vec![TargetingPredicate::new(
                    PredicateKind::CategorySpendFrequency {
                        category: "KINDLE".to_string(),
                        comparison: Comparison::Gt,
                        target_purchases: 2,
                    },
                )],
            ),
            group(3, 0.2, vec![]),
        ],
    };

    let customer = FakeCustomerClient {
        profiles: HashMap::from([
            (
                "alice".to_string(),
                CustomerProfile {
                    age_range: Some("AGE_31_TO_35".to_string()),
                    is_parent: Some(true),
                    home_region: Some("WA".to_string()),
                },
            ),
            (
                "bob".to_string(),
                CustomerProfile {
                    age_range: Some("AGE_22_TO_25".to_string()),
                    is_parent: Some(false),
                    home_region: None,
                },
            ),
        ]),
        spend: HashMap::from([
            (
                "alice".to_string(),
                HashMap::from([(
                    "KINDLE".to_string(),
                    Spend {
                        number_of_purchases: 7,
                        usd_spent: 180,
                    },
                )]),
            ),
            (
                "bob".to_string(),
                HashMap::from([(
                    "KINDLE".to_string(),
                    Spend {
                        number_of_purchases: 1,
                        usd_spent: 12,
                    },
                )]),
            ),
        ]),
    };

    AdSelectionService::new(
        Arc::new(contents),
        Arc::new(groups),
        PredicateDeps {
            customer: Arc::new(customer),
            prime: Arc::new(FakePrimeClient::default()),
        },
        &EvaluationConfig {
            max_concurrent_predicate_evaluations: 8,
            predicate_timeout_ms: 500,
        },
    )
}

#[tokio::test]
async fn frequent_buyer_gets_the_highest_rated_eligible_ad() {
    let svc = marketplace_service();

    // Alice is a parent and a frequent Kindle buyer: ads 1, 2, 3 are all
    // eligible, and the Kindle ad carries the highest rate.
    let ad = svc.select_advertisement(Some("alice"), "US").await.unwrap();
    assert_eq!(ad.content.content_id, Uuid::from_u128(2));
}

#[tokio::test]
async fn customer_matching_nothing_falls_back_to_the_unrestricted_ad() {
    let svc = marketplace_service();

    // Bob is not a parent and rarely buys Kindle content: only the
    // unrestricted ad passes.
    let ad = svc.select_advertisement(Some("bob"), "US").await.unwrap();
    assert_eq!(ad.content.content_id, Uuid::from_u128(3));
}

#[tokio::test]
async fn unrecognized_customer_only_sees_unrestricted_content() {
    let svc = marketplace_service();

    // Without a customer id every data-backed predicate is indeterminate,
    // which is never eligible.
    let ad = svc.select_advertisement(None, "US").await.unwrap();
    assert_eq!(ad.content.content_id, Uuid::from_u128(3));
}

#[tokio::test]
async fn unknown_marketplace_yields_the_empty_advertisement() {
    let svc = marketplace_service();

    let ad = svc.select_advertisement(Some("alice"), "JP").await.unwrap();
    assert!(ad.is_empty());
}

#[tokio::test]
async fn blank_marketplace_yields_the_empty_advertisement() {
    let svc = marketplace_service();

    let ad = svc.select_advertisement(Some("alice"), "").await.unwrap();
    assert!(ad.is_empty());
}

#[tokio::test]
async fn prime_benefit_targeting_selects_benefit_holders() {
    let contents = InMemoryContentStore {
        contents: vec![content(10, "US"), content(11, "US")],
    };
    let groups = InMemoryGroupStore {
        groups: vec![
            group(
                10,
                0.8,
                vec![TargetingPredicate::new(PredicateKind::PrimeBenefit {
                    benefit: "FREE_EXPEDITED_SHIPPING".to_string(),
                })],
            ),
            group(
                11,
                0.5,
                vec![TargetingPredicate::negated(PredicateKind::PrimeBenefit {
                    benefit: "FREE_EXPEDITED_SHIPPING".to_string(),
                })],
            ),
        ],
    };
    let prime = FakePrimeClient {
        benefits: HashMap::from([(
            "alice".to_string(),
            vec!["FREE_EXPEDITED_SHIPPING".to_string()],
        )]),
    };
    let svc = AdSelectionService::new(
        Arc::new(contents),
        Arc::new(groups),
        PredicateDeps {
            customer: Arc::new(FakeCustomerClient::default()),
            prime: Arc::new(prime),
        },
        &EvaluationConfig {
            max_concurrent_predicate_evaluations: 8,
            predicate_timeout_ms: 500,
        },
    );

    let ad = svc.select_advertisement(Some("alice"), "US").await.unwrap();
    assert_eq!(ad.content.content_id, Uuid::from_u128(10));

    let ad = svc.select_advertisement(Some("carol"), "US").await.unwrap();
    assert_eq!(ad.content.content_id, Uuid::from_u128(11));
}
