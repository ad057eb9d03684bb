/// Data models for the ads service
///
/// - `AdvertisementContent`: a renderable advertisement scheduled in a marketplace
/// - `TargetingGroup`: a scored bundle of predicates tied to one piece of content
/// - `GeneratedAdvertisement`: the unique advertisement produced for one request
/// - `RequestContext`: the resolved customer/marketplace identity for one request
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::targeting::TargetingPredicate;

/// New targeting groups start at a click-through rate of 1.0 so they are
/// guaranteed some initial impressions and a true rate can be learned.
pub const INITIAL_CLICK_THROUGH_RATE: f64 = 1.0;

/// A piece of advertising content: html/css to render, scheduled in one
/// marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AdvertisementContent {
    pub content_id: Uuid,
    pub renderable_content: String,
    pub marketplace_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A targeting group for an advertisement. Every predicate in the group must
/// hold for the content to be a candidate; `click_through_rate` ranks
/// candidates against each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetingGroup {
    pub targeting_group_id: Uuid,
    pub content_id: Uuid,
    pub click_through_rate: f64,
    pub predicates: Vec<TargetingPredicate>,
}

impl TargetingGroup {
    /// Creates a group for `content_id` at the initial click-through rate.
    pub fn new(content_id: Uuid, predicates: Vec<TargetingPredicate>) -> Self {
        Self {
            targeting_group_id: Uuid::new_v4(),
            content_id,
            click_through_rate: INITIAL_CLICK_THROUGH_RATE,
            predicates,
        }
    }
}

/// The unique advertisement generated for a customer. The id is unique to
/// this impression; it is never persisted or reused across calls.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedAdvertisement {
    pub id: Uuid,
    pub content: AdvertisementContent,
}

impl GeneratedAdvertisement {
    pub fn new(content: AdvertisementContent) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
        }
    }

    /// The sentinel returned when no advertisement could be generated: a
    /// fresh impression id with no renderable content.
    pub fn empty() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            content: AdvertisementContent {
                content_id: Uuid::nil(),
                renderable_content: String::new(),
                marketplace_id: String::new(),
                created_at: now,
                updated_at: now,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.renderable_content.is_empty()
    }
}

/// Information derived from a service request. A customer is recognized iff a
/// non-blank customer id was supplied; blank ids normalize to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    customer_id: Option<String>,
    marketplace_id: String,
}

impl RequestContext {
    pub fn new(customer_id: Option<&str>, marketplace_id: &str) -> Self {
        let customer_id = customer_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        Self {
            customer_id,
            marketplace_id: marketplace_id.to_string(),
        }
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    pub fn marketplace_id(&self) -> &str {
        &self.marketplace_id
    }

    pub fn is_recognized_customer(&self) -> bool {
        self.customer_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_customer_id_is_unrecognized() {
        assert!(!RequestContext::new(None, "US").is_recognized_customer());
        assert!(!RequestContext::new(Some(""), "US").is_recognized_customer());
        assert!(!RequestContext::new(Some("   "), "US").is_recognized_customer());
        assert!(RequestContext::new(Some("c-1"), "US").is_recognized_customer());
    }

    #[test]
    fn new_targeting_group_starts_at_initial_ctr() {
        let group = TargetingGroup::new(Uuid::new_v4(), vec![]);
        assert_eq!(group.click_through_rate, INITIAL_CLICK_THROUGH_RATE);
        assert!(!group.targeting_group_id.is_nil());
        assert!(group.predicates.is_empty());
    }

    #[test]
    fn empty_advertisement_has_fresh_id_and_no_content() {
        let a = GeneratedAdvertisement::empty();
        let b = GeneratedAdvertisement::empty();
        assert!(a.is_empty());
        assert!(a.content.renderable_content.is_empty());
        assert_ne!(a.id, b.id);
    }
}
