/// HTTP handlers for the ads service
///
/// - Advertisements: generate the best advertisement for a customer
/// - Content: create, update, delete advertising content
/// - Targeting groups: add groups to content, update click-through rates
pub mod advertisements;
pub mod content;
pub mod targeting_groups;

use serde::Serialize;
use uuid::Uuid;

use crate::models::{AdvertisementContent, TargetingGroup};
use crate::targeting::{predicate_to_dto, TargetingPredicateDto};

pub use advertisements::generate_advertisement;
pub use content::{create_content, delete_content, update_content};
pub use targeting_groups::{add_targeting_group, update_click_through_rate};

#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub content_id: Uuid,
    pub marketplace_id: String,
    pub renderable_content: String,
}

impl From<AdvertisementContent> for ContentResponse {
    fn from(content: AdvertisementContent) -> Self {
        Self {
            content_id: content.content_id,
            marketplace_id: content.marketplace_id,
            renderable_content: content.renderable_content,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TargetingGroupResponse {
    pub targeting_group_id: Uuid,
    pub content_id: Uuid,
    pub click_through_rate: f64,
    pub targeting_predicates: Vec<TargetingPredicateDto>,
}

impl From<TargetingGroup> for TargetingGroupResponse {
    fn from(group: TargetingGroup) -> Self {
        Self {
            targeting_group_id: group.targeting_group_id,
            content_id: group.content_id,
            click_through_rate: group.click_through_rate,
            targeting_predicates: group.predicates.iter().map(predicate_to_dto).collect(),
        }
    }
}
