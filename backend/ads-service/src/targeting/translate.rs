/// Conversion between the attribute-map predicate shape accepted on the API
/// and the internal predicate model.
///
/// Validation failures are client errors naming the offending field, the
/// valid values, and the value received.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Comparison, PredicateKind, TargetingPredicate};
use crate::error::{AppError, Result};

pub const PREDICATE_TYPES: [&str; 6] = [
    "AGE",
    "CATEGORY_SPEND_FREQUENCY",
    "CATEGORY_SPEND_VALUE",
    "PARENT",
    "PRIME_BENEFIT",
    "RECOGNIZED",
];

/// Age ranges estimated by the customer service.
pub const AGE_RANGES: [&str; 8] = [
    "UNDER_18",
    "AGE_18_TO_21",
    "AGE_22_TO_25",
    "AGE_26_TO_30",
    "AGE_31_TO_35",
    "AGE_36_TO_45",
    "AGE_46_TO_60",
    "OVER_60",
];

/// Spend categories reported by the customer service.
pub const CATEGORIES: [&str; 13] = [
    "PRIME_VIDEO",
    "AMAZON_MUSIC",
    "KINDLE",
    "ECHO",
    "FRESH",
    "TECHNICAL_BOOKS",
    "CHILDRENS_BOOKS",
    "MAGAZINES",
    "VIDEO_GAMES",
    "ELECTRONICS",
    "COMPUTERS",
    "HOME",
    "PET",
];

/// Benefit types granted by the prime-club service.
pub const BENEFITS: [&str; 6] = [
    "MOM_LITE",
    "MOM_DISCOUNT",
    "FREE_TRIDENT_VOD",
    "FREE_EXPEDITED_SHIPPING",
    "DIM_SUM",
    "AMZN4KIDS",
];

const AGE_KEY: &str = "AgeRange";
const CATEGORY_KEY: &str = "Category";
const COMPARISON_KEY: &str = "Comparison";
const PURCHASE_NUMBER_KEY: &str = "NumberOfPurchases";
const VALUE_KEY: &str = "Value";
const BENEFIT_KEY: &str = "Benefit";

/// The wire shape of a targeting predicate: a type tag, a negate flag, and a
/// string attribute map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetingPredicateDto {
    pub predicate_type: String,
    #[serde(default)]
    pub negate: bool,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// Build an internal predicate from its wire shape, validating every
/// attribute against the known vocabularies.
pub fn predicate_from_dto(dto: &TargetingPredicateDto) -> Result<TargetingPredicate> {
    let kind = match dto.predicate_type.as_str() {
        "AGE" => PredicateKind::Age {
            age_range: attribute_in(dto, AGE_KEY, &AGE_RANGES)?,
        },
        "CATEGORY_SPEND_FREQUENCY" => PredicateKind::CategorySpendFrequency {
            category: attribute_in(dto, CATEGORY_KEY, &CATEGORIES)?,
            comparison: comparison_attribute(dto)?,
            target_purchases: int_attribute(dto, PURCHASE_NUMBER_KEY)?,
        },
        "CATEGORY_SPEND_VALUE" => PredicateKind::CategorySpendValue {
            category: attribute_in(dto, CATEGORY_KEY, &CATEGORIES)?,
            comparison: comparison_attribute(dto)?,
            target_value: int_attribute(dto, VALUE_KEY)?,
        },
        "PARENT" => PredicateKind::Parent,
        "PRIME_BENEFIT" => PredicateKind::PrimeBenefit {
            benefit: attribute_in(dto, BENEFIT_KEY, &BENEFITS)?,
        },
        "RECOGNIZED" => PredicateKind::Recognized,
        unknown => {
            return Err(AppError::Validation(format!(
                "An unknown predicate type was requested, {unknown}. Valid predicate types are: {PREDICATE_TYPES:?}"
            )))
        }
    };

    Ok(TargetingPredicate {
        negate: dto.negate,
        kind,
    })
}

/// Render an internal predicate back into its wire shape.
pub fn predicate_to_dto(predicate: &TargetingPredicate) -> TargetingPredicateDto {
    let (predicate_type, attributes) = match &predicate.kind {
        PredicateKind::Age { age_range } => (
            "AGE",
            HashMap::from([(AGE_KEY.to_string(), age_range.clone())]),
        ),
        PredicateKind::CategorySpendFrequency {
            category,
            comparison,
            target_purchases,
        } => (
            "CATEGORY_SPEND_FREQUENCY",
            HashMap::from([
                (CATEGORY_KEY.to_string(), category.clone()),
                (COMPARISON_KEY.to_string(), comparison.to_string()),
                (PURCHASE_NUMBER_KEY.to_string(), target_purchases.to_string()),
            ]),
        ),
        PredicateKind::CategorySpendValue {
            category,
            comparison,
            target_value,
        } => (
            "CATEGORY_SPEND_VALUE",
            HashMap::from([
                (CATEGORY_KEY.to_string(), category.clone()),
                (COMPARISON_KEY.to_string(), comparison.to_string()),
                (VALUE_KEY.to_string(), target_value.to_string()),
            ]),
        ),
        PredicateKind::PrimeBenefit { benefit } => (
            "PRIME_BENEFIT",
            HashMap::from([(BENEFIT_KEY.to_string(), benefit.clone())]),
        ),
        PredicateKind::Parent => ("PARENT", HashMap::new()),
        PredicateKind::Recognized => ("RECOGNIZED", HashMap::new()),
    };

    TargetingPredicateDto {
        predicate_type: predicate_type.to_string(),
        negate: predicate.negate,
        attributes,
    }
}

fn invalid_attribute(
    dto: &TargetingPredicateDto,
    key: &str,
    valid: &dyn std::fmt::Debug,
    received: Option<&str>,
) -> AppError {
    AppError::Validation(format!(
        "A {} predicate requires a valid {} attribute. Valid values include: {:?}. Value specified was {}.",
        dto.predicate_type,
        key,
        valid,
        received.unwrap_or("<missing>"),
    ))
}

fn attribute_in(dto: &TargetingPredicateDto, key: &str, valid: &[&str]) -> Result<String> {
    let value = dto.attributes.get(key).map(String::as_str);
    match value {
        Some(v) if valid.contains(&v) => Ok(v.to_string()),
        _ => Err(invalid_attribute(dto, key, &valid, value)),
    }
}

fn comparison_attribute(dto: &TargetingPredicateDto) -> Result<Comparison> {
    let value = dto.attributes.get(COMPARISON_KEY).map(String::as_str);
    value
        .and_then(|v| v.parse::<Comparison>().ok())
        .ok_or_else(|| invalid_attribute(dto, COMPARISON_KEY, &Comparison::VALUES, value))
}

fn int_attribute(dto: &TargetingPredicateDto, key: &str) -> Result<i32> {
    let value = dto.attributes.get(key).map(String::as_str);
    value
        .and_then(|v| v.parse::<i32>().ok())
        .ok_or_else(|| invalid_attribute(dto, key, &"any integer", value))
}
