//! Candidate filtering and priority ranking.
//!
//! A candidate survives when it is active, valid on the as-of date and every
//! key field is either a wildcard or equal to the context value. Among the
//! survivors of one condition type the lowest `condition_priority` wins; the
//! matcher does no specificity scoring of its own. Equal priorities fall back
//! to the lexicographically lowest condition id so the choice is reproducible.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::condition::{ConditionRecord, ConditionType};
use crate::domain::context::PricingContext;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyField {
    Customer,
    Material,
    MaterialGroup,
    Region,
    Incoterm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    Blocked,
    NotYetValid,
    Expired,
    KeyMismatch(KeyField),
}

/// Checks one candidate against the context, reporting the first failed rule.
pub fn check_candidate(
    record: &ConditionRecord,
    context: &PricingContext,
) -> Result<(), Rejection> {
    if !record.is_active() {
        return Err(Rejection::Blocked);
    }
    if record.valid_from.is_some_and(|from| context.as_of < from) {
        return Err(Rejection::NotYetValid);
    }
    if record.valid_to.is_some_and(|to| context.as_of > to) {
        return Err(Rejection::Expired);
    }

    let key = &record.key;
    let checks = [
        (
            KeyField::Customer,
            key_matches(
                key.customer_id.as_ref().map(|id| id.0.as_str()),
                Some(context.customer_id.0.as_str()),
            ),
        ),
        (
            KeyField::Material,
            key_matches(
                key.material_id.as_ref().map(|id| id.0.as_str()),
                Some(context.material_id.0.as_str()),
            ),
        ),
        (
            KeyField::MaterialGroup,
            key_matches(key.material_group.as_deref(), context.material_group.as_deref()),
        ),
        (KeyField::Region, key_matches(key.region.as_deref(), context.region.as_deref())),
        (KeyField::Incoterm, key_matches(key.incoterm.as_deref(), context.incoterm.as_deref())),
    ];

    match checks.into_iter().find(|(_, matched)| !matched) {
        Some((field, _)) => Err(Rejection::KeyMismatch(field)),
        None => Ok(()),
    }
}

/// `None` on the condition matches anything, including an absent context value.
fn key_matches(condition_value: Option<&str>, context_value: Option<&str>) -> bool {
    match (condition_value, context_value) {
        (None, _) => true,
        (Some(expected), Some(actual)) => expected == actual,
        (Some(_), None) => false,
    }
}

fn rank(left: &ConditionRecord, right: &ConditionRecord) -> Ordering {
    left.condition_priority
        .cmp(&right.condition_priority)
        .then_with(|| left.id.cmp(&right.id))
}

/// Best surviving candidate of `condition_type`, or `None` when nothing applies.
pub fn find_best_match<'a>(
    context: &PricingContext,
    condition_type: ConditionType,
    candidates: &'a [ConditionRecord],
) -> Option<&'a ConditionRecord> {
    candidates
        .iter()
        .filter(|record| record.condition_type == condition_type)
        .filter(|record| match check_candidate(record, context) {
            Ok(()) => true,
            Err(rejection) => {
                debug!(
                    event_name = "pricing.match.rejected",
                    condition_id = %record.id,
                    condition_type = %condition_type,
                    rejection = ?rejection,
                    "condition rejected for context"
                );
                false
            }
        })
        .min_by(|left, right| rank(left, right))
}
