//! Quantity-tier resolution for scaled conditions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::condition::{ConditionRecord, RateType, ScaleTier};
use crate::domain::outcome::ScaleBand;
use crate::errors::PricingError;

/// Rate a condition contributes with after scale resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRate {
    pub rate_type: RateType,
    pub rate_value: Decimal,
    pub scale_band: Option<ScaleBand>,
}

impl ResolvedRate {
    pub fn unscaled(record: &ConditionRecord) -> Self {
        Self { rate_type: record.rate_type, rate_value: record.rate_value, scale_band: None }
    }
}

/// Picks the effective rate of `record` for `quantity`.
///
/// Unscaled conditions pass through unchanged and `tiers` is ignored. For
/// scaled conditions the tiers are validated first, then walked in ascending
/// `scale_from` order and the first tier covering the quantity wins. A gap in
/// the tiers is reported, never defaulted.
pub fn resolve_rate(
    record: &ConditionRecord,
    tiers: &[ScaleTier],
    quantity: Decimal,
) -> Result<ResolvedRate, PricingError> {
    if !record.has_scale {
        return Ok(ResolvedRate::unscaled(record));
    }

    let ordered = validate_tiers(record, tiers)?;
    let tier = ordered.into_iter().find(|tier| tier.covers(quantity)).ok_or_else(|| {
        PricingError::data_integrity(
            &record.id,
            format!("no scale tier covers quantity {quantity}"),
        )
    })?;

    Ok(ResolvedRate {
        rate_type: tier.rate_type,
        rate_value: tier.rate_value,
        scale_band: Some(ScaleBand { scale_from: tier.scale_from, scale_to: tier.scale_to }),
    })
}

/// Returns the tiers sorted by `scale_from` once they are known to be consistent.
pub fn validate_tiers<'a>(
    record: &ConditionRecord,
    tiers: &'a [ScaleTier],
) -> Result<Vec<&'a ScaleTier>, PricingError> {
    if tiers.is_empty() {
        return Err(PricingError::data_integrity(&record.id, "scaled condition has no tiers"));
    }

    let mut ordered: Vec<&ScaleTier> = tiers.iter().collect();
    ordered.sort_by(|left, right| left.scale_from.cmp(&right.scale_from));

    for tier in &ordered {
        if tier.condition_id != record.id {
            return Err(PricingError::data_integrity(
                &record.id,
                format!("tier belongs to condition {}", tier.condition_id),
            ));
        }
        if tier.scale_from < Decimal::ZERO {
            return Err(PricingError::data_integrity(
                &record.id,
                format!("tier starts below zero at {}", tier.scale_from),
            ));
        }
        if let Some(to) = tier.scale_to {
            if to <= tier.scale_from {
                return Err(PricingError::data_integrity(
                    &record.id,
                    format!("tier [{}, {to}) is empty", tier.scale_from),
                ));
            }
        }
    }

    for pair in ordered.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        match current.scale_to {
            None => {
                return Err(PricingError::data_integrity(
                    &record.id,
                    format!(
                        "unbounded tier from {} overlaps tier from {}",
                        current.scale_from, next.scale_from
                    ),
                ));
            }
            Some(to) if to > next.scale_from => {
                return Err(PricingError::data_integrity(
                    &record.id,
                    format!(
                        "tier [{}, {to}) overlaps tier from {}",
                        current.scale_from, next.scale_from
                    ),
                ));
            }
            Some(_) => {}
        }
    }

    Ok(ordered)
}
