//! Walks the condition types in processing order and accumulates the result.
//!
//! BASE_PRICE establishes the net price, DISCOUNT subtracts from it and every
//! other type adds to it. A type without a winning condition contributes zero
//! and leaves no trace, except BASE_PRICE whose absence aborts the evaluation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::domain::condition::{ConditionId, ConditionRecord, ConditionType, RateType, ScaleTier};
use crate::domain::context::PricingContext;
use crate::domain::outcome::{PricingOutcome, PricingResult, PricingTraceStep};
use crate::errors::PricingError;
use crate::pricing::matcher::find_best_match;
use crate::pricing::rate::apply_rate;
use crate::pricing::scale::resolve_rate;

/// Tiers of the selected scaled conditions, keyed by condition id.
pub type TierLookup = BTreeMap<ConditionId, Vec<ScaleTier>>;

/// Winning condition per type, chosen before any tier lookup happens.
#[derive(Clone, Debug, Default)]
pub struct ConditionSelection<'a> {
    winners: BTreeMap<ConditionType, &'a ConditionRecord>,
}

impl<'a> ConditionSelection<'a> {
    pub fn get(&self, condition_type: ConditionType) -> Option<&'a ConditionRecord> {
        self.winners.get(&condition_type).copied()
    }

    pub fn base_price(&self) -> Option<&'a ConditionRecord> {
        self.get(ConditionType::BasePrice)
    }

    /// Winners flagged as scaled, in processing order.
    pub fn scaled(&self) -> impl Iterator<Item = &'a ConditionRecord> + '_ {
        ConditionType::PROCESSING_ORDER
            .into_iter()
            .filter_map(|condition_type| self.get(condition_type))
            .filter(|record| record.has_scale)
    }

    pub fn len(&self) -> usize {
        self.winners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winners.is_empty()
    }
}

pub fn select_conditions<'a>(
    context: &PricingContext,
    candidates: &'a [ConditionRecord],
) -> ConditionSelection<'a> {
    let winners = ConditionType::PROCESSING_ORDER
        .into_iter()
        .filter_map(|condition_type| {
            find_best_match(context, condition_type, candidates)
                .map(|record| (condition_type, record))
        })
        .collect();

    ConditionSelection { winners }
}

/// Accumulator for one evaluation. Create it from the base price, then feed
/// the remaining winners in processing order.
#[derive(Clone, Debug)]
pub struct PriceComposer {
    quantity: Decimal,
    result: PricingResult,
}

impl PriceComposer {
    pub fn start(
        base: &ConditionRecord,
        tiers: &[ScaleTier],
        quantity: Decimal,
    ) -> Result<Self, PricingError> {
        if base.condition_type != ConditionType::BasePrice {
            return Err(PricingError::data_integrity(
                &base.id,
                format!("expected a BASE_PRICE condition, got {}", base.condition_type),
            ));
        }

        let rate = resolve_rate(base, tiers, quantity)?;
        if rate.rate_type == RateType::Percentage {
            return Err(PricingError::data_integrity(
                &base.id,
                "BASE_PRICE cannot be expressed as a percentage",
            ));
        }

        let base_price = apply_rate(&base.id, &rate, Decimal::ZERO)?;
        let result = PricingResult {
            base_price,
            discounts: Decimal::ZERO,
            surcharges: Decimal::ZERO,
            freight: Decimal::ZERO,
            tax: Decimal::ZERO,
            lme_adjustment: Decimal::ZERO,
            net_price: base_price,
            applied_conditions: vec![base.id.clone()],
            trace: vec![PricingTraceStep {
                condition_type: ConditionType::BasePrice,
                condition_id: base.id.clone(),
                rate_type: rate.rate_type,
                rate_value: rate.rate_value,
                scale_band: rate.scale_band,
                net_effect: base_price,
            }],
        };

        Ok(Self { quantity, result })
    }

    pub fn apply(
        &mut self,
        record: &ConditionRecord,
        tiers: &[ScaleTier],
    ) -> Result<(), PricingError> {
        let rate = resolve_rate(record, tiers, self.quantity)?;
        let amount = apply_rate(&record.id, &rate, self.result.base_price)?;

        let (total, net_effect) = match record.condition_type {
            ConditionType::BasePrice => {
                return Err(PricingError::data_integrity(
                    &record.id,
                    "base price is already established for this evaluation",
                ));
            }
            ConditionType::Discount => (&mut self.result.discounts, -amount),
            ConditionType::Surcharge => (&mut self.result.surcharges, amount),
            ConditionType::Freight => (&mut self.result.freight, amount),
            ConditionType::Tax => (&mut self.result.tax, amount),
            ConditionType::LmeAdjustment => (&mut self.result.lme_adjustment, amount),
        };
        let updated_total = checked_sum(&record.id, "contribution total", *total, amount)?;
        let updated_net =
            checked_sum(&record.id, "net price", self.result.net_price, net_effect)?;
        *total = updated_total;
        self.result.net_price = updated_net;

        self.result.applied_conditions.push(record.id.clone());
        self.result.trace.push(PricingTraceStep {
            condition_type: record.condition_type,
            condition_id: record.id.clone(),
            rate_type: rate.rate_type,
            rate_value: rate.rate_value,
            scale_band: rate.scale_band,
            net_effect,
        });

        Ok(())
    }

    pub fn finish(self) -> PricingResult {
        self.result
    }
}

/// Runs the composition over an already made selection.
pub fn compose(
    context: &PricingContext,
    selection: &ConditionSelection<'_>,
    tiers: &TierLookup,
) -> Result<PricingOutcome, PricingError> {
    let Some(base) = selection.base_price() else {
        return Ok(PricingOutcome::NoBasePrice);
    };

    let mut composer = PriceComposer::start(base, tiers_for(tiers, base), context.quantity)?;
    for condition_type in ConditionType::PROCESSING_ORDER.into_iter().skip(1) {
        if let Some(record) = selection.get(condition_type) {
            composer.apply(record, tiers_for(tiers, record))?;
        }
    }

    Ok(PricingOutcome::Found(composer.finish()))
}

/// Matches and composes in one pass. Only usable when every tier is at hand.
pub fn price(
    context: &PricingContext,
    candidates: &[ConditionRecord],
    tiers: &TierLookup,
) -> Result<PricingOutcome, PricingError> {
    context.validate()?;
    let selection = select_conditions(context, candidates);
    compose(context, &selection, tiers)
}

fn checked_sum(
    condition_id: &ConditionId,
    what: &str,
    total: Decimal,
    delta: Decimal,
) -> Result<Decimal, PricingError> {
    total.checked_add(delta).ok_or_else(|| {
        PricingError::data_integrity(condition_id, format!("{what} overflows adding {delta}"))
    })
}

fn tiers_for<'t>(tiers: &'t TierLookup, record: &ConditionRecord) -> &'t [ScaleTier] {
    tiers.get(&record.id).map(Vec::as_slice).unwrap_or(&[])
}
