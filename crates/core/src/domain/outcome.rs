use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::condition::{ConditionId, ConditionType, RateType};

/// Quantity band that supplied the rate of a scaled condition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleBand {
    pub scale_from: Decimal,
    pub scale_to: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub condition_type: ConditionType,
    pub condition_id: ConditionId,
    pub rate_type: RateType,
    pub rate_value: Decimal,
    pub scale_band: Option<ScaleBand>,
    /// Signed effect on the net price; discounts are negative.
    pub net_effect: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    pub base_price: Decimal,
    pub discounts: Decimal,
    pub surcharges: Decimal,
    pub freight: Decimal,
    pub tax: Decimal,
    pub lme_adjustment: Decimal,
    pub net_price: Decimal,
    /// Ids in processing order, not priority order.
    pub applied_conditions: Vec<ConditionId>,
    pub trace: Vec<PricingTraceStep>,
}

impl PricingResult {
    pub fn contribution(&self, condition_type: ConditionType) -> Decimal {
        match condition_type {
            ConditionType::BasePrice => self.base_price,
            ConditionType::Discount => self.discounts,
            ConditionType::Surcharge => self.surcharges,
            ConditionType::Freight => self.freight,
            ConditionType::Tax => self.tax,
            ConditionType::LmeAdjustment => self.lme_adjustment,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum PricingOutcome {
    Found(PricingResult),
    NoBasePrice,
}

impl PricingOutcome {
    pub fn result(&self) -> Option<&PricingResult> {
        match self {
            Self::Found(result) => Some(result),
            Self::NoBasePrice => None,
        }
    }

    pub fn into_result(self) -> Option<PricingResult> {
        match self {
            Self::Found(result) => Some(result),
            Self::NoBasePrice => None,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Found(_) => "Net price calculated from agreement conditions.",
            Self::NoBasePrice => "No agreement base price applies. Manual pricing required.",
        }
    }
}
