use rust_decimal::Decimal;

use crate::domain::condition::{ConditionId, RateType};
use crate::errors::PricingError;
use crate::pricing::scale::ResolvedRate;

/// Monetary contribution of a resolved rate.
///
/// Percentages are always taken of the evaluation's base price, never of the
/// running net price. The result is unsigned; the composer decides the sign.
/// A percentage whose product leaves the decimal range is a data fault of
/// `condition_id`.
pub fn apply_rate(
    condition_id: &ConditionId,
    rate: &ResolvedRate,
    base_price: Decimal,
) -> Result<Decimal, PricingError> {
    match rate.rate_type {
        RateType::Amount => Ok(rate.rate_value),
        RateType::Percentage => rate
            .rate_value
            .checked_div(Decimal::ONE_HUNDRED)
            .and_then(|fraction| fraction.checked_mul(base_price))
            .ok_or_else(|| {
                PricingError::data_integrity(
                    condition_id,
                    format!("{}% of {base_price} overflows", rate.rate_value),
                )
            }),
    }
}
