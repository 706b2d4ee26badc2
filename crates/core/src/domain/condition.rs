use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::context::{CustomerId, MaterialId, TenantId};
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConditionId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgreementId(pub String);

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of pricing condition. Evaluation walks these in [`ConditionType::PROCESSING_ORDER`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionType {
    BasePrice,
    Discount,
    Surcharge,
    Freight,
    Tax,
    LmeAdjustment,
}

impl ConditionType {
    pub const PROCESSING_ORDER: [ConditionType; 6] = [
        ConditionType::BasePrice,
        ConditionType::Discount,
        ConditionType::Surcharge,
        ConditionType::Freight,
        ConditionType::Tax,
        ConditionType::LmeAdjustment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BasePrice => "BASE_PRICE",
            Self::Discount => "DISCOUNT",
            Self::Surcharge => "SURCHARGE",
            Self::Freight => "FREIGHT",
            Self::Tax => "TAX",
            Self::LmeAdjustment => "LME_ADJUSTMENT",
        }
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "BASE_PRICE" => Ok(Self::BasePrice),
            "DISCOUNT" => Ok(Self::Discount),
            "SURCHARGE" => Ok(Self::Surcharge),
            "FREIGHT" => Ok(Self::Freight),
            "TAX" => Ok(Self::Tax),
            "LME_ADJUSTMENT" => Ok(Self::LmeAdjustment),
            other => {
                Err(DomainError::UnknownValue { kind: "condition_type", value: other.to_string() })
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateType {
    Amount,
    Percentage,
}

impl RateType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amount => "AMOUNT",
            Self::Percentage => "PERCENTAGE",
        }
    }
}

impl FromStr for RateType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "AMOUNT" => Ok(Self::Amount),
            "PERCENTAGE" => Ok(Self::Percentage),
            other => Err(DomainError::UnknownValue { kind: "rate_type", value: other.to_string() }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionStatus {
    Active,
    Blocked,
}

impl ConditionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Blocked => "blocked",
        }
    }
}

impl FromStr for ConditionStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "blocked" => Ok(Self::Blocked),
            other => Err(DomainError::UnknownValue {
                kind: "condition_status",
                value: other.to_string(),
            }),
        }
    }
}

/// Key fields of a condition. `None` is a wildcard.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionKey {
    pub customer_id: Option<CustomerId>,
    pub material_id: Option<MaterialId>,
    pub material_group: Option<String>,
    pub region: Option<String>,
    pub incoterm: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionRecord {
    pub id: ConditionId,
    pub agreement_id: AgreementId,
    pub tenant_id: TenantId,
    pub condition_type: ConditionType,
    pub rate_type: RateType,
    pub rate_value: Decimal,
    pub has_scale: bool,
    /// Lower number wins.
    pub condition_priority: i32,
    pub key: ConditionKey,
    pub status: ConditionStatus,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
}

impl ConditionRecord {
    /// Inclusive on both ends; a missing bound is open.
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        let started = self.valid_from.map_or(true, |from| date >= from);
        let not_ended = self.valid_to.map_or(true, |to| date <= to);
        started && not_ended
    }

    pub fn is_active(&self) -> bool {
        self.status == ConditionStatus::Active
    }
}

/// Quantity band of a scaled condition: `scale_from <= q < scale_to`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleTier {
    pub condition_id: ConditionId,
    pub scale_from: Decimal,
    pub scale_to: Option<Decimal>,
    pub rate_type: RateType,
    pub rate_value: Decimal,
}

impl ScaleTier {
    pub fn covers(&self, quantity: Decimal) -> bool {
        self.scale_from <= quantity && self.scale_to.map_or(true, |to| quantity < to)
    }
}
