use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::PricingError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub String);

/// Immutable input of one pricing evaluation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingContext {
    pub tenant_id: TenantId,
    pub customer_id: CustomerId,
    pub material_id: MaterialId,
    pub material_group: Option<String>,
    pub quantity: Decimal,
    pub as_of: NaiveDate,
    pub region: Option<String>,
    pub incoterm: Option<String>,
}

impl PricingContext {
    /// Rejects contexts that must never reach the matcher.
    pub fn validate(&self) -> Result<(), PricingError> {
        require_present("tenant_id", &self.tenant_id.0)?;
        require_present("customer_id", &self.customer_id.0)?;
        require_present("material_id", &self.material_id.0)?;

        if self.quantity < Decimal::ZERO {
            return Err(PricingError::InvalidContext {
                field: "quantity",
                reason: format!("quantity must not be negative, got {}", self.quantity),
            });
        }

        Ok(())
    }
}

fn require_present(field: &'static str, value: &str) -> Result<(), PricingError> {
    if value.trim().is_empty() {
        return Err(PricingError::InvalidContext {
            field,
            reason: format!("{field} is required"),
        });
    }
    Ok(())
}
