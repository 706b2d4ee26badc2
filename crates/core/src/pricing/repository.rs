use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::condition::{ConditionId, ConditionRecord, ScaleTier};
use crate::domain::context::{CustomerId, MaterialId, PricingContext, TenantId};
use crate::errors::PricingError;

/// Coarse lookup key handed to the repository.
///
/// Implementations may pre-filter on tenant, the customer/material/group keys
/// and the validity window, but must not drop anything the matcher could still
/// accept. Status, region and incoterm filtering stay with the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionQuery {
    pub tenant_id: TenantId,
    pub customer_id: CustomerId,
    pub material_id: MaterialId,
    pub material_group: Option<String>,
    pub region: Option<String>,
    pub incoterm: Option<String>,
    pub as_of: NaiveDate,
}

impl From<&PricingContext> for ConditionQuery {
    fn from(context: &PricingContext) -> Self {
        Self {
            tenant_id: context.tenant_id.clone(),
            customer_id: context.customer_id.clone(),
            material_id: context.material_id.clone(),
            material_group: context.material_group.clone(),
            region: context.region.clone(),
            incoterm: context.incoterm.clone(),
            as_of: context.as_of,
        }
    }
}

#[async_trait]
pub trait ConditionRepository: Send + Sync {
    async fn fetch_conditions(
        &self,
        query: &ConditionQuery,
    ) -> Result<Vec<ConditionRecord>, PricingError>;

    /// Tiers of one scaled condition, in any order.
    async fn fetch_scale_tiers(
        &self,
        condition_id: &ConditionId,
    ) -> Result<Vec<ScaleTier>, PricingError>;
}
