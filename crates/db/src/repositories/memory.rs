use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use netprice_core::domain::condition::{ConditionId, ConditionRecord, ScaleTier};
use netprice_core::errors::PricingError;
use netprice_core::pricing::repository::{ConditionQuery, ConditionRepository};

use super::{ConditionStore, RepositoryError};

/// Condition source held entirely in memory. Applies the same coarse filter
/// as the SQL repository so both behave alike behind the engine.
#[derive(Default)]
pub struct InMemoryConditionRepository {
    conditions: RwLock<BTreeMap<ConditionId, ConditionRecord>>,
    tiers: RwLock<BTreeMap<ConditionId, Vec<ScaleTier>>>,
}

impl InMemoryConditionRepository {
    pub fn from_snapshot(conditions: Vec<ConditionRecord>, tiers: Vec<ScaleTier>) -> Self {
        let conditions =
            conditions.into_iter().map(|record| (record.id.clone(), record)).collect();
        let mut by_condition: BTreeMap<ConditionId, Vec<ScaleTier>> = BTreeMap::new();
        for tier in tiers {
            by_condition.entry(tier.condition_id.clone()).or_default().push(tier);
        }

        Self { conditions: RwLock::new(conditions), tiers: RwLock::new(by_condition) }
    }
}

fn coarse_match(record: &ConditionRecord, query: &ConditionQuery) -> bool {
    let key = &record.key;
    record.tenant_id == query.tenant_id
        && key.customer_id.as_ref().map_or(true, |id| id == &query.customer_id)
        && key.material_id.as_ref().map_or(true, |id| id == &query.material_id)
        && key
            .material_group
            .as_ref()
            .map_or(true, |group| query.material_group.as_ref() == Some(group))
        && record.is_valid_on(query.as_of)
}

#[async_trait]
impl ConditionRepository for InMemoryConditionRepository {
    async fn fetch_conditions(
        &self,
        query: &ConditionQuery,
    ) -> Result<Vec<ConditionRecord>, PricingError> {
        let conditions = self.conditions.read().await;
        Ok(conditions.values().filter(|record| coarse_match(record, query)).cloned().collect())
    }

    async fn fetch_scale_tiers(
        &self,
        condition_id: &ConditionId,
    ) -> Result<Vec<ScaleTier>, PricingError> {
        let tiers = self.tiers.read().await;
        Ok(tiers.get(condition_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl ConditionStore for InMemoryConditionRepository {
    async fn save_condition(&self, condition: ConditionRecord) -> Result<(), RepositoryError> {
        let mut conditions = self.conditions.write().await;
        conditions.insert(condition.id.clone(), condition);
        Ok(())
    }

    async fn save_scale_tier(&self, tier: ScaleTier) -> Result<(), RepositoryError> {
        let mut tiers = self.tiers.write().await;
        let entry = tiers.entry(tier.condition_id.clone()).or_default();
        entry.retain(|existing| existing.scale_from != tier.scale_from);
        entry.push(tier);
        Ok(())
    }
}
