use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};
use tracing::debug;

use netprice_core::domain::condition::{
    AgreementId, ConditionId, ConditionKey, ConditionRecord, ConditionStatus, ConditionType,
    RateType, ScaleTier,
};
use netprice_core::domain::context::{CustomerId, MaterialId, TenantId};
use netprice_core::errors::PricingError;
use netprice_core::pricing::repository::{ConditionQuery, ConditionRepository};

use super::{ConditionStore, RepositoryError};
use crate::DbPool;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed condition source.
///
/// `fetch_conditions` narrows by tenant, by the customer/material/group keys
/// (NULL or equal) and by the validity window. Status, region and incoterm are
/// left to the matcher so the query stays cacheable per customer and material.
pub struct SqlConditionRepository {
    pool: DbPool,
}

impl SqlConditionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(
        &self,
        id: &ConditionId,
    ) -> Result<Option<ConditionRecord>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, agreement_id, tenant_id, condition_type, rate_type,
                    CAST(rate_value AS TEXT) AS rate_value, has_scale, condition_priority,
                    key_customer_id, key_material_id, key_material_group, key_region,
                    key_incoterm, status, valid_from, valid_to
             FROM pricing_condition WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_condition(r)?)),
            None => Ok(None),
        }
    }

    async fn load_conditions(
        &self,
        query: &ConditionQuery,
    ) -> Result<Vec<ConditionRecord>, RepositoryError> {
        let as_of = query.as_of.format(DATE_FORMAT).to_string();
        let rows = sqlx::query(
            "SELECT id, agreement_id, tenant_id, condition_type, rate_type,
                    CAST(rate_value AS TEXT) AS rate_value, has_scale, condition_priority,
                    key_customer_id, key_material_id, key_material_group, key_region,
                    key_incoterm, status, valid_from, valid_to
             FROM pricing_condition
             WHERE tenant_id = ?1
               AND (key_customer_id IS NULL OR key_customer_id = ?2)
               AND (key_material_id IS NULL OR key_material_id = ?3)
               AND (key_material_group IS NULL OR key_material_group = ?4)
               AND (valid_from IS NULL OR valid_from <= ?5)
               AND (valid_to IS NULL OR valid_to >= ?5)
             ORDER BY condition_type, condition_priority, id",
        )
        .bind(&query.tenant_id.0)
        .bind(&query.customer_id.0)
        .bind(&query.material_id.0)
        .bind(query.material_group.as_deref())
        .bind(&as_of)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_condition).collect()
    }

    async fn load_scale_tiers(
        &self,
        condition_id: &ConditionId,
    ) -> Result<Vec<ScaleTier>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT condition_id, CAST(scale_from AS TEXT) AS scale_from,
                    CAST(scale_to AS TEXT) AS scale_to, rate_type,
                    CAST(rate_value AS TEXT) AS rate_value
             FROM pricing_scale_tier
             WHERE condition_id = ?",
        )
        .bind(&condition_id.0)
        .fetch_all(&self.pool)
        .await?;

        let mut tiers = rows.iter().map(row_to_tier).collect::<Result<Vec<_>, _>>()?;
        // TEXT ordering is lexicographic, so sort numerically here
        tiers.sort_by(|left, right| left.scale_from.cmp(&right.scale_from));
        Ok(tiers)
    }
}

#[async_trait]
impl ConditionRepository for SqlConditionRepository {
    async fn fetch_conditions(
        &self,
        query: &ConditionQuery,
    ) -> Result<Vec<ConditionRecord>, PricingError> {
        let conditions = self.load_conditions(query).await?;
        debug!(
            event_name = "db.conditions.fetched",
            tenant_id = %query.tenant_id.0,
            customer_id = %query.customer_id.0,
            material_id = %query.material_id.0,
            candidates = conditions.len(),
            "loaded candidate conditions"
        );
        Ok(conditions)
    }

    async fn fetch_scale_tiers(
        &self,
        condition_id: &ConditionId,
    ) -> Result<Vec<ScaleTier>, PricingError> {
        Ok(self.load_scale_tiers(condition_id).await?)
    }
}

#[async_trait]
impl ConditionStore for SqlConditionRepository {
    async fn save_condition(&self, condition: ConditionRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO pricing_condition (
                 id, agreement_id, tenant_id, condition_type, rate_type, rate_value, has_scale,
                 condition_priority, key_customer_id, key_material_id, key_material_group,
                 key_region, key_incoterm, status, valid_from, valid_to
             )
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 agreement_id = excluded.agreement_id,
                 tenant_id = excluded.tenant_id,
                 condition_type = excluded.condition_type,
                 rate_type = excluded.rate_type,
                 rate_value = excluded.rate_value,
                 has_scale = excluded.has_scale,
                 condition_priority = excluded.condition_priority,
                 key_customer_id = excluded.key_customer_id,
                 key_material_id = excluded.key_material_id,
                 key_material_group = excluded.key_material_group,
                 key_region = excluded.key_region,
                 key_incoterm = excluded.key_incoterm,
                 status = excluded.status,
                 valid_from = excluded.valid_from,
                 valid_to = excluded.valid_to,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')",
        )
        .bind(&condition.id.0)
        .bind(&condition.agreement_id.0)
        .bind(&condition.tenant_id.0)
        .bind(condition.condition_type.as_str())
        .bind(condition.rate_type.as_str())
        .bind(condition.rate_value.to_string())
        .bind(i64::from(condition.has_scale))
        .bind(condition.condition_priority)
        .bind(condition.key.customer_id.as_ref().map(|id| id.0.as_str()))
        .bind(condition.key.material_id.as_ref().map(|id| id.0.as_str()))
        .bind(condition.key.material_group.as_deref())
        .bind(condition.key.region.as_deref())
        .bind(condition.key.incoterm.as_deref())
        .bind(condition.status.as_str())
        .bind(condition.valid_from.map(|date| date.format(DATE_FORMAT).to_string()))
        .bind(condition.valid_to.map(|date| date.format(DATE_FORMAT).to_string()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save_scale_tier(&self, tier: ScaleTier) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO pricing_scale_tier
                 (condition_id, scale_from, scale_to, rate_type, rate_value)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(condition_id, scale_from) DO UPDATE SET
                 scale_to = excluded.scale_to,
                 rate_type = excluded.rate_type,
                 rate_value = excluded.rate_value",
        )
        .bind(&tier.condition_id.0)
        .bind(tier.scale_from.to_string())
        .bind(tier.scale_to.map(|to| to.to_string()))
        .bind(tier.rate_type.as_str())
        .bind(tier.rate_value.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn row_to_condition(row: &SqliteRow) -> Result<ConditionRecord, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let agreement_id: String =
        row.try_get("agreement_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let tenant_id: String =
        row.try_get("tenant_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let condition_type: String =
        row.try_get("condition_type").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let rate_type: String =
        row.try_get("rate_type").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let rate_value: String =
        row.try_get("rate_value").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let has_scale: i64 =
        row.try_get("has_scale").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let condition_priority: i32 =
        row.try_get("condition_priority").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let key_customer_id: Option<String> =
        row.try_get("key_customer_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let key_material_id: Option<String> =
        row.try_get("key_material_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let key_material_group: Option<String> =
        row.try_get("key_material_group").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let key_region: Option<String> =
        row.try_get("key_region").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let key_incoterm: Option<String> =
        row.try_get("key_incoterm").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status: String =
        row.try_get("status").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let valid_from: Option<String> =
        row.try_get("valid_from").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let valid_to: Option<String> =
        row.try_get("valid_to").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(ConditionRecord {
        condition_type: ConditionType::from_str(&condition_type)?,
        rate_type: RateType::from_str(&rate_type)?,
        rate_value: parse_decimal("rate_value", &rate_value)?,
        has_scale: has_scale != 0,
        condition_priority,
        key: ConditionKey {
            customer_id: key_customer_id.map(CustomerId),
            material_id: key_material_id.map(MaterialId),
            material_group: key_material_group,
            region: key_region,
            incoterm: key_incoterm,
        },
        status: ConditionStatus::from_str(&status)?,
        valid_from: valid_from.as_deref().map(|raw| parse_date("valid_from", raw)).transpose()?,
        valid_to: valid_to.as_deref().map(|raw| parse_date("valid_to", raw)).transpose()?,
        id: ConditionId(id),
        agreement_id: AgreementId(agreement_id),
        tenant_id: TenantId(tenant_id),
    })
}

fn row_to_tier(row: &SqliteRow) -> Result<ScaleTier, RepositoryError> {
    let condition_id: String =
        row.try_get("condition_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let scale_from: String =
        row.try_get("scale_from").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let scale_to: Option<String> =
        row.try_get("scale_to").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let rate_type: String =
        row.try_get("rate_type").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let rate_value: String =
        row.try_get("rate_value").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(ScaleTier {
        condition_id: ConditionId(condition_id),
        scale_from: parse_decimal("scale_from", &scale_from)?,
        scale_to: scale_to.as_deref().map(|raw| parse_decimal("scale_to", raw)).transpose()?,
        rate_type: RateType::from_str(&rate_type)?,
        rate_value: parse_decimal("rate_value", &rate_value)?,
    })
}

fn parse_decimal(column: &str, raw: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(raw.trim())
        .map_err(|e| RepositoryError::Decode(format!("{column} `{raw}` is not a decimal: {e}")))
}

fn parse_date(column: &str, raw: &str) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| RepositoryError::Decode(format!("{column} `{raw}` is not a date: {e}")))
}
