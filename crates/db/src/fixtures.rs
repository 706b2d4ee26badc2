use sqlx::Executor;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Conditions the demo agreement is expected to contain after seeding.
const SEED_CONDITIONS: &[SeedConditionContract] = &[
    SeedConditionContract {
        id: "BP-CUST-MAT",
        condition_type: "BASE_PRICE",
        status: "active",
        tier_count: 3,
        description: "customer + material base price, scaled 1000/900/800",
    },
    SeedConditionContract {
        id: "BP-CUST-GRP",
        condition_type: "BASE_PRICE",
        status: "active",
        tier_count: 0,
        description: "customer + material group base price",
    },
    SeedConditionContract {
        id: "BP-GRP",
        condition_type: "BASE_PRICE",
        status: "active",
        tier_count: 0,
        description: "material group base price",
    },
    SeedConditionContract {
        id: "BP-MAT-GENERIC",
        condition_type: "BASE_PRICE",
        status: "active",
        tier_count: 0,
        description: "generic material base price",
    },
    SeedConditionContract {
        id: "DSC-CUST",
        condition_type: "DISCOUNT",
        status: "active",
        tier_count: 0,
        description: "10% customer discount",
    },
    SeedConditionContract {
        id: "SUR-LEGACY",
        condition_type: "SURCHARGE",
        status: "active",
        tier_count: 0,
        description: "surcharge that expired end of 2025",
    },
    SeedConditionContract {
        id: "FRT-EU-DAP",
        condition_type: "FREIGHT",
        status: "active",
        tier_count: 0,
        description: "freight for region EU shipped DAP",
    },
    SeedConditionContract {
        id: "TAX-EU",
        condition_type: "TAX",
        status: "active",
        tier_count: 0,
        description: "19% tax for region EU",
    },
    SeedConditionContract {
        id: "LME-COPPER",
        condition_type: "LME_ADJUSTMENT",
        status: "active",
        tier_count: 0,
        description: "metal exchange adjustment for copper",
    },
    SeedConditionContract {
        id: "BP-COPPER-HOLD",
        condition_type: "BASE_PRICE",
        status: "blocked",
        tier_count: 0,
        description: "blocked copper base price",
    },
    SeedConditionContract {
        id: "BP-COPPER-2025",
        condition_type: "BASE_PRICE",
        status: "active",
        tier_count: 0,
        description: "copper base price valid only in 2025",
    },
];

/// Deterministic demo agreement used by `netprice seed` and integration tests.
///
/// Covers the ranking, scaling, region/incoterm keys, expiry and blocking
/// cases of the matcher against tenant `demo`.
pub struct DemoAgreementDataset;

impl DemoAgreementDataset {
    pub const TENANT_ID: &'static str = "demo";
    pub const SQL: &'static str = include_str!("../../../config/fixtures/demo_agreement.sql");

    /// Loads the dataset. Safe to run repeatedly.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let conditions_seeded = SEED_CONDITIONS
            .iter()
            .map(|condition| SeededCondition {
                id: condition.id,
                condition_type: condition.condition_type,
                description: condition.description,
            })
            .collect::<Vec<_>>();
        let tiers_seeded = SEED_CONDITIONS.iter().map(|condition| condition.tier_count).sum();

        Ok(SeedResult { conditions_seeded, tiers_seeded })
    }

    /// Checks every expected condition and its tier count.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::with_capacity(SEED_CONDITIONS.len() * 2);

        for condition in SEED_CONDITIONS {
            let exists: i64 = sqlx::query_scalar(
                "SELECT EXISTS(
                     SELECT 1 FROM pricing_condition
                     WHERE id = ?1 AND tenant_id = ?2 AND condition_type = ?3 AND status = ?4
                 )",
            )
            .bind(condition.id)
            .bind(Self::TENANT_ID)
            .bind(condition.condition_type)
            .bind(condition.status)
            .fetch_one(pool)
            .await?;
            checks.push((condition.id, exists == 1));

            let tier_count: i64 = sqlx::query_scalar(
                "SELECT COUNT(1) FROM pricing_scale_tier WHERE condition_id = ?1",
            )
            .bind(condition.id)
            .fetch_one(pool)
            .await?;
            checks.push((condition.tier_label(), tier_count == condition.tier_count));
        }

        let all_present = checks.iter().all(|(_, ok)| *ok);
        Ok(VerificationResult { all_present, checks })
    }

    /// Removes the seeded rows; tiers go with their conditions.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;

        for condition in SEED_CONDITIONS {
            sqlx::query("DELETE FROM pricing_scale_tier WHERE condition_id = ?1")
                .bind(condition.id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM pricing_condition WHERE id = ?1")
                .bind(condition.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct SeedConditionContract {
    id: &'static str,
    condition_type: &'static str,
    status: &'static str,
    tier_count: i64,
    description: &'static str,
}

impl SeedConditionContract {
    fn tier_label(&self) -> &'static str {
        if self.tier_count > 0 {
            "scaled-condition-tiers"
        } else {
            "unscaled-condition-has-no-tiers"
        }
    }
}

#[derive(Debug)]
pub struct SeedResult {
    pub conditions_seeded: Vec<SeededCondition>,
    pub tiers_seeded: i64,
}

#[derive(Debug)]
pub struct SeededCondition {
    pub id: &'static str,
    pub condition_type: &'static str,
    pub description: &'static str,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
