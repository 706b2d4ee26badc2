use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use netprice_core::audit::{AuditOutcome, InMemoryAuditSink};
use netprice_core::domain::condition::{
    AgreementId, ConditionId, ConditionKey, ConditionRecord, ConditionStatus, ConditionType,
    RateType, ScaleTier,
};
use netprice_core::domain::context::{CustomerId, MaterialId, PricingContext, TenantId};
use netprice_core::domain::outcome::PricingOutcome;
use netprice_core::errors::PricingError;
use netprice_core::pricing::{
    ConditionQuery, ConditionRepository, DeterministicPricingEngine, PricingEngine,
};

const TENANT: &str = "tenant-a";

/// Fixed condition set. Returns every row of the tenant so the engine does
/// all of the key matching itself.
struct StaticConditionRepository {
    conditions: Vec<ConditionRecord>,
    tiers: Vec<ScaleTier>,
    fail_with: Option<String>,
    fetches: AtomicUsize,
}

impl StaticConditionRepository {
    fn new(conditions: Vec<ConditionRecord>) -> Self {
        Self { conditions, tiers: Vec::new(), fail_with: None, fetches: AtomicUsize::new(0) }
    }

    fn with_tiers(mut self, tiers: Vec<ScaleTier>) -> Self {
        self.tiers = tiers;
        self
    }

    fn failing(message: &str) -> Self {
        Self { fail_with: Some(message.to_string()), ..Self::new(Vec::new()) }
    }
}

#[async_trait]
impl ConditionRepository for StaticConditionRepository {
    async fn fetch_conditions(
        &self,
        query: &ConditionQuery,
    ) -> Result<Vec<ConditionRecord>, PricingError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.fail_with {
            return Err(PricingError::Repository(message.clone()));
        }
        Ok(self
            .conditions
            .iter()
            .filter(|record| record.tenant_id == query.tenant_id)
            .cloned()
            .collect())
    }

    async fn fetch_scale_tiers(
        &self,
        condition_id: &ConditionId,
    ) -> Result<Vec<ScaleTier>, PricingError> {
        Ok(self.tiers.iter().filter(|tier| &tier.condition_id == condition_id).cloned().collect())
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn context(quantity: i64) -> PricingContext {
    PricingContext {
        tenant_id: TenantId(TENANT.to_string()),
        customer_id: CustomerId("CUST-1".to_string()),
        material_id: MaterialId("MAT-1".to_string()),
        material_group: Some("GRP-1".to_string()),
        quantity: Decimal::from(quantity),
        as_of: date(2026, 6, 15),
        region: None,
        incoterm: None,
    }
}

fn condition(
    id: &str,
    condition_type: ConditionType,
    rate_type: RateType,
    rate_value: i64,
) -> ConditionRecord {
    ConditionRecord {
        id: ConditionId(id.to_string()),
        agreement_id: AgreementId("AG-1".to_string()),
        tenant_id: TenantId(TENANT.to_string()),
        condition_type,
        rate_type,
        rate_value: Decimal::from(rate_value),
        has_scale: false,
        condition_priority: 10,
        key: ConditionKey {
            customer_id: Some(CustomerId("CUST-1".to_string())),
            material_id: Some(MaterialId("MAT-1".to_string())),
            ..ConditionKey::default()
        },
        status: ConditionStatus::Active,
        valid_from: Some(date(2026, 1, 1)),
        valid_to: Some(date(2026, 12, 31)),
    }
}

fn base_price(id: &str, amount: i64) -> ConditionRecord {
    condition(id, ConditionType::BasePrice, RateType::Amount, amount)
}

fn tier(condition_id: &str, from: i64, to: Option<i64>, amount: i64) -> ScaleTier {
    ScaleTier {
        condition_id: ConditionId(condition_id.to_string()),
        scale_from: Decimal::from(from),
        scale_to: to.map(Decimal::from),
        rate_type: RateType::Amount,
        rate_value: Decimal::from(amount),
    }
}

async fn evaluate(
    repository: StaticConditionRepository,
    context: &PricingContext,
) -> Result<PricingOutcome, PricingError> {
    DeterministicPricingEngine::new(repository).evaluate(context).await
}

#[tokio::test]
async fn single_base_price_is_the_net_price() {
    let outcome = evaluate(
        StaticConditionRepository::new(vec![base_price("BP", 1000)]),
        &context(10),
    )
    .await
    .expect("evaluate");

    let result = outcome.into_result().expect("base price found");
    assert_eq!(result.base_price, Decimal::from(1000));
    assert_eq!(result.net_price, Decimal::from(1000));
    assert_eq!(result.applied_conditions, vec![ConditionId("BP".to_string())]);
}

#[tokio::test]
async fn scaled_base_price_follows_the_quantity_band() {
    let mut scaled = base_price("BP-SCALED", 0);
    scaled.has_scale = true;
    let tiers = vec![
        tier("BP-SCALED", 50, None, 800),
        tier("BP-SCALED", 0, Some(10), 1000),
        tier("BP-SCALED", 10, Some(50), 900),
    ];

    for (quantity, expected) in [(5, 1000), (20, 900), (80, 800), (10, 900), (50, 800)] {
        let repository =
            StaticConditionRepository::new(vec![scaled.clone()]).with_tiers(tiers.clone());
        let result = evaluate(repository, &context(quantity))
            .await
            .expect("evaluate")
            .into_result()
            .expect("base price found");

        assert_eq!(result.base_price, Decimal::from(expected), "quantity {quantity}");
        let band = result.trace[0].scale_band.as_ref().expect("scale band recorded");
        assert!(band.scale_from <= Decimal::from(quantity));
    }
}

#[tokio::test]
async fn percentage_discount_applies_against_the_base_price() {
    let repository = StaticConditionRepository::new(vec![
        base_price("BP", 1000),
        condition("DSC", ConditionType::Discount, RateType::Percentage, 10),
    ]);

    let result = evaluate(repository, &context(3))
        .await
        .expect("evaluate")
        .into_result()
        .expect("base price found");

    assert_eq!(result.discounts, Decimal::from(100));
    assert_eq!(result.net_price, Decimal::from(900));
    assert_eq!(result.trace[1].net_effect, Decimal::from(-100));
}

#[tokio::test]
async fn freight_requires_matching_region_and_incoterm() {
    let mut freight = condition("FRT", ConditionType::Freight, RateType::Amount, 25);
    freight.key.region = Some("EU".to_string());
    freight.key.incoterm = Some("DAP".to_string());
    let conditions = vec![base_price("BP", 1000), freight];

    let mut matching = context(1);
    matching.region = Some("EU".to_string());
    matching.incoterm = Some("DAP".to_string());
    let result = evaluate(StaticConditionRepository::new(conditions.clone()), &matching)
        .await
        .expect("evaluate")
        .into_result()
        .expect("base price found");
    assert_eq!(result.freight, Decimal::from(25));
    assert_eq!(result.net_price, Decimal::from(1025));

    let mut other_incoterm = matching.clone();
    other_incoterm.incoterm = Some("FCA".to_string());
    let mut no_region = matching.clone();
    no_region.region = None;

    for mismatched in [other_incoterm, no_region] {
        let result = evaluate(StaticConditionRepository::new(conditions.clone()), &mismatched)
            .await
            .expect("evaluate")
            .into_result()
            .expect("base price found");
        assert_eq!(result.freight, Decimal::ZERO);
        assert_eq!(result.net_price, Decimal::from(1000));
        assert!(!result.applied_conditions.contains(&ConditionId("FRT".to_string())));
    }
}

#[tokio::test]
async fn most_specific_base_price_wins_by_priority() {
    let mut customer_material = base_price("BP-A", 900);
    customer_material.condition_priority = 10;

    let mut customer_group = base_price("BP-B", 950);
    customer_group.condition_priority = 20;
    customer_group.key.material_id = None;
    customer_group.key.material_group = Some("GRP-1".to_string());

    let mut group_only = base_price("BP-C", 980);
    group_only.condition_priority = 30;
    group_only.key = ConditionKey {
        material_group: Some("GRP-1".to_string()),
        ..ConditionKey::default()
    };

    let mut material_only = base_price("BP-D", 1100);
    material_only.condition_priority = 40;
    material_only.key.customer_id = None;

    let conditions = vec![material_only, group_only, customer_group, customer_material];

    let result = evaluate(StaticConditionRepository::new(conditions.clone()), &context(1))
        .await
        .expect("evaluate")
        .into_result()
        .expect("base price found");
    assert_eq!(result.base_price, Decimal::from(900));
    assert_eq!(result.applied_conditions[0], ConditionId("BP-A".to_string()));

    let remaining = conditions.into_iter().filter(|record| record.id.0 != "BP-A").collect();
    let result = evaluate(StaticConditionRepository::new(remaining), &context(1))
        .await
        .expect("evaluate")
        .into_result()
        .expect("base price found");
    assert_eq!(result.base_price, Decimal::from(950));
}

#[tokio::test]
async fn equal_priority_falls_back_to_lowest_condition_id() {
    let repository =
        StaticConditionRepository::new(vec![base_price("BP-Z", 700), base_price("BP-M", 750)]);

    let result = evaluate(repository, &context(1))
        .await
        .expect("evaluate")
        .into_result()
        .expect("base price found");
    assert_eq!(result.applied_conditions[0], ConditionId("BP-M".to_string()));
    assert_eq!(result.base_price, Decimal::from(750));
}

#[tokio::test]
async fn expired_or_blocked_base_price_requires_manual_pricing() {
    let mut expired = base_price("BP-OLD", 1000);
    expired.valid_to = Some(date(2026, 6, 14));
    let mut blocked = base_price("BP-HOLD", 900);
    blocked.status = ConditionStatus::Blocked;
    let discount = condition("DSC", ConditionType::Discount, RateType::Percentage, 10);

    let sink = InMemoryAuditSink::default();
    let engine = DeterministicPricingEngine::new(StaticConditionRepository::new(vec![
        expired, blocked, discount,
    ]))
    .with_audit_sink(Arc::new(sink.clone()));

    let outcome = engine.evaluate(&context(1)).await.expect("evaluate");
    assert_eq!(outcome, PricingOutcome::NoBasePrice);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "pricing.no_base_price");
    assert_eq!(events[0].outcome, AuditOutcome::Rejected);
}

#[tokio::test]
async fn expired_best_match_falls_back_to_the_next_valid_base_price() {
    let mut expired = base_price("BP-PREFERRED", 850);
    expired.condition_priority = 1;
    expired.valid_to = Some(date(2026, 6, 14));
    let mut fallback = base_price("BP-FALLBACK", 990);
    fallback.condition_priority = 20;
    fallback.key.customer_id = None;

    let result = evaluate(StaticConditionRepository::new(vec![expired, fallback]), &context(1))
        .await
        .expect("evaluate")
        .into_result()
        .expect("base price found");

    assert_eq!(result.applied_conditions, vec![ConditionId("BP-FALLBACK".to_string())]);
    assert_eq!(result.contribution(ConditionType::BasePrice), Decimal::from(990));
    assert_eq!(result.net_price, Decimal::from(990));
}

#[tokio::test]
async fn validity_bounds_are_inclusive() {
    let mut last_day = base_price("BP", 1000);
    last_day.valid_from = Some(date(2026, 6, 15));
    last_day.valid_to = Some(date(2026, 6, 15));

    let outcome = evaluate(StaticConditionRepository::new(vec![last_day]), &context(1))
        .await
        .expect("evaluate");
    assert!(outcome.result().is_some());
}

#[tokio::test]
async fn repeated_evaluations_serialize_identically() {
    let mut tax = condition("TAX", ConditionType::Tax, RateType::Percentage, 19);
    tax.key = ConditionKey::default();
    let conditions = vec![
        base_price("BP", 1000),
        condition("DSC", ConditionType::Discount, RateType::Percentage, 10),
        condition("SUR", ConditionType::Surcharge, RateType::Amount, 15),
        tax,
    ];
    let engine = DeterministicPricingEngine::new(StaticConditionRepository::new(conditions));

    let first = engine.evaluate(&context(7)).await.expect("first evaluation");
    let second = engine.evaluate(&context(7)).await.expect("second evaluation");

    assert_eq!(
        serde_json::to_string(&first).expect("serialize"),
        serde_json::to_string(&second).expect("serialize")
    );
    let result = first.into_result().expect("base price found");
    assert_eq!(result.net_price, Decimal::from(1105));
}

#[tokio::test]
async fn negative_quantity_is_rejected_before_fetching() {
    let repository = StaticConditionRepository::new(vec![base_price("BP", 1000)]);
    let engine = DeterministicPricingEngine::new(repository);

    let error = engine.evaluate(&context(-1)).await.expect_err("negative quantity");

    assert!(matches!(error, PricingError::InvalidContext { field: "quantity", .. }));
    assert_eq!(engine.repository().fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn overlapping_tiers_are_a_data_integrity_fault() {
    let mut scaled = base_price("BP-SCALED", 0);
    scaled.has_scale = true;
    let repository = StaticConditionRepository::new(vec![scaled]).with_tiers(vec![
        tier("BP-SCALED", 0, Some(20), 1000),
        tier("BP-SCALED", 10, None, 900),
    ]);
    let sink = InMemoryAuditSink::default();
    let engine =
        DeterministicPricingEngine::new(repository).with_audit_sink(Arc::new(sink.clone()));

    let error = engine.evaluate(&context(5)).await.expect_err("overlapping tiers");

    assert_eq!(error.class(), "data_integrity");
    assert_eq!(sink.events()[0].outcome, AuditOutcome::Failed);
}

#[tokio::test]
async fn repository_failures_propagate() {
    let error = evaluate(StaticConditionRepository::failing("connection reset"), &context(1))
        .await
        .expect_err("repository failure");

    assert_eq!(error, PricingError::Repository("connection reset".to_string()));
}
