use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::audit::{AuditEvent, AuditOutcome, AuditSink};
use crate::domain::context::PricingContext;
use crate::domain::outcome::PricingOutcome;
use crate::errors::PricingError;
use crate::pricing::composer::{compose, select_conditions, TierLookup};
use crate::pricing::repository::{ConditionQuery, ConditionRepository};

const AUDIT_ACTOR: &str = "pricing-engine";

#[async_trait]
pub trait PricingEngine: Send + Sync {
    async fn evaluate(&self, context: &PricingContext) -> Result<PricingOutcome, PricingError>;
}

/// Repository-backed engine. Holds no per-evaluation state, so one instance
/// can serve concurrent evaluations.
pub struct DeterministicPricingEngine<R> {
    repository: R,
    audit_sink: Option<Arc<dyn AuditSink>>,
}

impl<R> DeterministicPricingEngine<R> {
    pub fn new(repository: R) -> Self {
        Self { repository, audit_sink: None }
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    fn emit(&self, event: impl FnOnce() -> AuditEvent) {
        if let Some(sink) = &self.audit_sink {
            sink.emit(event());
        }
    }
}

impl<R: ConditionRepository> DeterministicPricingEngine<R> {
    async fn run(&self, context: &PricingContext) -> Result<PricingOutcome, PricingError> {
        context.validate()?;

        let candidates = self.repository.fetch_conditions(&ConditionQuery::from(context)).await?;
        let selection = select_conditions(context, &candidates);
        if selection.base_price().is_none() {
            return Ok(PricingOutcome::NoBasePrice);
        }

        let mut tiers = TierLookup::new();
        for record in selection.scaled() {
            let fetched = self.repository.fetch_scale_tiers(&record.id).await?;
            tiers.insert(record.id.clone(), fetched);
        }

        compose(context, &selection, &tiers)
    }
}

#[async_trait]
impl<R: ConditionRepository> PricingEngine for DeterministicPricingEngine<R> {
    async fn evaluate(&self, context: &PricingContext) -> Result<PricingOutcome, PricingError> {
        let outcome = self.run(context).await;

        match &outcome {
            Ok(PricingOutcome::Found(result)) => {
                let applied = result
                    .applied_conditions
                    .iter()
                    .map(|id| id.0.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                info!(
                    event_name = "pricing.evaluate.completed",
                    tenant_id = %context.tenant_id.0,
                    customer_id = %context.customer_id.0,
                    material_id = %context.material_id.0,
                    net_price = %result.net_price,
                    applied_conditions = %applied,
                    "net price evaluated"
                );
                self.emit(|| {
                    AuditEvent::for_context(
                        context,
                        "pricing.evaluated",
                        AUDIT_ACTOR,
                        AuditOutcome::Success,
                    )
                    .with_metadata("applied_conditions", applied.clone())
                    .with_metadata("net_price", result.net_price.to_string())
                });
            }
            Ok(PricingOutcome::NoBasePrice) => {
                info!(
                    event_name = "pricing.evaluate.no_base_price",
                    tenant_id = %context.tenant_id.0,
                    customer_id = %context.customer_id.0,
                    material_id = %context.material_id.0,
                    as_of = %context.as_of,
                    "no base price condition matched"
                );
                self.emit(|| {
                    AuditEvent::for_context(
                        context,
                        "pricing.no_base_price",
                        AUDIT_ACTOR,
                        AuditOutcome::Rejected,
                    )
                });
            }
            Err(error) => {
                warn!(
                    event_name = "pricing.evaluate.failed",
                    tenant_id = %context.tenant_id.0,
                    customer_id = %context.customer_id.0,
                    material_id = %context.material_id.0,
                    error_class = error.class(),
                    error = %error,
                    "pricing evaluation failed"
                );
                self.emit(|| {
                    AuditEvent::for_context(
                        context,
                        "pricing.failed",
                        AUDIT_ACTOR,
                        AuditOutcome::Failed,
                    )
                    .with_metadata("error_class", error.class())
                    .with_metadata("error", error.to_string())
                });
            }
        }

        outcome
    }
}
