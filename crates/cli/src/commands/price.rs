use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::commands::{build_runtime, load_config, CommandResult};
use netprice_core::audit::{AuditEvent, InMemoryAuditSink};
use netprice_core::domain::context::{CustomerId, MaterialId, PricingContext, TenantId};
use netprice_core::domain::outcome::PricingOutcome;
use netprice_core::errors::PricingError;
use netprice_core::pricing::{DeterministicPricingEngine, PricingEngine};
use netprice_db::{connect_with_config, SqlConditionRepository};

#[derive(Debug, Clone, Args)]
pub struct PriceArgs {
    #[arg(long, help = "Tenant owning the agreement data (defaults to pricing.default_tenant)")]
    pub tenant: Option<String>,
    #[arg(long, help = "Customer being priced")]
    pub customer: String,
    #[arg(long, help = "Material being priced")]
    pub material: String,
    #[arg(long = "material-group", help = "Material group of the material")]
    pub material_group: Option<String>,
    #[arg(long, allow_negative_numbers = true, help = "Ordered quantity")]
    pub quantity: String,
    #[arg(long, help = "Pricing date (YYYY-MM-DD)")]
    pub date: String,
    #[arg(long, help = "Delivery region")]
    pub region: Option<String>,
    #[arg(long, help = "Incoterm of the delivery")]
    pub incoterm: Option<String>,
}

impl PriceArgs {
    /// Builds the context. Unparseable numbers and dates are context faults,
    /// same as a negative quantity. `--tenant` wins over `default_tenant`.
    pub fn to_context(&self, default_tenant: Option<&str>) -> Result<PricingContext, PricingError> {
        let tenant = non_blank(self.tenant.as_deref())
            .or_else(|| non_blank(default_tenant))
            .ok_or_else(|| PricingError::InvalidContext {
                field: "tenant_id",
                reason: "pass --tenant or set pricing.default_tenant".to_string(),
            })?;
        let quantity = Decimal::from_str(self.quantity.trim()).map_err(|_| {
            PricingError::InvalidContext {
                field: "quantity",
                reason: format!("`{}` is not a number", self.quantity),
            }
        })?;
        let as_of = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|_| {
            PricingError::InvalidContext {
                field: "as_of",
                reason: format!("`{}` is not a YYYY-MM-DD date", self.date),
            }
        })?;

        Ok(PricingContext {
            tenant_id: TenantId(tenant),
            customer_id: CustomerId(self.customer.clone()),
            material_id: MaterialId(self.material.clone()),
            material_group: non_blank(self.material_group.as_deref()),
            quantity,
            as_of,
            region: non_blank(self.region.as_deref()),
            incoterm: non_blank(self.incoterm.as_deref()),
        })
    }
}

pub fn run(args: &PriceArgs) -> CommandResult {
    let config = match load_config("price") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let context = match args.to_context(config.pricing.default_tenant.as_deref()) {
        Ok(context) => context,
        Err(error) => return pricing_failure(error),
    };
    let runtime = match build_runtime("price") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = match connect_with_config(&config.database).await {
            Ok(pool) => pool,
            Err(error) => {
                return Err(CommandResult::failure(
                    "price",
                    "db_connectivity",
                    error.to_string(),
                    4,
                ));
            }
        };

        let audit = config.pricing.audit.then(InMemoryAuditSink::default);
        let mut engine = DeterministicPricingEngine::new(SqlConditionRepository::new(pool.clone()));
        if let Some(sink) = &audit {
            engine = engine.with_audit_sink(Arc::new(sink.clone()));
        }
        let outcome = engine.evaluate(&context).await;

        pool.close().await;
        let events = audit.as_ref().map(InMemoryAuditSink::events).unwrap_or_default();
        outcome.map(|outcome| (outcome, events)).map_err(pricing_failure)
    });

    match result {
        Ok((outcome, events)) => render_outcome(&outcome, &events),
        Err(failure) => failure,
    }
}

/// Renders the outcome; a non-empty audit trail is attached as `data.audit`.
fn render_outcome(outcome: &PricingOutcome, audit: &[AuditEvent]) -> CommandResult {
    let mut data = match serde_json::to_value(outcome) {
        Ok(data) => data,
        Err(error) => {
            return CommandResult::failure("price", "serialization", error.to_string(), 3);
        }
    };
    if !audit.is_empty() {
        match serde_json::to_value(audit) {
            Ok(events) => {
                if let Some(fields) = data.as_object_mut() {
                    fields.insert("audit".to_string(), events);
                }
            }
            Err(error) => {
                return CommandResult::failure("price", "serialization", error.to_string(), 3);
            }
        }
    }

    let message = match outcome {
        PricingOutcome::Found(result) => format!("net price {}", result.net_price),
        PricingOutcome::NoBasePrice => outcome.user_message().to_string(),
    };
    CommandResult::success_with_data("price", message, Some(data))
}

fn pricing_failure(error: PricingError) -> CommandResult {
    let error_class = error.class();
    let exit_code = match error {
        PricingError::InvalidContext { .. } => 6,
        PricingError::DataIntegrity { .. } => 7,
        PricingError::Repository(_) => 8,
    };
    let detail = error.to_string();
    let correlation_id = Uuid::new_v4().to_string();
    let interface = error.into_interface(correlation_id.clone());

    CommandResult::failure_with_data(
        "price",
        error_class,
        interface.user_message(),
        exit_code,
        Some(json!({ "correlation_id": correlation_id, "detail": detail })),
    )
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}
