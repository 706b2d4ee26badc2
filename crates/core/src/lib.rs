pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;

pub use audit::{AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink};
pub use domain::condition::{
    AgreementId, ConditionId, ConditionKey, ConditionRecord, ConditionStatus, ConditionType,
    RateType, ScaleTier,
};
pub use domain::context::{CustomerId, MaterialId, PricingContext, TenantId};
pub use domain::outcome::{PricingOutcome, PricingResult, PricingTraceStep, ScaleBand};
pub use errors::{DomainError, InterfaceError, PricingError};
pub use pricing::{
    ConditionQuery, ConditionRepository, DeterministicPricingEngine, PricingEngine,
};
