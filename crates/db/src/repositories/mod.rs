use async_trait::async_trait;
use thiserror::Error;

use netprice_core::domain::condition::{ConditionRecord, ScaleTier};
use netprice_core::errors::{DomainError, PricingError};

pub mod condition;
pub mod memory;

pub use condition::SqlConditionRepository;
pub use memory::InMemoryConditionRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<DomainError> for RepositoryError {
    fn from(value: DomainError) -> Self {
        Self::Decode(value.to_string())
    }
}

impl From<RepositoryError> for PricingError {
    fn from(value: RepositoryError) -> Self {
        PricingError::Repository(value.to_string())
    }
}

/// Write side of the condition tables, used by seeding and administration.
/// Pricing itself only reads through `ConditionRepository`.
#[async_trait]
pub trait ConditionStore: Send + Sync {
    async fn save_condition(&self, condition: ConditionRecord) -> Result<(), RepositoryError>;
    async fn save_scale_tier(&self, tier: ScaleTier) -> Result<(), RepositoryError>;
}
