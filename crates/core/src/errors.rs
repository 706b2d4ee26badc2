use thiserror::Error;

use crate::domain::condition::ConditionId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown {kind} `{value}`")]
    UnknownValue { kind: &'static str, value: String },
}

/// Failures of a pricing evaluation. A missing base price is not one of them.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("invalid pricing context: {field}: {reason}")]
    InvalidContext { field: &'static str, reason: String },
    #[error("data integrity fault on condition {condition_id}: {reason}")]
    DataIntegrity { condition_id: ConditionId, reason: String },
    #[error("condition repository failure: {0}")]
    Repository(String),
}

impl PricingError {
    pub fn data_integrity(condition_id: &ConditionId, reason: impl Into<String>) -> Self {
        Self::DataIntegrity { condition_id: condition_id.clone(), reason: reason.into() }
    }

    pub fn class(&self) -> &'static str {
        match self {
            Self::InvalidContext { .. } => "invalid_context",
            Self::DataIntegrity { .. } => "data_integrity",
            Self::Repository(_) => "repository",
        }
    }
}

impl From<DomainError> for PricingError {
    fn from(value: DomainError) -> Self {
        Self::Repository(value.to_string())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("pricing configuration fault: {message}")]
    ConfigurationFault { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The pricing request could not be processed. Check inputs and try again."
            }
            Self::ConfigurationFault { .. } => {
                "Agreement pricing data is inconsistent. An administrator must correct it."
            }
            Self::ServiceUnavailable { .. } => {
                "The pricing service is temporarily unavailable. Please retry shortly."
            }
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::ConfigurationFault { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. } => correlation_id,
        }
    }
}

impl PricingError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        match self {
            Self::InvalidContext { .. } => {
                InterfaceError::BadRequest { message: self.to_string(), correlation_id }
            }
            Self::DataIntegrity { .. } => {
                InterfaceError::ConfigurationFault { message: self.to_string(), correlation_id }
            }
            Self::Repository(message) => {
                InterfaceError::ServiceUnavailable { message, correlation_id }
            }
        }
    }
}
