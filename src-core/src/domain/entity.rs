//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities.
//! All entities must have a unique ID and be cheap to clone.

use serde::{Deserialize, Serialize};

/// Core trait for all domain entities
pub trait Entity: Sized + Clone {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + Ord + std::hash::Hash;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainError {
    NotFound(String),
    InvalidInput(String),
    Conflict(String),
    Internal(String),
    /// The store directory, schema or store file could not be opened.
    /// Nothing works without a store; callers usually treat this as fatal.
    StoreUnavailable { reason: String, cause: String },
}

impl DomainError {
    pub fn store_unavailable(cause: impl std::fmt::Display) -> Self {
        DomainError::StoreUnavailable {
            reason: "There was an error creating or loading the application's saved data".to_string(),
            cause: cause.to_string(),
        }
    }

    /// Only a missing store is fatal; everything else is logged and recovered.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DomainError::StoreUnavailable { .. })
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DomainError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            DomainError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
            DomainError::StoreUnavailable { reason, cause } => write!(
                f,
                "Failed to initialize the application's saved data: {} ({})",
                reason, cause
            ),
        }
    }
}

impl std::error::Error for DomainError {}
