//! Consultation store layer
//!
//! Provides:
//! - Consultation record models
//! - The store gateway over the remote data service's REST interface
//! - Mock fallback data for unconfigured or unreachable deployments

pub mod models;

mod gateway;

pub use gateway::{fallback_consultations, ConsultationStore, ListFilter};
pub use models::{
    Consultation, ConsultationUpdate, DeletedMarker, NewConsultation, ViewerConsultation,
};

use serde::{Deserialize, Serialize};

/// How a store operation was satisfied.
///
/// Remote failures are recovered locally, so callers always get a value; the
/// variant records whether it actually reached the remote service.
#[derive(Debug, Clone)]
pub enum StoreOutcome<T> {
    /// The remote data service accepted the operation
    Persisted(T),

    /// The remote service was unconfigured or unreachable and a local
    /// fallback value was served instead
    Fallback { value: T, reason: String },
}

impl<T> StoreOutcome<T> {
    /// The value, regardless of how it was produced
    pub fn into_value(self) -> T {
        match self {
            StoreOutcome::Persisted(value) => value,
            StoreOutcome::Fallback { value, .. } => value,
        }
    }

    /// Borrow the value, regardless of how it was produced
    pub fn value(&self) -> &T {
        match self {
            StoreOutcome::Persisted(value) => value,
            StoreOutcome::Fallback { value, .. } => value,
        }
    }

    /// Whether the operation reached the remote service
    pub fn is_persisted(&self) -> bool {
        matches!(self, StoreOutcome::Persisted(_))
    }
}

/// Store health descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Remote service configured and answering
    Healthy,

    /// Remote service configured but answering with errors
    Degraded,

    /// Remote service configured but unreachable
    Unhealthy,

    /// No remote service configured; running on mock data
    Warning,
}

impl HealthStatus {
    /// The wire name of this status
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Warning => "warning",
        }
    }
}
