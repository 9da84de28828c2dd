//! Gateway to the remote consultation data service
//!
//! Speaks the REST conventions of the hosted Postgres service (PostgREST
//! style: `eq.` filters, `Prefer: return=representation`). Every operation is
//! a single attempt with no retry; failures are recovered locally with
//! fallback data so a broken upstream never errors a submission.

use crate::config::StoreConfig;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::store::models::{
    Consultation, ConsultationUpdate, DeletedMarker, NewConsultation, DEFAULT_PRIORITY,
    DEFAULT_STATUS,
};
use crate::store::{HealthStatus, StoreOutcome};
use tracing::warn;

/// Filters accepted by the list operation
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Status equality filter
    pub status: Option<String>,

    /// Maximum number of records
    pub limit: Option<u32>,
}

/// Store gateway over the remote consultation table
#[derive(Clone)]
pub struct ConsultationStore {
    config: StoreConfig,
    client: reqwest::Client,
}

impl ConsultationStore {
    /// Create a new store from configuration
    pub fn new(config: StoreConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Whether a remote data service is configured
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// REST endpoint for the consultation table, when configured
    fn endpoint(&self) -> Option<(String, &str)> {
        let url = self.config.url.as_deref()?;
        let key = self.config.api_key.as_deref()?;
        Some((
            format!("{}/rest/v1/{}", url.trim_end_matches('/'), self.config.table),
            key,
        ))
    }

    /// Create a consultation record.
    ///
    /// The record is stamped locally (id, defaults, created_at) before the
    /// insert, so the fallback path can hand back the same record the remote
    /// path would have stored. Persistence failure never errors the caller.
    pub async fn create(&self, submission: NewConsultation) -> StoreOutcome<Consultation> {
        let record = submission.into_record(chrono::Utc::now().to_rfc3339());

        let (endpoint, key) = match self.endpoint() {
            Some(remote) => remote,
            None => return self.fallback("create", record, "remote store not configured"),
        };

        match self.try_insert(&endpoint, key, &record).await {
            Ok(stored) => StoreOutcome::Persisted(stored),
            Err(reason) => self.fallback("create", record, &reason),
        }
    }

    async fn try_insert(
        &self,
        endpoint: &str,
        key: &str,
        record: &Consultation,
    ) -> std::result::Result<Consultation, String> {
        let response = self
            .client
            .post(endpoint)
            .header("apikey", key)
            .header("Authorization", format!("Bearer {key}"))
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await
            .map_err(|e| format!("insert request failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("insert rejected with status {}", response.status()));
        }

        let mut rows: Vec<Consultation> = response
            .json()
            .await
            .map_err(|e| format!("insert response unreadable: {e}"))?;

        rows.pop().ok_or_else(|| "insert returned no row".to_string())
    }

    /// List consultations, newest first.
    ///
    /// On any failure this serves the fixed mock sample: never empty, never
    /// an error. Demo resilience, not durability.
    pub async fn list(&self, filter: ListFilter) -> StoreOutcome<Vec<Consultation>> {
        let (endpoint, key) = match self.endpoint() {
            Some(remote) => remote,
            None => {
                return self.fallback("list", fallback_consultations(), "remote store not configured")
            }
        };

        match self.try_list(&endpoint, key, &filter).await {
            Ok(rows) => StoreOutcome::Persisted(rows),
            Err(reason) => self.fallback("list", fallback_consultations(), &reason),
        }
    }

    async fn try_list(
        &self,
        endpoint: &str,
        key: &str,
        filter: &ListFilter,
    ) -> std::result::Result<Vec<Consultation>, String> {
        let mut query: Vec<(String, String)> = vec![
            ("select".to_string(), "*".to_string()),
            ("order".to_string(), "created_at.desc".to_string()),
        ];
        if let Some(status) = &filter.status {
            query.push(("status".to_string(), format!("eq.{status}")));
        }
        if let Some(limit) = filter.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }

        let response = self
            .client
            .get(endpoint)
            .header("apikey", key)
            .header("Authorization", format!("Bearer {key}"))
            .query(&query)
            .send()
            .await
            .map_err(|e| format!("list request failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("list rejected with status {}", response.status()));
        }

        response
            .json()
            .await
            .map_err(|e| format!("list response unreadable: {e}"))
    }

    /// Update a consultation through the allow-listed field set.
    ///
    /// `lastUpdated` and `lastUpdatedBy` are stamped unconditionally. A
    /// remote update that matches no row is a not-found error; a remote
    /// failure falls back to echoing the applied patch as if it were stored
    /// (known inconsistency, kept for availability).
    pub async fn update(
        &self,
        id: &str,
        update: &ConsultationUpdate,
        updated_by: &str,
    ) -> Result<StoreOutcome<Consultation>> {
        let stamped_at = chrono::Utc::now().to_rfc3339();

        let (endpoint, key) = match self.endpoint() {
            Some(remote) => remote,
            None => {
                let echo = self.echo_update(id, update, updated_by, &stamped_at);
                return Ok(self.fallback("update", echo, "remote store not configured"));
            }
        };

        let mut patch = serde_json::to_value(update)?;
        let fields = patch
            .as_object_mut()
            .ok_or_else(|| AppError::Internal {
                message: "update patch is not an object".to_string(),
            })?;
        fields.insert("lastUpdated".to_string(), stamped_at.clone().into());
        fields.insert("lastUpdatedBy".to_string(), updated_by.into());

        match self.try_update(&endpoint, key, id, &patch).await {
            Ok(Some(stored)) => Ok(StoreOutcome::Persisted(stored)),
            Ok(None) => Err(AppError::ConsultationNotFound),
            Err(reason) => {
                let echo = self.echo_update(id, update, updated_by, &stamped_at);
                Ok(self.fallback("update", echo, &reason))
            }
        }
    }

    async fn try_update(
        &self,
        endpoint: &str,
        key: &str,
        id: &str,
        patch: &serde_json::Value,
    ) -> std::result::Result<Option<Consultation>, String> {
        let response = self
            .client
            .patch(endpoint)
            .header("apikey", key)
            .header("Authorization", format!("Bearer {key}"))
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{id}"))])
            .json(patch)
            .send()
            .await
            .map_err(|e| format!("update request failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("update rejected with status {}", response.status()));
        }

        let mut rows: Vec<Consultation> = response
            .json()
            .await
            .map_err(|e| format!("update response unreadable: {e}"))?;

        Ok(rows.pop())
    }

    /// Synthesize the record an update would have produced, for the fallback
    /// echo path. Starts from the mock sample when the id matches one.
    fn echo_update(
        &self,
        id: &str,
        update: &ConsultationUpdate,
        updated_by: &str,
        stamped_at: &str,
    ) -> Consultation {
        let mut record = fallback_consultations()
            .into_iter()
            .find(|c| c.id == id)
            .unwrap_or_else(|| placeholder_record(id, stamped_at));

        update.apply_to(&mut record);
        record.last_updated = Some(stamped_at.to_string());
        record.last_updated_by = Some(updated_by.to_string());
        record
    }

    /// Delete a consultation.
    ///
    /// Same caveat as update: remote no-match is not-found, remote failure
    /// falls back to a synthesized success marker.
    pub async fn delete(&self, id: &str) -> Result<StoreOutcome<DeletedMarker>> {
        let marker = DeletedMarker { id: id.to_string() };

        let (endpoint, key) = match self.endpoint() {
            Some(remote) => remote,
            None => return Ok(self.fallback("delete", marker, "remote store not configured")),
        };

        match self.try_delete(&endpoint, key, id).await {
            Ok(true) => Ok(StoreOutcome::Persisted(marker)),
            Ok(false) => Err(AppError::ConsultationNotFound),
            Err(reason) => Ok(self.fallback("delete", marker, &reason)),
        }
    }

    async fn try_delete(
        &self,
        endpoint: &str,
        key: &str,
        id: &str,
    ) -> std::result::Result<bool, String> {
        let response = self
            .client
            .delete(endpoint)
            .header("apikey", key)
            .header("Authorization", format!("Bearer {key}"))
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await
            .map_err(|e| format!("delete request failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("delete rejected with status {}", response.status()));
        }

        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| format!("delete response unreadable: {e}"))?;

        Ok(!rows.is_empty())
    }

    /// Probe the remote service and derive a health descriptor
    pub async fn health_check(&self) -> HealthStatus {
        let (endpoint, key) = match self.endpoint() {
            Some(remote) => remote,
            None => return HealthStatus::Warning,
        };

        let probe = self
            .client
            .get(&endpoint)
            .header("apikey", key)
            .header("Authorization", format!("Bearer {key}"))
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await;

        match probe {
            Ok(response) if response.status().is_success() => HealthStatus::Healthy,
            Ok(response) => {
                warn!(status = %response.status(), "Store probe answered with an error");
                HealthStatus::Degraded
            }
            Err(e) => {
                warn!(error = %e, "Store probe failed");
                HealthStatus::Unhealthy
            }
        }
    }

    fn fallback<T>(&self, operation: &'static str, value: T, reason: &str) -> StoreOutcome<T> {
        warn!(operation, reason, "Serving store fallback");
        metrics::record_store_fallback(operation);
        StoreOutcome::Fallback {
            value,
            reason: reason.to_string(),
        }
    }
}

/// Record used when the fallback echo has no sample to start from
fn placeholder_record(id: &str, created_at: &str) -> Consultation {
    Consultation {
        id: id.to_string(),
        name: String::new(),
        email: String::new(),
        phone: None,
        company: None,
        service: String::new(),
        budget: None,
        message: None,
        timeline: None,
        status: DEFAULT_STATUS.to_string(),
        priority: DEFAULT_PRIORITY.to_string(),
        created_at: created_at.to_string(),
        assigned_to: None,
        notes: None,
        follow_up_date: None,
        estimated_value: None,
        tags: None,
        last_updated: None,
        last_updated_by: None,
    }
}

/// The fixed sample served when the remote service is unreachable or
/// unconfigured. Exactly two records, stable ids.
pub fn fallback_consultations() -> Vec<Consultation> {
    vec![
        Consultation {
            id: "sample-1".to_string(),
            name: "Sarah Johnson".to_string(),
            email: "sarah.johnson@example.com".to_string(),
            phone: Some("+1 555 0101".to_string()),
            company: Some("Northwind Retail".to_string()),
            service: "Cloud Migration".to_string(),
            budget: Some("$25k-50k".to_string()),
            message: Some("We want to move our order pipeline off on-prem servers.".to_string()),
            timeline: Some("3 months".to_string()),
            status: "pending".to_string(),
            priority: "medium".to_string(),
            created_at: "2026-07-28T09:15:00Z".to_string(),
            assigned_to: None,
            notes: None,
            follow_up_date: None,
            estimated_value: None,
            tags: None,
            last_updated: None,
            last_updated_by: None,
        },
        Consultation {
            id: "sample-2".to_string(),
            name: "Michael Chen".to_string(),
            email: "mchen@example.org".to_string(),
            phone: None,
            company: Some("Fathom Analytics".to_string()),
            service: "AI Integration".to_string(),
            budget: Some("$50k+".to_string()),
            message: Some("Looking for help adding model-backed search to our product.".to_string()),
            timeline: Some("6 weeks".to_string()),
            status: "in-progress".to_string(),
            priority: "high".to_string(),
            created_at: "2026-07-21T16:40:00Z".to_string(),
            assigned_to: Some("dana".to_string()),
            notes: Some("Scoping call done, waiting on data access.".to_string()),
            follow_up_date: None,
            estimated_value: Some(62_000.0),
            tags: Some(vec!["ai".to_string(), "priority-client".to_string()]),
            last_updated: Some("2026-07-30T11:05:00Z".to_string()),
            last_updated_by: Some("dana".to_string()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::NewConsultation;

    fn mock_store() -> ConsultationStore {
        ConsultationStore::new(StoreConfig::default())
    }

    fn submission() -> NewConsultation {
        NewConsultation {
            name: Some("Ada".into()),
            email: Some("ada@x.com".into()),
            service: Some("AI".into()),
            ..NewConsultation::default()
        }
    }

    #[tokio::test]
    async fn test_create_unconfigured_falls_back() {
        let outcome = mock_store().create(submission()).await;
        assert!(!outcome.is_persisted());

        let record = outcome.into_value();
        assert!(!record.id.is_empty());
        assert_eq!(record.status, "pending");
        assert_eq!(record.priority, "medium");
        assert!(!record.created_at.is_empty());
    }

    #[tokio::test]
    async fn test_list_unconfigured_serves_sample() {
        let outcome = mock_store().list(ListFilter::default()).await;
        match outcome {
            StoreOutcome::Fallback { value, reason } => {
                assert_eq!(value.len(), 2);
                assert!(reason.contains("not configured"));
            }
            StoreOutcome::Persisted(_) => panic!("unconfigured store cannot persist"),
        }
    }

    #[tokio::test]
    async fn test_update_unconfigured_echoes_patch() {
        let update = ConsultationUpdate {
            status: Some("done".into()),
            ..ConsultationUpdate::default()
        };

        let outcome = mock_store()
            .update("sample-1", &update, "alice")
            .await
            .unwrap();
        let record = outcome.into_value();

        assert_eq!(record.id, "sample-1");
        assert_eq!(record.status, "done");
        // untouched sample fields survive the echo
        assert_eq!(record.name, "Sarah Johnson");
        assert_eq!(record.last_updated_by.as_deref(), Some("alice"));
        assert!(record.last_updated.is_some());
    }

    #[tokio::test]
    async fn test_delete_unconfigured_synthesizes_marker() {
        let outcome = mock_store().delete("sample-2").await.unwrap();
        assert!(!outcome.is_persisted());
        assert_eq!(outcome.into_value().id, "sample-2");
    }

    #[tokio::test]
    async fn test_health_unconfigured_is_warning() {
        assert_eq!(mock_store().health_check().await, HealthStatus::Warning);
    }

    #[test]
    fn test_sample_is_fixed_and_nonempty() {
        let sample = fallback_consultations();
        assert_eq!(sample.len(), 2);
        assert!(sample.iter().all(|c| !c.id.is_empty()));
    }
}
