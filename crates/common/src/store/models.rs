//! Consultation record models
//!
//! Field names follow the wire contract the frontend and the remote table
//! were built against: intake fields are snake_case, the admin-mutable set is
//! camelCase.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Status assigned to newly submitted consultations
pub const DEFAULT_STATUS: &str = "pending";

/// Priority assigned to newly submitted consultations
pub const DEFAULT_PRIORITY: &str = "medium";

/// A stored consultation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultation {
    pub id: String,

    pub name: String,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    pub service: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,

    pub status: String,

    pub priority: String,

    /// RFC 3339 timestamp set at creation
    pub created_at: String,

    #[serde(
        default,
        rename = "assignedTo",
        skip_serializing_if = "Option::is_none"
    )]
    pub assigned_to: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(
        default,
        rename = "followUpDate",
        skip_serializing_if = "Option::is_none"
    )]
    pub follow_up_date: Option<String>,

    #[serde(
        default,
        rename = "estimatedValue",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(
        default,
        rename = "lastUpdated",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<String>,

    #[serde(
        default,
        rename = "lastUpdatedBy",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated_by: Option<String>,
}

/// An incoming consultation submission.
///
/// Required fields are optional here so that a missing one is reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewConsultation {
    pub name: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    pub phone: Option<String>,

    pub company: Option<String>,

    pub service: Option<String>,

    pub budget: Option<String>,

    pub message: Option<String>,

    pub timeline: Option<String>,
}

impl NewConsultation {
    /// Check the required intake fields: name, email, and service must be
    /// present and non-blank.
    pub fn missing_required(&self) -> bool {
        fn blank(field: &Option<String>) -> bool {
            field.as_deref().map_or(true, |v| v.trim().is_empty())
        }
        blank(&self.name) || blank(&self.email) || blank(&self.service)
    }

    /// Stamp the submission into a full record with a fresh id, defaults,
    /// and a creation timestamp.
    pub fn into_record(self, created_at: String) -> Consultation {
        Consultation {
            id: Uuid::new_v4().to_string(),
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone,
            company: self.company,
            service: self.service.unwrap_or_default(),
            budget: self.budget,
            message: self.message,
            timeline: self.timeline,
            status: DEFAULT_STATUS.to_string(),
            priority: DEFAULT_PRIORITY.to_string(),
            created_at,
            assigned_to: None,
            notes: None,
            follow_up_date: None,
            estimated_value: None,
            tags: None,
            last_updated: None,
            last_updated_by: None,
        }
    }
}

/// The allow-listed mutable fields for a consultation update.
///
/// Anything else in the request body is dropped at deserialization; unknown
/// fields are ignored, not errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsultationUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    #[serde(
        default,
        rename = "assignedTo",
        skip_serializing_if = "Option::is_none"
    )]
    pub assigned_to: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(
        default,
        rename = "followUpDate",
        skip_serializing_if = "Option::is_none"
    )]
    pub follow_up_date: Option<String>,

    #[serde(
        default,
        rename = "estimatedValue",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl ConsultationUpdate {
    /// Apply the present fields onto a record
    pub fn apply_to(&self, record: &mut Consultation) {
        if let Some(status) = &self.status {
            record.status = status.clone();
        }
        if let Some(priority) = &self.priority {
            record.priority = priority.clone();
        }
        if let Some(assigned_to) = &self.assigned_to {
            record.assigned_to = Some(assigned_to.clone());
        }
        if let Some(notes) = &self.notes {
            record.notes = Some(notes.clone());
        }
        if let Some(follow_up_date) = &self.follow_up_date {
            record.follow_up_date = Some(follow_up_date.clone());
        }
        if let Some(estimated_value) = self.estimated_value {
            record.estimated_value = Some(estimated_value);
        }
        if let Some(tags) = &self.tags {
            record.tags = Some(tags.clone());
        }
    }
}

/// The reduced projection served to viewer-role sessions: identification and
/// pipeline state only, no contact or financial fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConsultation {
    pub id: String,

    pub name: String,

    pub company: Option<String>,

    pub service: String,

    pub status: String,

    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<&Consultation> for ViewerConsultation {
    fn from(record: &Consultation) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            company: record.company.clone(),
            service: record.service.clone(),
            status: record.status.clone(),
            created_at: record.created_at.clone(),
        }
    }
}

/// Marker returned by a successful delete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedMarker {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> NewConsultation {
        NewConsultation {
            name: Some("Ada".into()),
            email: Some("ada@x.com".into()),
            service: Some("AI".into()),
            ..NewConsultation::default()
        }
    }

    #[test]
    fn test_required_fields() {
        assert!(!submission().missing_required());

        let mut missing_email = submission();
        missing_email.email = None;
        assert!(missing_email.missing_required());

        let mut blank_name = submission();
        blank_name.name = Some("   ".into());
        assert!(blank_name.missing_required());
    }

    #[test]
    fn test_into_record_defaults() {
        let record = submission().into_record("2026-08-07T12:00:00Z".to_string());
        assert!(!record.id.is_empty());
        assert_eq!(record.status, "pending");
        assert_eq!(record.priority, "medium");
        assert_eq!(record.created_at, "2026-08-07T12:00:00Z");
        assert!(record.assigned_to.is_none());
    }

    #[test]
    fn test_update_drops_unknown_fields() {
        let update: ConsultationUpdate =
            serde_json::from_str(r#"{"status": "done", "hacked_field": "x"}"#).unwrap();
        assert_eq!(update.status.as_deref(), Some("done"));

        let patch = serde_json::to_value(&update).unwrap();
        assert!(patch.get("hacked_field").is_none());
        assert_eq!(patch.get("status").unwrap(), "done");
        // absent fields are not serialized, so they cannot null out columns
        assert!(patch.get("priority").is_none());
    }

    #[test]
    fn test_viewer_projection_shape() {
        let record = submission().into_record("2026-08-07T12:00:00Z".to_string());
        let view = ViewerConsultation::from(&record);
        let value = serde_json::to_value(&view).unwrap();

        let mut keys: Vec<&str> =
            value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["company", "createdAt", "id", "name", "service", "status"]
        );
        assert!(value.get("email").is_none());
        assert!(value.get("phone").is_none());
        assert!(value.get("message").is_none());
    }

    #[test]
    fn test_update_apply() {
        let mut record = submission().into_record("2026-08-07T12:00:00Z".to_string());
        let update = ConsultationUpdate {
            status: Some("in-progress".into()),
            assigned_to: Some("alice".into()),
            ..ConsultationUpdate::default()
        };
        update.apply_to(&mut record);
        assert_eq!(record.status, "in-progress");
        assert_eq!(record.assigned_to.as_deref(), Some("alice"));
        // untouched fields keep their values
        assert_eq!(record.priority, "medium");
    }
}
