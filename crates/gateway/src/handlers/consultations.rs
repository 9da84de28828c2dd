//! Consultation handlers
//!
//! Submission is public; list/update/delete require a session whose role
//! carries the matching permission. Store failures never surface here: the
//! gateway hands back fallback data and the response stays a success.

use axum::extract::{rejection::JsonRejection, Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use consultdesk_common::{
    auth::{AuthContext, Role},
    errors::{AppError, Result},
    metrics,
    store::{Consultation, ConsultationUpdate, DeletedMarker, ListFilter, NewConsultation,
            ViewerConsultation},
};

#[derive(Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub consultation: Consultation,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub consultations: serde_json::Value,
    pub count: usize,
}

#[derive(Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub consultation: Consultation,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted: DeletedMarker,
}

/// Submit a consultation request (public)
pub async fn submit(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewConsultation>, JsonRejection>,
) -> Result<Json<SubmitResponse>> {
    let Json(request) = payload.map_err(|e| AppError::InvalidPayload {
        message: e.body_text(),
    })?;

    if request.missing_required() {
        return Err(AppError::Validation {
            message: "Name, email, and service are required".to_string(),
        });
    }

    request.validate().map_err(|_| AppError::Validation {
        message: "Invalid email address".to_string(),
    })?;

    let outcome = state.store.create(request).await;
    metrics::record_submission(outcome.is_persisted());

    let consultation = outcome.into_value();

    tracing::info!(
        id = %consultation.id,
        service = %consultation.service,
        "Consultation submitted"
    );

    // Notify out of band so relay latency never delays the submission
    let notifier = state.notifier.clone();
    let record = consultation.clone();
    tokio::spawn(async move {
        notifier.notify_submission(&record).await;
    });

    Ok(Json(SubmitResponse {
        success: true,
        consultation,
    }))
}

/// List consultations, shaped per the session's role
pub async fn list(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>> {
    auth.require_permission("view_consultations")?;

    let filter = ListFilter {
        status: query.status,
        limit: query.limit,
    };

    let records = state.store.list(filter).await.into_value();

    let consultations = shape_for_role(&records, &auth.session.role)?;
    let count = consultations.as_array().map_or(0, |a| a.len());

    Ok(Json(ListResponse {
        success: true,
        consultations,
        count,
    }))
}

/// Project the record list for a role.
///
/// Managers currently see everything an admin sees; the arm exists as the
/// redaction hook. Roles outside the table see nothing.
fn shape_for_role(records: &[Consultation], role: &str) -> Result<serde_json::Value> {
    let shaped = match Role::from_name(role) {
        Some(Role::Admin) => serde_json::to_value(records)?,
        Some(Role::Manager) => serde_json::to_value(records)?,
        Some(Role::Viewer) => {
            let views: Vec<ViewerConsultation> =
                records.iter().map(ViewerConsultation::from).collect();
            serde_json::to_value(views)?
        }
        None => serde_json::Value::Array(Vec::new()),
    };
    Ok(shaped)
}

/// Update a consultation through the allow-listed field set
pub async fn update(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    payload: std::result::Result<Json<ConsultationUpdate>, JsonRejection>,
) -> Result<Json<UpdateResponse>> {
    auth.require_permission("edit_consultations")?;

    let Json(request) = payload.map_err(|e| AppError::InvalidPayload {
        message: e.body_text(),
    })?;

    let outcome = state
        .store
        .update(&id, &request, &auth.session.username)
        .await?;

    let consultation = outcome.into_value();

    tracing::info!(
        id = %consultation.id,
        updated_by = %auth.session.username,
        "Consultation updated"
    );

    Ok(Json(UpdateResponse {
        success: true,
        consultation,
    }))
}

/// Delete a consultation
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    auth.require_permission("delete_consultations")?;

    let deleted = state.store.delete(&id).await?.into_value();

    tracing::info!(id = %deleted.id, deleted_by = %auth.session.username, "Consultation deleted");

    Ok(Json(DeleteResponse {
        success: true,
        deleted,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use consultdesk_common::store::fallback_consultations;

    #[test]
    fn test_shape_for_role() {
        let records = fallback_consultations();

        let admin = shape_for_role(&records, "admin").unwrap();
        assert_eq!(admin.as_array().unwrap().len(), 2);
        assert!(admin[0].get("email").is_some());

        // manager currently sees the same records as admin
        let manager = shape_for_role(&records, "manager").unwrap();
        assert_eq!(manager, admin);

        let viewer = shape_for_role(&records, "viewer").unwrap();
        assert!(viewer[0].get("email").is_none());
        assert!(viewer[0].get("createdAt").is_some());

        let unknown = shape_for_role(&records, "superuser").unwrap();
        assert_eq!(unknown, serde_json::json!([]));
    }
}
