//! Authentication and authorization utilities
//!
//! Provides:
//! - Session token encoding/decoding
//! - Role to permission mapping
//! - Bearer token extraction for handlers
//! - Credential hashing

use crate::errors::{AppError, Result};
use crate::TOKEN_TTL_MS;
use axum::{extract::FromRequestParts, http::request::Parts};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Admin role: full access to consultations, users, analytics, and settings.
const ADMIN_PERMISSIONS: &[&str] = &[
    "view_consultations",
    "edit_consultations",
    "delete_consultations",
    "manage_users",
    "view_analytics",
    "system_settings",
    "export_data",
];

/// Manager role: can work consultations and read analytics, but not delete
/// or administer.
const MANAGER_PERMISSIONS: &[&str] = &[
    "view_consultations",
    "edit_consultations",
    "view_analytics",
    "export_data",
];

/// Viewer role: read-only access to the consultation list.
const VIEWER_PERMISSIONS: &[&str] = &["view_consultations"];

/// The three recognized roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Viewer,
}

impl Role {
    /// Parse a role from its wire name
    pub fn from_name(name: &str) -> Option<Role> {
        match name {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }

    /// The wire name of this role
    pub fn name(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Viewer => "viewer",
        }
    }

    /// The fixed permission set granted to this role
    pub fn permissions(&self) -> &'static [&'static str] {
        match self {
            Role::Admin => ADMIN_PERMISSIONS,
            Role::Manager => MANAGER_PERMISSIONS,
            Role::Viewer => VIEWER_PERMISSIONS,
        }
    }
}

/// Permission set for a role name. Unknown role names get an empty set,
/// so every permission check on them fails closed.
pub fn permissions_for(role: &str) -> &'static [&'static str] {
    Role::from_name(role).map(Role::permissions).unwrap_or(&[])
}

/// Decoded session state available to handlers
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    /// Username embedded in the token
    pub username: String,

    /// Role name embedded in the token. Kept as the raw string: an unknown
    /// role still decodes, it just carries no permissions.
    pub role: String,

    /// Milliseconds since the token was issued, at decode time
    pub token_age_ms: i64,
}

impl SessionInfo {
    /// Permission set for this session's role
    pub fn permissions(&self) -> &'static [&'static str] {
        permissions_for(&self.role)
    }

    /// Check whether the session's role grants a permission
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions().contains(&permission)
    }
}

/// Encode a session token: base64 of `username:role:issued_at_ms`.
///
/// The encoding is reversible and unsigned; anyone who can read a token can
/// forge one. Inputs are not validated: a username containing `:` produces a
/// token that will not decode.
pub fn encode_token(username: &str, role: &str, issued_at_ms: i64) -> String {
    STANDARD.encode(format!("{username}:{role}:{issued_at_ms}"))
}

/// Decode a session token against the given clock reading.
///
/// Returns `None` when the base64 is invalid, the payload is not exactly
/// three `:`-separated parts, the timestamp does not parse, or the token is
/// older than [`TOKEN_TTL_MS`]. Expired is indistinguishable from malformed
/// by design: both are simply not a session.
pub fn decode_token(token: &str, now_ms: i64) -> Option<SessionInfo> {
    let bytes = STANDARD.decode(token).ok()?;
    let raw = String::from_utf8(bytes).ok()?;

    let mut parts = raw.split(':');
    let username = parts.next()?;
    let role = parts.next()?;
    let issued = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let issued_at_ms: i64 = issued.parse().ok()?;
    let token_age_ms = now_ms - issued_at_ms;
    if token_age_ms > TOKEN_TTL_MS {
        return None;
    }

    Some(SessionInfo {
        username: username.to_string(),
        role: role.to_string(),
        token_age_ms,
    })
}

/// Current wall clock in epoch milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Extracted authentication context available to protected handlers
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The decoded session
    pub session: SessionInfo,
}

impl AuthContext {
    /// Check if the session has a specific permission
    pub fn has_permission(&self, permission: &str) -> bool {
        self.session.has_permission(permission)
    }

    /// Require a specific permission, returning error if not present
    pub fn require_permission(&self, permission: &str) -> Result<()> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AppError::InsufficientPermissions {
                permission: permission.to_string(),
            })
        }
    }
}

/// Extract the token from an `Authorization` header value.
///
/// The scheme prefix comparison is case-sensitive on the literal `"Bearer "`,
/// matching the behavior the frontend was built against.
pub fn extract_bearer(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Axum extractor for AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::AuthenticationRequired)?;

        let token = extract_bearer(auth_header).ok_or(AppError::AuthenticationRequired)?;

        let session = decode_token(token, now_ms()).ok_or(AppError::InvalidToken)?;

        Ok(AuthContext { session })
    }
}

/// Hash a password for storage comparison
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Validate a password against a stored hash
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    hash_password(password) == stored_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip() {
        let now = 1_700_000_000_000;
        let token = encode_token("alice", "admin", now - 5_000);

        let session = decode_token(&token, now).unwrap();
        assert_eq!(session.username, "alice");
        assert_eq!(session.role, "admin");
        assert_eq!(session.token_age_ms, 5_000);
        assert_eq!(session.permissions(), ADMIN_PERMISSIONS);
    }

    #[test]
    fn test_expired_token() {
        let now = 1_700_000_000_000;
        let token = encode_token("alice", "admin", now - TOKEN_TTL_MS - 1);
        assert!(decode_token(&token, now).is_none());

        // Exactly at the threshold is still valid
        let token = encode_token("alice", "admin", now - TOKEN_TTL_MS);
        assert!(decode_token(&token, now).is_some());
    }

    #[test]
    fn test_malformed_tokens() {
        let now = 1_700_000_000_000;

        // Not base64
        assert!(decode_token("!!!", now).is_none());

        // Too few parts
        assert!(decode_token(&STANDARD.encode("alice:admin"), now).is_none());

        // Too many parts: a username with a colon breaks decoding
        let token = encode_token("ali:ce", "admin", now);
        assert!(decode_token(&token, now).is_none());

        // Timestamp not an integer
        assert!(decode_token(&STANDARD.encode("alice:admin:soon"), now).is_none());
    }

    #[test]
    fn test_unknown_role_decodes_with_no_permissions() {
        let now = 1_700_000_000_000;
        let token = encode_token("eve", "superuser", now);

        let session = decode_token(&token, now).unwrap();
        assert_eq!(session.role, "superuser");
        assert!(session.permissions().is_empty());
        assert!(!session.has_permission("view_consultations"));
    }

    #[test]
    fn test_permission_table() {
        assert_eq!(permissions_for("viewer"), &["view_consultations"]);
        assert_eq!(permissions_for("unknown"), &[] as &[&str]);

        // Every role's set is a subset of the admin (full) universe
        for role in [Role::Admin, Role::Manager, Role::Viewer] {
            for permission in role.permissions() {
                assert!(ADMIN_PERMISSIONS.contains(permission));
            }
        }

        assert!(!Role::Manager.permissions().contains(&"delete_consultations"));
        assert!(!Role::Viewer.permissions().contains(&"edit_consultations"));
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer("bearer abc"), None);
        assert_eq!(extract_bearer("Basic abc"), None);
        assert_eq!(extract_bearer("abc"), None);
    }

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("hunter2");
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }
}
