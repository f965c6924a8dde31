//! Identity — the opaque user reference the social graph hangs off.
//!
//! Credentials and registration belong to the auth collaborator; the core
//! only needs a resolvable handle and a display name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
  pub user_id:      Uuid,
  /// Unique within the platform; matched case-insensitively.
  pub handle:       String,
  pub display_name: String,
  pub created_at:   DateTime<Utc>,
}

/// Input for creating an identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIdentity {
  pub handle:       String,
  pub display_name: String,
}

/// Canonical form of a handle for comparison.
///
/// Handles are single whitespace-delimited tokens; surrounding whitespace
/// is not significant and case never distinguishes two handles.
pub fn normalize_handle(raw: &str) -> String { raw.trim().to_lowercase() }
