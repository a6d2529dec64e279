//! Doctor directory entry.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use aegle_core::types::{EntityId, Timestamp};

/// A registered clinician, as seen by the Red-urgency fan-out path.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Doctor {
    pub id: EntityId,
    pub user_id: EntityId,
    pub name: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}
