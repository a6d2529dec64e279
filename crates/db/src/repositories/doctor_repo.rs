//! Repository for the `doctors` table.

use crate::error::StoreError;
use crate::models::Doctor;
use crate::DbPool;

/// Column list for `doctors` queries.
const COLUMNS: &str = "id, user_id, name, is_active, created_at";

/// Provides read operations on the doctor directory.
pub(crate) struct DoctorRepo;

impl DoctorRepo {
    /// List all active doctors.
    pub async fn list_active(pool: &DbPool) -> Result<Vec<Doctor>, StoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM doctors WHERE is_active = true ORDER BY created_at"
        );
        let doctors = sqlx::query_as::<_, Doctor>(&query).fetch_all(pool).await?;
        Ok(doctors)
    }
}
