//! sqlx repositories, one per table.
//!
//! Repositories are stateless: each method takes the pool explicitly.
//! Row structs stay private here; callers only see the domain models.

pub(crate) mod doctor_repo;
pub(crate) mod note_repo;
pub(crate) mod notification_repo;
pub(crate) mod triage_repo;
