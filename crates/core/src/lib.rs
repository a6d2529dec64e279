//! Domain types shared across the Aegle triage backend.
//!
//! This crate is I/O-free: it defines the entities of the triage record
//! lifecycle (records, doctor notes, notifications), the enums that
//! classify them, and the validation helpers the DB and API layers use.

pub mod error;
pub mod notify;
pub mod triage;
pub mod types;

pub use error::CoreError;
