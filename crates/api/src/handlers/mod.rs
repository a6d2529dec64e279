pub mod notification;
pub mod triage;
