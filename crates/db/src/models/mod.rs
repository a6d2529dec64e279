//! Domain entity models.

pub mod doctor;
pub mod doctor_note;
pub mod notification;
pub mod triage_record;

pub use doctor::Doctor;
pub use doctor_note::{DoctorNote, NewDoctorNote};
pub use notification::{NewNotification, Notification};
pub use triage_record::{NewTriageRecord, TriageRecord};
