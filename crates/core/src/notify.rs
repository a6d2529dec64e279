//! Notification recipient and type enums.
//!
//! A notification targets exactly one recipient, which is either a
//! patient or a doctor (mutually exclusive). The recipient pair also
//! names the per-recipient delivery-channel topic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::EntityId;

/// Which table a recipient id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientKind {
    Patient,
    Doctor,
}

impl RecipientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientKind::Patient => "patient",
            RecipientKind::Doctor => "doctor",
        }
    }
}

impl FromStr for RecipientKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patient" => Ok(RecipientKind::Patient),
            "doctor" => Ok(RecipientKind::Doctor),
            other => Err(CoreError::Validation(format!(
                "Invalid recipient kind '{other}'. Must be one of: patient, doctor"
            ))),
        }
    }
}

/// One notification target. Uniquely scopes notification visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipient {
    pub id: EntityId,
    pub kind: RecipientKind,
}

impl Recipient {
    pub fn patient(id: EntityId) -> Self {
        Self {
            id,
            kind: RecipientKind::Patient,
        }
    }

    pub fn doctor(id: EntityId) -> Self {
        Self {
            id,
            kind: RecipientKind::Doctor,
        }
    }

    /// Delivery-channel topic for this recipient, e.g. `doctor:<uuid>`.
    pub fn topic(&self) -> String {
        format!("{}:{}", self.kind.as_str(), self.id)
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

/// Category of a fan-out notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// Critical triage case needing immediate clinician attention.
    UrgentCase,
    /// A doctor added a note to the recipient's triage result.
    DoctorNote,
    /// Triage status changed.
    StatusUpdate,
    /// Follow-up reminder.
    FollowUp,
    /// Anything else.
    General,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::UrgentCase => "urgent_case",
            NotificationType::DoctorNote => "doctor_note",
            NotificationType::StatusUpdate => "status_update",
            NotificationType::FollowUp => "follow_up",
            NotificationType::General => "general",
        }
    }
}

impl FromStr for NotificationType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "urgent_case" => Ok(NotificationType::UrgentCase),
            "doctor_note" => Ok(NotificationType::DoctorNote),
            "status_update" => Ok(NotificationType::StatusUpdate),
            "follow_up" => Ok(NotificationType::FollowUp),
            "general" => Ok(NotificationType::General),
            other => Err(CoreError::Validation(format!(
                "Invalid notification type '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn topic_is_kind_scoped() {
        let id = Uuid::new_v4();
        assert_eq!(Recipient::doctor(id).topic(), format!("doctor:{id}"));
        assert_eq!(Recipient::patient(id).topic(), format!("patient:{id}"));
        assert_ne!(Recipient::doctor(id).topic(), Recipient::patient(id).topic());
    }

    #[test]
    fn notification_type_round_trips() {
        for t in [
            NotificationType::UrgentCase,
            NotificationType::DoctorNote,
            NotificationType::StatusUpdate,
            NotificationType::FollowUp,
            NotificationType::General,
        ] {
            assert_eq!(t.as_str().parse::<NotificationType>().unwrap(), t);
        }
        assert!("shouting".parse::<NotificationType>().is_err());
    }

    #[test]
    fn recipient_equality_includes_kind() {
        let id = Uuid::new_v4();
        assert_ne!(Recipient::patient(id), Recipient::doctor(id));
    }
}
