use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// A short numeric credential authorizing an operator to create a
/// reservation on a customer's behalf. Deactivation is soft so history
/// stays attributable to the staff member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffCredential {
    pub id: Uuid,
    pub pin: String,
    pub display_name: String,
    /// The admin account that created this credential.
    pub owner_id: String,
    pub is_active: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// What a successful PIN verification yields: enough to stamp a manual
/// booking with the acting staff member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffIdentity {
    pub id: Uuid,
    pub name: String,
    pub pin: String,
}

impl StaffCredential {
    pub fn new(
        pin: String,
        display_name: String,
        owner_id: String,
    ) -> Result<Self, DomainError> {
        validate_staff_pin(&pin)?;
        if display_name.trim().is_empty() {
            return Err(DomainError::validation("staff display name is required"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            pin,
            display_name,
            owner_id,
            is_active: true,
            last_used_at: None,
            created_at: Utc::now(),
        })
    }

    pub fn identity(&self) -> StaffIdentity {
        StaffIdentity {
            id: self.id,
            name: self.display_name.clone(),
            pin: self.pin.clone(),
        }
    }
}

pub fn validate_staff_pin(pin: &str) -> Result<(), DomainError> {
    if pin.len() != 4 || !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::validation("staff pin must be exactly 4 digits"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_four_digit_pins_only() {
        assert!(validate_staff_pin("4321").is_ok());
        assert!(validate_staff_pin("0000").is_ok());
        for pin in ["432", "43210", "43a1", "", "4 21"] {
            assert!(validate_staff_pin(pin).is_err(), "accepted {pin:?}");
        }
    }

    #[test]
    fn new_credential_starts_active_and_unused() {
        let cred =
            StaffCredential::new("4321".into(), "Morgan".into(), "owner-1".into()).unwrap();
        assert!(cred.is_active);
        assert!(cred.last_used_at.is_none());
        assert_eq!(cred.identity().name, "Morgan");
    }

    #[test]
    fn rejects_blank_display_name() {
        assert!(StaffCredential::new("4321".into(), "  ".into(), "owner-1".into()).is_err());
    }
}
