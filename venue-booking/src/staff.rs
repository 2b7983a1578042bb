use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use venue_core::repository::StaffRepository;
use venue_domain::staff::{StaffCredential, StaffIdentity};
use venue_domain::DomainError;

use crate::error::ServiceError;

/// Manages staff PIN credentials and the manual-booking authorization gate.
pub struct StaffService {
    staff: Arc<dyn StaffRepository>,
}

impl StaffService {
    pub fn new(staff: Arc<dyn StaffRepository>) -> Self {
        Self { staff }
    }

    /// Create a credential. PIN uniqueness among active credentials is
    /// enforced here, at creation time.
    pub async fn create(
        &self,
        pin: String,
        display_name: String,
        owner_id: String,
    ) -> Result<StaffCredential, ServiceError> {
        let credential = StaffCredential::new(pin, display_name, owner_id)?;
        if !self
            .staff
            .insert(&credential)
            .await
            .map_err(ServiceError::storage)?
        {
            return Err(
                DomainError::validation("pin is already in use by an active credential").into(),
            );
        }
        Ok(credential)
    }

    /// Verify a PIN against active credentials and stamp `last_used_at`.
    /// No lockout or rate limiting is applied here.
    pub async fn verify(&self, pin: &str) -> Result<StaffIdentity, ServiceError> {
        let credential = self
            .staff
            .find_active_by_pin(pin)
            .await
            .map_err(ServiceError::storage)?
            .ok_or(ServiceError::Domain(DomainError::InvalidPin))?;
        self.staff
            .touch_last_used(credential.id, Utc::now())
            .await
            .map_err(ServiceError::storage)?;
        Ok(credential.identity())
    }

    /// Soft delete: deactivated credentials stay on record so past manual
    /// bookings remain attributable.
    pub async fn deactivate(&self, id: Uuid) -> Result<(), ServiceError> {
        self.set_active(id, false).await
    }

    pub async fn reactivate(&self, id: Uuid) -> Result<(), ServiceError> {
        self.set_active(id, true).await
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), ServiceError> {
        if !self
            .staff
            .set_active(id, active)
            .await
            .map_err(ServiceError::storage)?
        {
            return Err(DomainError::NotFound.into());
        }
        Ok(())
    }

    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<StaffCredential>, ServiceError> {
        self.staff
            .list_for_owner(owner_id)
            .await
            .map_err(ServiceError::storage)
    }
}
