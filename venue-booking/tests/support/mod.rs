//! In-memory repository implementations backing the service-level tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use venue_core::repository::{
    CreateOutcome, GiftCardRepository, RepoError, ReservationRepository, ResourceRepository,
    StaffRepository,
};
use venue_domain::availability::find_conflict;
use venue_domain::gift_card::{GiftCard, GiftCardStatus, UsageEntry};
use venue_domain::reservation::{PaymentStatus, Reservation, ReservationStatus};
use venue_domain::resource::Resource;
use venue_domain::staff::StaffCredential;

#[derive(Default)]
pub struct InMemoryReservations {
    rows: Mutex<Vec<Reservation>>,
}

#[async_trait]
impl ReservationRepository for InMemoryReservations {
    async fn create_if_free(&self, reservation: &Reservation) -> Result<CreateOutcome, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let existing: Vec<Reservation> = rows
            .iter()
            .filter(|r| r.resource_id == reservation.resource_id && r.date == reservation.date)
            .cloned()
            .collect();
        if let Some(hit) = find_conflict(&reservation.key(), reservation.slot()?, &existing)? {
            return Ok(CreateOutcome::Conflict(hit.clone()));
        }
        rows.push(reservation.clone());
        Ok(CreateOutcome::Created(reservation.clone()))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Reservation>, RepoError> {
        Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn list_active_for_resource(
        &self,
        resource_id: Uuid,
        date: &str,
    ) -> Result<Vec<Reservation>, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.resource_id == resource_id && r.date == date && r.is_active())
            .cloned()
            .collect())
    }

    async fn list_for_date(&self, date: &str) -> Result<Vec<Reservation>, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.date == date)
            .cloned()
            .collect())
    }

    async fn list_for_customer(&self, email: &str) -> Result<Vec<Reservation>, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.customer_email.eq_ignore_ascii_case(email))
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Option<Reservation>, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        row.status = status;
        if let Some(payment) = payment_status {
            row.payment_status = payment;
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<Option<Reservation>, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        row.payment_status = payment_status;
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn apply_payment_reference(
        &self,
        payment_reference: &str,
        status: ReservationStatus,
        payment_status: PaymentStatus,
    ) -> Result<Vec<Reservation>, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let mut changed = Vec::new();
        for row in rows.iter_mut() {
            if row.payment_reference.as_deref() != Some(payment_reference) {
                continue;
            }
            if row.status == status && row.payment_status == payment_status {
                continue;
            }
            row.status = status;
            row.payment_status = payment_status;
            row.updated_at = Utc::now();
            changed.push(row.clone());
        }
        Ok(changed)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryGiftCards {
    rows: Mutex<HashMap<Uuid, GiftCard>>,
    counter: AtomicU64,
}

#[async_trait]
impl GiftCardRepository for InMemoryGiftCards {
    async fn insert(&self, card: &GiftCard) -> Result<(), RepoError> {
        self.rows.lock().unwrap().insert(card.id, card.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<GiftCard>, RepoError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<GiftCard>, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|c| c.code.as_deref() == Some(code))
            .cloned())
    }

    async fn list_for_owner(&self, owner: &str) -> Result<Vec<GiftCard>, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.owner.as_deref() == Some(owner))
            .cloned()
            .collect())
    }

    async fn next_code_number(&self) -> Result<u64, RepoError> {
        Ok(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn pin_exists(&self, pin: &str) -> Result<bool, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .any(|c| c.pin.as_deref() == Some(pin)))
    }

    async fn assign_code(
        &self,
        id: Uuid,
        code: &str,
        pin: &str,
        buyer: &str,
        purchased_at: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let taken = rows
            .values()
            .any(|c| c.code.as_deref() == Some(code) || c.pin.as_deref() == Some(pin));
        if taken {
            return Ok(false);
        }
        let Some(card) = rows.get_mut(&id) else {
            return Ok(false);
        };
        if card.is_purchased() {
            return Ok(false);
        }
        card.code = Some(code.to_string());
        card.pin = Some(pin.to_string());
        card.purchased_by = Some(buyer.to_string());
        card.purchased_at = Some(purchased_at);
        Ok(true)
    }

    async fn update_balance(
        &self,
        id: Uuid,
        expected_balance: i64,
        expected_status: GiftCardStatus,
        new_balance: i64,
        new_status: GiftCardStatus,
        entry: &UsageEntry,
    ) -> Result<bool, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(card) = rows.get_mut(&id) else {
            return Ok(false);
        };
        if card.balance != expected_balance || card.status != expected_status {
            return Ok(false);
        }
        card.balance = new_balance;
        card.status = new_status;
        card.history.push(entry.clone());
        Ok(true)
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: GiftCardStatus,
        to: GiftCardStatus,
    ) -> Result<bool, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(card) = rows.get_mut(&id) else {
            return Ok(false);
        };
        if card.status != from {
            return Ok(false);
        }
        card.status = to;
        Ok(true)
    }
}

#[derive(Default)]
pub struct InMemoryStaff {
    rows: Mutex<Vec<StaffCredential>>,
}

#[async_trait]
impl StaffRepository for InMemoryStaff {
    async fn insert(&self, credential: &StaffCredential) -> Result<bool, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|c| c.is_active && c.pin == credential.pin) {
            return Ok(false);
        }
        rows.push(credential.clone());
        Ok(true)
    }

    async fn find_active_by_pin(&self, pin: &str) -> Result<Option<StaffCredential>, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.is_active && c.pin == pin)
            .cloned())
    }

    async fn touch_last_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        if let Some(row) = self.rows.lock().unwrap().iter_mut().find(|c| c.id == id) {
            row.last_used_at = Some(at);
        }
        Ok(())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|c| c.id == id) {
            Some(row) => {
                row.is_active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<StaffCredential>, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect())
    }
}

pub struct InMemoryCatalog {
    rows: Mutex<HashMap<Uuid, Resource>>,
}

impl InMemoryCatalog {
    pub fn with(resources: Vec<Resource>) -> Self {
        Self {
            rows: Mutex::new(resources.into_iter().map(|r| (r.id, r)).collect()),
        }
    }
}

#[async_trait]
impl ResourceRepository for InMemoryCatalog {
    async fn get(&self, id: Uuid) -> Result<Option<Resource>, RepoError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Resource>, RepoError> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }
}
