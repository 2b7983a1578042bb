use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use venue_core::notify::{dispatch, NotificationKind, Notifier};
use venue_core::payment::{CaptureStatus, PaymentGateway};
use venue_core::repository::{
    CreateOutcome, ReservationRepository, ResourceRepository, StaffRepository,
};
use venue_core::rules::EngineRules;
use venue_domain::availability::{check_slot, Availability};
use venue_domain::interval::{parse_booking_date, TimeSlot};
use venue_domain::reservation::{
    map_provider_status, payment_side_effect, PaymentStatus, Reservation, ReservationStatus,
};
use venue_domain::resource::{Resource, ResourceKey, ResourceKind};
use venue_domain::DomainError;

use crate::error::ServiceError;

/// Incoming booking request, self-service or staff-assisted.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReservationRequest {
    pub resource_id: Uuid,
    #[serde(default)]
    pub chair_ids: Vec<String>,
    pub date: String,
    pub start_time: String,
    pub duration_hours: u32,
    pub party_size: u32,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub payment_reference: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    /// Present for staff-assisted bookings; verified before anything else
    /// touches the store.
    #[serde(default)]
    pub staff_pin: Option<String>,
}

/// Drives reservations through availability checks and the status/payment
/// lifecycle.
pub struct BookingService {
    reservations: Arc<dyn ReservationRepository>,
    catalog: Arc<dyn ResourceRepository>,
    staff: Arc<dyn StaffRepository>,
    notifier: Arc<dyn Notifier>,
    payments: Arc<dyn PaymentGateway>,
    rules: EngineRules,
}

impl BookingService {
    pub fn new(
        reservations: Arc<dyn ReservationRepository>,
        catalog: Arc<dyn ResourceRepository>,
        staff: Arc<dyn StaffRepository>,
        notifier: Arc<dyn Notifier>,
        payments: Arc<dyn PaymentGateway>,
        rules: EngineRules,
    ) -> Self {
        Self {
            reservations,
            catalog,
            staff,
            notifier,
            payments,
            rules,
        }
    }

    async fn resource(&self, id: Uuid) -> Result<Resource, ServiceError> {
        self.catalog
            .get(id)
            .await
            .map_err(ServiceError::storage)?
            .ok_or(ServiceError::Domain(DomainError::NotFound))
    }

    /// Advisory availability probe. The authoritative scan re-runs atomically
    /// inside the store on create, so this result can go stale under
    /// concurrent callers; it is for slot pickers, not for enforcement.
    pub async fn check_availability(
        &self,
        resource_id: Uuid,
        chair_ids: Vec<String>,
        date: &str,
        start_time: &str,
        duration_hours: u32,
    ) -> Result<Availability, ServiceError> {
        let resource = self.resource(resource_id).await?;
        let slot = TimeSlot::from_label(start_time, duration_hours)?;
        let key = ResourceKey {
            resource_id,
            chairs: chair_ids,
        };
        let existing = self
            .reservations
            .list_active_for_resource(resource_id, date)
            .await
            .map_err(ServiceError::storage)?;
        Ok(check_slot(&resource, date, &key, slot, &existing)?)
    }

    /// Self-service create with an up-front capture. The amount is quoted
    /// server-side; when the booking then fails for any reason, the
    /// captured payment is refunded before the error surfaces so the
    /// customer is never charged for a reservation that does not exist.
    pub async fn create_with_payment(
        &self,
        mut req: NewReservationRequest,
        payment_token: Option<String>,
    ) -> Result<Reservation, ServiceError> {
        let Some(token) = payment_token else {
            return self.create(req).await;
        };

        // Nothing is charged for a request that cannot possibly book.
        TimeSlot::from_label(&req.start_time, req.duration_hours)?;
        let resource = self.resource(req.resource_id).await?;
        let amount = resource.quote(req.duration_hours, req.chair_ids.len());

        let capture = self
            .payments
            .capture(amount, &token)
            .await
            .map_err(ServiceError::storage)?;
        let captured = capture.status == CaptureStatus::Succeeded;
        let reference = capture.reference.clone();
        req.payment_reference = Some(capture.reference);
        req.payment_status = Some(match capture.status {
            CaptureStatus::Succeeded => PaymentStatus::Completed,
            CaptureStatus::Failed => PaymentStatus::Failed,
        });

        match self.create(req).await {
            Ok(created) => Ok(created),
            Err(err) => {
                if captured {
                    if let Err(refund_err) = self.payments.refund(&reference).await {
                        tracing::error!(
                            %reference,
                            error = %refund_err,
                            "refund after failed booking did not go through"
                        );
                    }
                }
                Err(err)
            }
        }
    }

    pub async fn create(&self, req: NewReservationRequest) -> Result<Reservation, ServiceError> {
        if req.customer_name.trim().is_empty() {
            return Err(DomainError::validation("customer name is required").into());
        }
        if req.customer_email.trim().is_empty() {
            return Err(DomainError::validation("customer email is required").into());
        }
        if req.party_size == 0 {
            return Err(DomainError::validation("party size must be at least 1").into());
        }
        let day = parse_booking_date(&req.date)?;
        TimeSlot::from_label(&req.start_time, req.duration_hours)?;

        let resource = self.resource(req.resource_id).await?;
        match resource.kind {
            ResourceKind::ChairSet => {
                if req.chair_ids.is_empty() {
                    return Err(
                        DomainError::validation("chair selection is required for café seating")
                            .into(),
                    );
                }
                if let Some(unknown) = req
                    .chair_ids
                    .iter()
                    .find(|c| !resource.chair_ids.contains(c))
                {
                    return Err(DomainError::validation(format!(
                        "unknown chair id: {unknown:?}"
                    ))
                    .into());
                }
            }
            _ => {
                if !req.chair_ids.is_empty() {
                    return Err(DomainError::validation(
                        "chair selection only applies to café seating",
                    )
                    .into());
                }
            }
        }

        if !resource.open_on(day) {
            return Err(DomainError::NotAvailable(format!(
                "{} is closed on {}",
                resource.name,
                day.format("%A")
            ))
            .into());
        }
        if resource.blocked_on(day) {
            return Err(DomainError::NotAvailable(format!(
                "{} is blocked on {}",
                resource.name, req.date
            ))
            .into());
        }

        // Staff gate runs before anything is written.
        let staff_identity = match &req.staff_pin {
            Some(pin) => {
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
                Some(credential.identity())
            }
            None => None,
        };

        let total_price = resource.quote(req.duration_hours, req.chair_ids.len());
        let payment_status = req.payment_status.unwrap_or(PaymentStatus::Pending);
        let status = Reservation::initial_status(total_price, payment_status);
        let now = Utc::now();

        let reservation = Reservation {
            id: Uuid::new_v4(),
            resource_id: req.resource_id,
            chair_ids: req.chair_ids,
            date: req.date,
            start_time: req.start_time,
            duration_hours: req.duration_hours,
            party_size: req.party_size,
            customer_name: req.customer_name,
            customer_email: req.customer_email,
            total_price,
            status,
            payment_status,
            payment_reference: req.payment_reference,
            staff_name: staff_identity.as_ref().map(|s| s.name.clone()),
            staff_pin: staff_identity.as_ref().map(|s| s.pin.clone()),
            is_manual_booking: staff_identity.is_some(),
            comments: req.comments,
            created_at: now,
            updated_at: now,
        };
        match self
            .reservations
            .create_if_free(&reservation)
            .await
            .map_err(ServiceError::storage)?
        {
            CreateOutcome::Created(created) => {
                tracing::info!(
                    reservation_id = %created.id,
                    resource_id = %created.resource_id,
                    status = %created.status,
                    manual = created.is_manual_booking,
                    "reservation created"
                );
                self.notify(NotificationKind::ReservationCreated, &created);
                Ok(created)
            }
            CreateOutcome::Conflict(conflicting) => Err(DomainError::Conflict {
                conflicting_id: conflicting.id,
            }
            .into()),
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Reservation, ServiceError> {
        self.reservations
            .get(id)
            .await
            .map_err(ServiceError::storage)?
            .ok_or(ServiceError::Domain(DomainError::NotFound))
    }

    pub async fn list_for_date(&self, date: &str) -> Result<Vec<Reservation>, ServiceError> {
        parse_booking_date(date)?;
        self.reservations
            .list_for_date(date)
            .await
            .map_err(ServiceError::storage)
    }

    pub async fn list_for_customer(&self, email: &str) -> Result<Vec<Reservation>, ServiceError> {
        self.reservations
            .list_for_customer(email)
            .await
            .map_err(ServiceError::storage)
    }

    /// Admin status change, with the payment side effect from the
    /// transition table applied in the same write.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> Result<Reservation, ServiceError> {
        let payment = payment_side_effect(status);
        let updated = self
            .reservations
            .update_status(id, status, payment)
            .await
            .map_err(ServiceError::storage)?
            .ok_or(ServiceError::Domain(DomainError::NotFound))?;
        tracing::info!(reservation_id = %id, status = %status, "reservation status updated");
        match status {
            ReservationStatus::Confirmed => {
                self.notify(NotificationKind::ReservationConfirmed, &updated)
            }
            ReservationStatus::Cancelled => {
                self.notify(NotificationKind::ReservationCancelled, &updated)
            }
            _ => {}
        }
        Ok(updated)
    }

    /// Payment-status-only change; never touches the lifecycle status.
    pub async fn update_payment_status(
        &self,
        id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<Reservation, ServiceError> {
        self.reservations
            .update_payment_status(id, payment_status)
            .await
            .map_err(ServiceError::storage)?
            .ok_or(ServiceError::Domain(DomainError::NotFound))
    }

    /// Self-service cancel. The requester must prove ownership; an email
    /// mismatch reads as not-found to avoid confirming foreign bookings.
    pub async fn cancel(
        &self,
        id: Uuid,
        requester_email: &str,
    ) -> Result<Reservation, ServiceError> {
        let current = self.get(id).await?;
        if !current
            .customer_email
            .eq_ignore_ascii_case(requester_email)
        {
            return Err(DomainError::NotFound.into());
        }
        if !current.is_active() {
            return Err(DomainError::InvalidTransition {
                from: current.status.to_string(),
                to: ReservationStatus::Cancelled.to_string(),
            }
            .into());
        }
        let updated = self
            .reservations
            .update_status(id, ReservationStatus::Cancelled, None)
            .await
            .map_err(ServiceError::storage)?
            .ok_or(ServiceError::Domain(DomainError::NotFound))?;
        self.notify(NotificationKind::ReservationCancelled, &updated);
        Ok(updated)
    }

    /// Explicit admin delete; normal flow never removes reservations.
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let removed = self
            .reservations
            .delete(id)
            .await
            .map_err(ServiceError::storage)?;
        if !removed {
            return Err(DomainError::NotFound.into());
        }
        Ok(())
    }

    /// Apply a payment-provider webhook to every reservation sharing the
    /// payment reference. Unrecognized provider statuses are a no-op, and
    /// replays change nothing, so notifications cannot fire twice.
    pub async fn apply_payment_webhook(
        &self,
        payment_reference: &str,
        provider_status: &str,
    ) -> Result<usize, ServiceError> {
        let Some((status, payment_status)) = map_provider_status(provider_status) else {
            tracing::debug!(provider_status, "unmapped provider status, leaving pending");
            return Ok(0);
        };
        let changed = self
            .reservations
            .apply_payment_reference(payment_reference, status, payment_status)
            .await
            .map_err(ServiceError::storage)?;
        for reservation in &changed {
            let kind = match status {
                ReservationStatus::Confirmed => NotificationKind::ReservationConfirmed,
                _ => NotificationKind::ReservationCancelled,
            };
            self.notify(kind, reservation);
        }
        tracing::info!(
            payment_reference,
            provider_status,
            updated = changed.len(),
            "payment webhook applied"
        );
        Ok(changed.len())
    }

    fn notify(&self, kind: NotificationKind, reservation: &Reservation) {
        let payload = json!({
            "reservation_id": reservation.id,
            "resource_id": reservation.resource_id,
            "date": reservation.date,
            "start_time": reservation.start_time,
            "status": reservation.status,
            "customer_email": reservation.customer_email,
        });
        dispatch(
            self.notifier.clone(),
            kind,
            payload,
            self.rules.notification_timeout_ms,
        );
    }
}
