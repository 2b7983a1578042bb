use crate::error::DomainError;
use crate::interval::{parse_booking_date, TimeSlot};
use crate::reservation::Reservation;
use crate::resource::{Resource, ResourceKey};

/// Outcome of an availability probe. `NotAvailable` is distinct from
/// `Conflict` so callers can explain why a slot was rejected: the resource
/// is closed versus somebody else already holds the time.
#[derive(Debug, Clone)]
pub enum Availability {
    Available,
    NotAvailable { reason: String },
    Conflict { conflicting: Reservation },
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

/// Scan existing reservations for the first one that occupies the candidate
/// key and slot. Only pending/confirmed reservations occupy anything; order
/// is not significant, any single conflict suffices to reject.
pub fn find_conflict<'a>(
    key: &ResourceKey,
    slot: TimeSlot,
    existing: &'a [Reservation],
) -> Result<Option<&'a Reservation>, DomainError> {
    for reservation in existing.iter().filter(|r| r.is_active()) {
        if !key.intersects(&reservation.key()) {
            continue;
        }
        if slot.overlaps(&reservation.slot()?) {
            return Ok(Some(reservation));
        }
    }
    Ok(None)
}

/// Full availability check for one candidate interval.
///
/// Weekly-mask and block-window checks run first and short-circuit with
/// `NotAvailable`; only then does the overlap scan run.
pub fn check_slot(
    resource: &Resource,
    date: &str,
    key: &ResourceKey,
    slot: TimeSlot,
    existing: &[Reservation],
) -> Result<Availability, DomainError> {
    let day = parse_booking_date(date)?;

    if !resource.open_on(day) {
        return Ok(Availability::NotAvailable {
            reason: format!("{} is closed on {}", resource.name, day.format("%A")),
        });
    }
    if resource.blocked_on(day) {
        return Ok(Availability::NotAvailable {
            reason: format!("{} is blocked on {date}", resource.name),
        });
    }

    match find_conflict(key, slot, existing)? {
        Some(hit) => Ok(Availability::Conflict {
            conflicting: hit.clone(),
        }),
        None => Ok(Availability::Available),
    }
}
