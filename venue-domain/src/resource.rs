use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Room,
    Booth,
    ChairSet,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Room => "room",
            ResourceKind::Booth => "booth",
            ResourceKind::ChairSet => "chair_set",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "room" => Ok(ResourceKind::Room),
            "booth" => Ok(ResourceKind::Booth),
            "chair_set" => Ok(ResourceKind::ChairSet),
            other => Err(DomainError::validation(format!(
                "unknown resource kind: {other:?}"
            ))),
        }
    }
}

/// Reference data for one bookable resource. The core only reads pricing,
/// the weekly availability mask, and the block window; catalog content
/// (descriptions, images) lives outside this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: Uuid,
    pub kind: ResourceKind,
    pub name: String,
    /// Fixed identity tag carried by gaming booths.
    pub tag: Option<String>,
    /// Price in cents per hour; per chair per hour for chair sets.
    pub price_per_hour: i64,
    /// Monday-first open/closed mask.
    pub weekly_availability: [bool; 7],
    pub blocked_from: Option<NaiveDate>,
    pub blocked_to: Option<NaiveDate>,
    /// Addressable seating units of a chair set; empty for rooms and booths.
    pub chair_ids: Vec<String>,
}

impl Resource {
    pub fn open_on(&self, date: NaiveDate) -> bool {
        self.weekly_availability[date.weekday().num_days_from_monday() as usize]
    }

    /// Inclusive block window; open-ended on either side when one bound is
    /// missing.
    pub fn blocked_on(&self, date: NaiveDate) -> bool {
        match (self.blocked_from, self.blocked_to) {
            (None, None) => false,
            (Some(from), None) => date >= from,
            (None, Some(to)) => date <= to,
            (Some(from), Some(to)) => date >= from && date <= to,
        }
    }

    pub fn quote(&self, duration_hours: u32, chair_count: usize) -> i64 {
        let units = match self.kind {
            ResourceKind::ChairSet => chair_count as i64,
            _ => 1,
        };
        self.price_per_hour * units * duration_hours as i64
    }
}

/// The generic occupancy key shared by all three resource kinds.
///
/// Rooms and booths occupy their whole unit, so two keys collide on id
/// equality alone. Café bookings address individual chairs: the keys
/// collide only when the chair-id sets also intersect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceKey {
    pub resource_id: Uuid,
    pub chairs: Vec<String>,
}

impl ResourceKey {
    pub fn unit(resource_id: Uuid) -> Self {
        Self {
            resource_id,
            chairs: Vec::new(),
        }
    }

    pub fn chairs(resource_id: Uuid, chairs: Vec<String>) -> Self {
        Self { resource_id, chairs }
    }

    pub fn intersects(&self, other: &ResourceKey) -> bool {
        if self.resource_id != other.resource_id {
            return false;
        }
        if self.chairs.is_empty() || other.chairs.is_empty() {
            return true;
        }
        self.chairs.iter().any(|c| other.chairs.contains(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> Resource {
        Resource {
            id: Uuid::new_v4(),
            kind: ResourceKind::Room,
            name: "Neon Vault".to_string(),
            tag: None,
            price_per_hour: 6000,
            weekly_availability: [true, true, true, true, true, false, false],
            blocked_from: None,
            blocked_to: None,
            chair_ids: Vec::new(),
        }
    }

    #[test]
    fn weekly_mask_is_monday_first() {
        let r = room();
        let friday = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2025, 8, 2).unwrap();
        assert!(r.open_on(friday));
        assert!(!r.open_on(saturday));
    }

    #[test]
    fn block_window_is_inclusive() {
        let mut r = room();
        r.blocked_from = NaiveDate::from_ymd_opt(2025, 8, 10);
        r.blocked_to = NaiveDate::from_ymd_opt(2025, 8, 12);
        assert!(!r.blocked_on(NaiveDate::from_ymd_opt(2025, 8, 9).unwrap()));
        assert!(r.blocked_on(NaiveDate::from_ymd_opt(2025, 8, 10).unwrap()));
        assert!(r.blocked_on(NaiveDate::from_ymd_opt(2025, 8, 12).unwrap()));
        assert!(!r.blocked_on(NaiveDate::from_ymd_opt(2025, 8, 13).unwrap()));
    }

    #[test]
    fn chair_set_quote_multiplies_by_chair_count() {
        let mut r = room();
        r.kind = ResourceKind::ChairSet;
        r.price_per_hour = 500;
        assert_eq!(r.quote(2, 3), 3000);
    }

    #[test]
    fn unit_keys_collide_on_id_equality() {
        let id = Uuid::new_v4();
        assert!(ResourceKey::unit(id).intersects(&ResourceKey::unit(id)));
        assert!(!ResourceKey::unit(id).intersects(&ResourceKey::unit(Uuid::new_v4())));
    }

    #[test]
    fn chair_keys_require_set_intersection() {
        let id = Uuid::new_v4();
        let a = ResourceKey::chairs(id, vec!["c1".into(), "c2".into()]);
        let b = ResourceKey::chairs(id, vec!["c2".into(), "c3".into()]);
        let c = ResourceKey::chairs(id, vec!["c4".into()]);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
