pub mod availability;
pub mod error;
pub mod gift_card;
pub mod interval;
pub mod reservation;
pub mod resource;
pub mod staff;

pub use availability::{check_slot, find_conflict, Availability};
pub use error::DomainError;
pub use gift_card::{GiftCard, GiftCardKind, GiftCardStatus, UsageEntry};
pub use interval::TimeSlot;
pub use reservation::{PaymentStatus, Reservation, ReservationStatus};
pub use resource::{Resource, ResourceKey, ResourceKind};
pub use staff::{StaffCredential, StaffIdentity};
