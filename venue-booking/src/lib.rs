pub mod error;
pub mod gift_cards;
pub mod reservations;
pub mod staff;

pub use error::ServiceError;
pub use gift_cards::LedgerService;
pub use reservations::{BookingService, NewReservationRequest};
pub use staff::StaffService;
