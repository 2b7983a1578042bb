pub mod notify;
pub mod payment;
pub mod repository;
pub mod rules;

pub use notify::{LogNotifier, NotificationKind, Notifier};
pub use payment::{CaptureResult, CaptureStatus, MockPaymentGateway, PaymentGateway};
pub use repository::{
    CreateOutcome, GiftCardRepository, RepoError, ReservationRepository, ResourceRepository,
    StaffRepository,
};
pub use rules::EngineRules;
