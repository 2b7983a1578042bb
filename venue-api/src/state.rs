use std::sync::Arc;

use venue_booking::{BookingService, LedgerService, StaffService};

#[derive(Clone)]
pub struct AppState {
    pub booking: Arc<BookingService>,
    pub ledger: Arc<LedgerService>,
    pub staff: Arc<StaffService>,
}
