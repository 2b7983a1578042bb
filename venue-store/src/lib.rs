pub mod app_config;
pub mod catalog_repo;
pub mod database;
pub mod gift_card_repo;
pub mod reservation_repo;
pub mod staff_repo;

pub use app_config::Config;
pub use catalog_repo::PgResourceRepository;
pub use database::DbClient;
pub use gift_card_repo::PgGiftCardRepository;
pub use reservation_repo::PgReservationRepository;
pub use staff_repo::PgStaffRepository;

use sqlx::postgres::PgDatabaseError;

/// Unique-constraint violations are an expected outcome for probe-retried
/// code/PIN assignment and staff PIN inserts, not a failure.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db
            .try_downcast_ref::<PgDatabaseError>()
            .map(|pg| pg.code() == "23505")
            .unwrap_or(false),
        _ => false,
    }
}
