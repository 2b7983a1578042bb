use venue_core::repository::RepoError;
use venue_domain::DomainError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    pub fn storage(err: RepoError) -> Self {
        ServiceError::Storage(err.to_string())
    }
}
