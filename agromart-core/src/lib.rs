pub mod repository;
pub mod messaging;
pub mod phone;
pub mod recipient;

pub use messaging::{MessagingGateway, SendOutcome};
pub use phone::{PhoneError, PhoneNumber, DEFAULT_COUNTRY_CODE};
pub use recipient::Recipient;
pub use repository::{CatalogRepository, JobLock, RepoError, RepoResult, UserDirectory};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Invalid phone number: {0}")]
    PhoneError(#[from] PhoneError),
}

pub type CoreResult<T> = Result<T, CoreError>;
