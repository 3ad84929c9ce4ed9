pub mod models;
pub mod message;
pub mod pacing;
pub mod guard;
pub mod expiry;

pub use models::{JobKind, MonitorConfig};
pub use pacing::PacedSender;
pub use guard::SingleFlight;
pub use expiry::{MonitorError, OfferMonitor};
