pub mod models;
pub mod pii;

pub use models::reports::{ScanReport, SweepReport};
pub use pii::Masked;
