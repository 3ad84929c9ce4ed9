pub mod product;
pub mod pricing;
pub mod lifecycle;
pub mod query;

pub use product::{Category, OfferError, OfferTerms, Product};
pub use lifecycle::OfferPhase;
pub use query::ProductQuery;
