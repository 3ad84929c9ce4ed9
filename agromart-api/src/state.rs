use std::sync::Arc;
use agromart_store::DbClient;

use crate::scheduler::JobRunner;

#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<JobRunner>,
    /// `None` when running against the in-memory store.
    pub db: Option<Arc<DbClient>>,
}
