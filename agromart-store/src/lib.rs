pub mod app_config;
pub mod database;
pub mod catalog_repo;
pub mod user_repo;
pub mod memory;
pub mod redis_repo;
pub mod sms;

pub use database::DbClient;
pub use catalog_repo::PgCatalogRepository;
pub use user_repo::PgUserDirectory;
pub use memory::{InMemoryCatalog, InMemoryUserDirectory};
pub use redis_repo::{RedisClient, RedisJobLock};
pub use sms::{DryRunGateway, HttpSmsGateway, SentMessage};
