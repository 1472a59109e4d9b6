//! Diesel-backed persistence adapters.

pub mod diesel_admin_repository;
pub mod diesel_export_repository;
pub mod diesel_inventory_repository;
pub mod diesel_user_repository;
pub mod error_mapping;
pub mod models;
pub mod pool;
pub mod schema;

pub use diesel_admin_repository::DieselAdminRepository;
pub use diesel_export_repository::DieselExportRepository;
pub use diesel_inventory_repository::DieselInventoryRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
