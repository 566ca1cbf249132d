//! Storage layer: the SQLite-backed stock ledger.
//!
//! [`LedgerStore`] owns the connection pool and schema. Services take a store
//! handle at construction:
//!
//! - [`MovementService`]: movements, adjustments and history queries, each
//!   write running as one transaction
//! - [`PoolService`]: pool provisioning and metadata
//! - [`CatalogService`]: products, employees, suppliers referenced by movements

pub mod catalog;
pub mod config;
pub mod error;
pub mod pools;
pub mod service;
pub mod store;

mod movements;
mod rows;
mod schema;


pub use catalog::CatalogService;
pub use config::{StoreConfig, StoreLocation};
pub use error::{LedgerError, LedgerResult};
pub use pools::PoolService;
pub use service::MovementService;
pub use store::LedgerStore;
