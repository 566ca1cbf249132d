//! `shopdesk-desktop`
//!
//! **Responsibility:** Local bridge between the point-of-sale UI and the
//! stock ledger.
//!
//! This crate provides:
//! - Wire types for the named procedures (`createMovement`, `listMovements`, ...)
//! - A dispatcher that maps them onto the ledger services
//! - Environment-based process configuration
//!
//! The binary speaks line-delimited JSON on stdin/stdout; logs go to stderr.

pub mod commands;
pub mod config;
pub mod types;

pub use commands::Bridge;
pub use config::AppConfig;
pub use types::{ErrorKind, Reply, RpcRequest, RpcResponse};
