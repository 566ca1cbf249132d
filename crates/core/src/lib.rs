//! `shopdesk-core`: shared domain primitives.
//!
//! Identifiers, the domain error model and the entity marker trait. This crate
//! is pure: no IO, no storage, no async.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{EmployeeId, MovementId, PoolId, ProductId, ShopId, SupplierId};
