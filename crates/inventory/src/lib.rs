//! Inventory ledger domain.
//!
//! Pools, stock movements, stock-count adjustments and the movement query
//! model, implemented as deterministic domain logic (no IO, no storage). The
//! storage crate drives these types inside database transactions.

pub mod adjustment;
pub mod apply;
pub mod catalog;
pub mod movement;
pub mod pool;
pub mod query;

pub use adjustment::{
    AdjustmentOutcome, AdjustmentPlan, AdjustmentRecord, AdjustmentRequest, StockCount,
    plan_adjustment,
};
pub use apply::ApplyPhase;
pub use catalog::{Employee, NewEmployee, NewProduct, NewSupplier, Product, Supplier};
pub use movement::{
    Direction, MovementRequest, MovementType, Route, StockMovement, ValidatedMovement,
};
pub use pool::{InventoryPool, NewPool, PoolUpdate};
pub use query::{MAX_PAGE_LIMIT, MovementFilter, MovementPage, PageRequest};
