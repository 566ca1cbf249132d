use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopdesk_core::{
    DomainError, DomainResult, EmployeeId, Entity, MovementId, PoolId, ProductId, SupplierId,
};

use crate::adjustment::{AdjustmentPlan, AdjustmentRequest, StockCount};

/// Cause of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    Added,
    Sold,
    Returned,
    Adjustment,
    Transfer,
}

impl MovementType {
    pub const ALL: [MovementType; 5] = [
        MovementType::Added,
        MovementType::Sold,
        MovementType::Returned,
        MovementType::Adjustment,
        MovementType::Transfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Added => "added",
            MovementType::Sold => "sold",
            MovementType::Returned => "returned",
            MovementType::Adjustment => "adjustment",
            MovementType::Transfer => "transfer",
        }
    }

    /// Whether a movement of this type may carry `direction`.
    pub fn permits(&self, direction: Direction) -> bool {
        match self {
            MovementType::Added | MovementType::Returned => direction == Direction::Inbound,
            MovementType::Sold => direction == Direction::Outbound,
            MovementType::Adjustment => {
                matches!(direction, Direction::Inbound | Direction::Outbound)
            }
            MovementType::Transfer => direction == Direction::Transfer,
        }
    }
}

impl core::fmt::Display for MovementType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for MovementType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "added" => Ok(MovementType::Added),
            "sold" => Ok(MovementType::Sold),
            "returned" => Ok(MovementType::Returned),
            "adjustment" => Ok(MovementType::Adjustment),
            "transfer" => Ok(MovementType::Transfer),
            other => Err(DomainError::validation(format!(
                "unknown movement type: {other}"
            ))),
        }
    }
}

/// Which way quantity flows relative to the source pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
    Transfer,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
            Direction::Transfer => "transfer",
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbound" => Ok(Direction::Inbound),
            "outbound" => Ok(Direction::Outbound),
            "transfer" => Ok(Direction::Transfer),
            other => Err(DomainError::validation(format!("unknown direction: {other}"))),
        }
    }
}

/// Pools touched by a validated movement.
///
/// A destination only exists on the `Transfer` variant, so "destination iff
/// transfer" cannot be violated once a request has been validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Inbound { pool: PoolId },
    Outbound { pool: PoolId },
    Transfer { source: PoolId, destination: PoolId },
}

impl Route {
    pub fn source(&self) -> PoolId {
        match *self {
            Route::Inbound { pool } | Route::Outbound { pool } => pool,
            Route::Transfer { source, .. } => source,
        }
    }

    pub fn destination(&self) -> Option<PoolId> {
        match *self {
            Route::Inbound { .. } | Route::Outbound { .. } => None,
            Route::Transfer { destination, .. } => Some(destination),
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Route::Inbound { .. } => Direction::Inbound,
            Route::Outbound { .. } => Direction::Outbound,
            Route::Transfer { .. } => Direction::Transfer,
        }
    }
}

/// Caller intent for `createMovement`, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRequest {
    pub product_id: ProductId,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub direction: Direction,
    pub source_pool_id: PoolId,
    pub destination_pool_id: Option<PoolId>,
    pub supplier_id: Option<SupplierId>,
    pub reason: Option<String>,
    pub performed_by: EmployeeId,
    /// Minor currency units (e.g. cents).
    pub cost_per_unit: i64,
    pub transaction_ref: Option<String>,
    pub idempotency_key: Option<String>,
}

impl MovementRequest {
    /// Check the request shape and compute server-side fields.
    ///
    /// Pure: existence of the referenced records and stock sufficiency are
    /// checked later, inside the transaction.
    pub fn validate(self) -> DomainResult<ValidatedMovement> {
        if self.quantity <= 0 {
            return Err(DomainError::validation("quantity must be greater than zero"));
        }
        if self.cost_per_unit < 0 {
            return Err(DomainError::validation("cost_per_unit cannot be negative"));
        }
        if !self.movement_type.permits(self.direction) {
            return Err(DomainError::validation(format!(
                "movement type {} cannot have direction {}",
                self.movement_type, self.direction
            )));
        }

        let route = match (self.movement_type, self.destination_pool_id) {
            (MovementType::Transfer, None) => {
                return Err(DomainError::validation(
                    "transfer movements require a destination pool",
                ));
            }
            (MovementType::Transfer, Some(destination)) => {
                if destination == self.source_pool_id {
                    return Err(DomainError::validation(
                        "transfer source and destination must differ",
                    ));
                }
                Route::Transfer {
                    source: self.source_pool_id,
                    destination,
                }
            }
            (other, Some(_)) => {
                return Err(DomainError::validation(format!(
                    "destination pool is only allowed on transfers, not {other}"
                )));
            }
            (_, None) => match self.direction {
                Direction::Inbound => Route::Inbound {
                    pool: self.source_pool_id,
                },
                Direction::Outbound => Route::Outbound {
                    pool: self.source_pool_id,
                },
                Direction::Transfer => {
                    return Err(DomainError::invariant(
                        "transfer direction passed type check without transfer type",
                    ));
                }
            },
        };

        let total_cost = total_cost(self.quantity, self.cost_per_unit)?;

        Ok(ValidatedMovement {
            product_id: self.product_id,
            movement_type: self.movement_type,
            quantity: self.quantity,
            route,
            supplier_id: self.supplier_id,
            reason: normalize(self.reason),
            performed_by: self.performed_by,
            cost_per_unit: self.cost_per_unit,
            total_cost,
            transaction_ref: normalize(self.transaction_ref),
            idempotency_key: normalize_key(self.idempotency_key)?,
            count: None,
        })
    }
}

/// A movement that passed shape validation and is ready to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMovement {
    product_id: ProductId,
    movement_type: MovementType,
    quantity: i64,
    route: Route,
    supplier_id: Option<SupplierId>,
    reason: Option<String>,
    performed_by: EmployeeId,
    cost_per_unit: i64,
    total_cost: i64,
    transaction_ref: Option<String>,
    idempotency_key: Option<String>,
    count: Option<StockCount>,
}

impl ValidatedMovement {
    /// Adjustment written by the reconciler. Quantity and direction come from
    /// the plan, so they are already consistent with each other.
    pub(crate) fn reconciled(
        request: &AdjustmentRequest,
        plan: &AdjustmentPlan,
        cost_per_unit: i64,
    ) -> DomainResult<Self> {
        let route = match plan.direction {
            Direction::Inbound => Route::Inbound {
                pool: request.pool_id,
            },
            Direction::Outbound => Route::Outbound {
                pool: request.pool_id,
            },
            Direction::Transfer => {
                return Err(DomainError::invariant("adjustments never transfer stock"));
            }
        };
        if cost_per_unit < 0 {
            return Err(DomainError::validation("cost_per_unit cannot be negative"));
        }

        Ok(Self {
            product_id: request.product_id,
            movement_type: MovementType::Adjustment,
            quantity: plan.quantity,
            route,
            supplier_id: None,
            reason: normalize(Some(request.reason.clone())),
            performed_by: request.performed_by,
            cost_per_unit,
            total_cost: total_cost(plan.quantity, cost_per_unit)?,
            transaction_ref: None,
            idempotency_key: normalize_key(request.idempotency_key.clone())?,
            count: Some(plan.count),
        })
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn movement_type(&self) -> MovementType {
        self.movement_type
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn supplier_id(&self) -> Option<SupplierId> {
        self.supplier_id
    }

    pub fn performed_by(&self) -> EmployeeId {
        self.performed_by
    }

    pub fn total_cost(&self) -> i64 {
        self.total_cost
    }

    pub fn idempotency_key(&self) -> Option<&str> {
        self.idempotency_key.as_deref()
    }

    pub fn count(&self) -> Option<StockCount> {
        self.count
    }
}

/// Immutable audit record of a committed quantity change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub movement_type: MovementType,
    /// Always positive; the sign lives in `direction`.
    pub quantity: i64,
    pub direction: Direction,
    pub source_pool_id: PoolId,
    pub destination_pool_id: Option<PoolId>,
    pub supplier_id: Option<SupplierId>,
    pub reason: Option<String>,
    pub performed_by: EmployeeId,
    pub transaction_ref: Option<String>,
    pub cost_per_unit: i64,
    pub total_cost: i64,
    /// Present on adjustments written by the reconciler.
    pub count: Option<StockCount>,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    pub fn from_validated(
        id: MovementId,
        movement: ValidatedMovement,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            product_id: movement.product_id,
            movement_type: movement.movement_type,
            quantity: movement.quantity,
            direction: movement.route.direction(),
            source_pool_id: movement.route.source(),
            destination_pool_id: movement.route.destination(),
            supplier_id: movement.supplier_id,
            reason: movement.reason,
            performed_by: movement.performed_by,
            transaction_ref: movement.transaction_ref,
            cost_per_unit: movement.cost_per_unit,
            total_cost: movement.total_cost,
            count: movement.count,
            idempotency_key: movement.idempotency_key,
            created_at,
        }
    }

    /// Whether a replayed request (same idempotency key) describes this movement.
    pub fn matches_intent(&self, movement: &ValidatedMovement) -> bool {
        self.product_id == movement.product_id
            && self.movement_type == movement.movement_type
            && self.quantity == movement.quantity
            && self.direction == movement.route.direction()
            && self.source_pool_id == movement.route.source()
            && self.destination_pool_id == movement.route.destination()
    }

    /// Signed change this movement applied to `pool`.
    ///
    /// Summing this over a pool's full history yields its current level.
    pub fn net_effect(&self, pool: PoolId) -> i64 {
        let mut effect = 0;
        if self.source_pool_id == pool {
            effect += match self.direction {
                Direction::Inbound => self.quantity,
                Direction::Outbound | Direction::Transfer => -self.quantity,
            };
        }
        if self.destination_pool_id == Some(pool) {
            effect += self.quantity;
        }
        effect
    }
}

impl Entity for StockMovement {
    type Id = MovementId;
    const KIND: &'static str = "movement";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn total_cost(quantity: i64, cost_per_unit: i64) -> DomainResult<i64> {
    quantity
        .checked_mul(cost_per_unit)
        .ok_or_else(|| DomainError::validation("total cost overflows"))
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn normalize_key(key: Option<String>) -> DomainResult<Option<String>> {
    match key {
        None => Ok(None),
        Some(k) if k.trim().is_empty() => {
            Err(DomainError::validation("idempotency key cannot be blank"))
        }
        Some(k) => Ok(Some(k.trim().to_string())),
    }
}
