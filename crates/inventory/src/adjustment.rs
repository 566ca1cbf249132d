//! Reconciling recorded stock against a physical count.

use serde::{Deserialize, Serialize};

use shopdesk_core::{DomainError, DomainResult, EmployeeId, PoolId, ProductId};

use crate::movement::{Direction, MovementType, StockMovement, ValidatedMovement};

/// Snapshot of a stock count at adjustment time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockCount {
    /// Counted truth.
    pub physical_count: i64,
    /// Recorded level before the adjustment.
    pub system_count: i64,
    /// `physical_count - system_count`.
    pub discrepancy: i64,
}

impl StockCount {
    pub fn new(physical_count: i64, system_count: i64) -> DomainResult<Self> {
        let discrepancy = physical_count
            .checked_sub(system_count)
            .ok_or_else(|| DomainError::validation("discrepancy overflows"))?;
        Ok(Self {
            physical_count,
            system_count,
            discrepancy,
        })
    }

    /// `system_count + discrepancy == physical_count`, checked without overflow.
    pub fn is_consistent(&self) -> bool {
        self.system_count.checked_add(self.discrepancy) == Some(self.physical_count)
    }
}

/// Caller intent for `createAdjustment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentRequest {
    pub product_id: ProductId,
    pub pool_id: PoolId,
    pub physical_count: i64,
    pub reason: String,
    pub performed_by: EmployeeId,
    pub idempotency_key: Option<String>,
}

impl AdjustmentRequest {
    pub fn validate(&self) -> DomainResult<()> {
        if self.physical_count < 0 {
            return Err(DomainError::validation("physical count cannot be negative"));
        }
        if self.reason.trim().is_empty() {
            return Err(DomainError::validation("adjustment reason is required"));
        }
        if self.idempotency_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            return Err(DomainError::validation("idempotency key cannot be blank"));
        }
        Ok(())
    }
}

/// What the reconciler will write for a non-zero discrepancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjustmentPlan {
    pub count: StockCount,
    pub quantity: i64,
    pub direction: Direction,
}

impl AdjustmentPlan {
    pub fn into_movement(
        self,
        request: &AdjustmentRequest,
        cost_per_unit: i64,
    ) -> DomainResult<ValidatedMovement> {
        ValidatedMovement::reconciled(request, &self, cost_per_unit)
    }
}

/// Compare a physical count with the recorded level.
///
/// Returns `None` when they agree: nothing is recorded for a zero discrepancy.
pub fn plan_adjustment(
    system_count: i64,
    physical_count: i64,
) -> DomainResult<Option<AdjustmentPlan>> {
    if physical_count < 0 {
        return Err(DomainError::validation("physical count cannot be negative"));
    }
    let count = StockCount::new(physical_count, system_count)?;
    if count.discrepancy == 0 {
        return Ok(None);
    }

    let direction = if count.discrepancy > 0 {
        Direction::Inbound
    } else {
        Direction::Outbound
    };
    let quantity = count
        .discrepancy
        .checked_abs()
        .ok_or_else(|| DomainError::validation("discrepancy overflows"))?;

    Ok(Some(AdjustmentPlan {
        count,
        quantity,
        direction,
    }))
}

/// A committed adjustment movement together with its count snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentRecord {
    pub movement: StockMovement,
    pub physical_count: i64,
    pub system_count: i64,
    pub discrepancy: i64,
}

impl TryFrom<StockMovement> for AdjustmentRecord {
    type Error = DomainError;

    fn try_from(movement: StockMovement) -> Result<Self, Self::Error> {
        if movement.movement_type != MovementType::Adjustment {
            return Err(DomainError::invariant(format!(
                "movement {} is a {} movement, not an adjustment",
                movement.id, movement.movement_type
            )));
        }
        let count = movement.count.ok_or_else(|| {
            DomainError::invariant(format!("adjustment {} has no stock count", movement.id))
        })?;
        Ok(Self {
            physical_count: count.physical_count,
            system_count: count.system_count,
            discrepancy: count.discrepancy,
            movement,
        })
    }
}

/// Result of `createAdjustment`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdjustmentOutcome {
    /// An adjustment was recorded and the pool now holds `level`.
    Recorded { record: AdjustmentRecord, level: i64 },
    /// The count matched; nothing was written.
    Unchanged { pool_id: PoolId, level: i64 },
}

impl AdjustmentOutcome {
    pub fn level(&self) -> i64 {
        match self {
            AdjustmentOutcome::Recorded { level, .. }
            | AdjustmentOutcome::Unchanged { level, .. } => *level,
        }
    }

    pub fn record(&self) -> Option<&AdjustmentRecord> {
        match self {
            AdjustmentOutcome::Recorded { record, .. } => Some(record),
            AdjustmentOutcome::Unchanged { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use shopdesk_core::MovementId;

    fn request(physical_count: i64) -> AdjustmentRequest {
        AdjustmentRequest {
            product_id: ProductId::new(),
            pool_id: PoolId::new(),
            physical_count,
            reason: "cycle count".into(),
            performed_by: EmployeeId::new(),
            idempotency_key: None,
        }
    }

    #[test]
    fn shortfall_becomes_outbound_adjustment() {
        let plan = plan_adjustment(50, 42).unwrap().unwrap();
        assert_eq!(plan.count.discrepancy, -8);
        assert_eq!(plan.quantity, 8);
        assert_eq!(plan.direction, Direction::Outbound);
    }

    #[test]
    fn surplus_becomes_inbound_adjustment() {
        let plan = plan_adjustment(10, 13).unwrap().unwrap();
        assert_eq!(plan.count.discrepancy, 3);
        assert_eq!(plan.quantity, 3);
        assert_eq!(plan.direction, Direction::Inbound);
    }

    #[test]
    fn matching_count_plans_nothing() {
        assert_eq!(plan_adjustment(7, 7).unwrap(), None);
    }

    #[test]
    fn negative_physical_count_is_rejected() {
        assert!(matches!(
            plan_adjustment(7, -1),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(request(-1).validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn blank_reason_is_rejected() {
        let mut req = request(3);
        req.reason = " ".into();
        assert!(matches!(req.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn plan_becomes_adjustment_movement_on_the_counted_pool() {
        let req = request(42);
        let plan = plan_adjustment(50, 42).unwrap().unwrap();
        let movement = plan.into_movement(&req, 120).unwrap();

        assert_eq!(movement.movement_type(), MovementType::Adjustment);
        assert_eq!(movement.route().source(), req.pool_id);
        assert_eq!(movement.route().destination(), None);
        assert_eq!(movement.quantity(), 8);
        assert_eq!(movement.total_cost(), 960);
        assert_eq!(movement.count(), Some(plan.count));
    }

    #[test]
    fn record_requires_adjustment_with_count() {
        let req = request(42);
        let plan = plan_adjustment(50, 42).unwrap().unwrap();
        let validated = plan.into_movement(&req, 0).unwrap();
        let movement = StockMovement::from_validated(MovementId::new(), validated, Utc::now());

        let record = AdjustmentRecord::try_from(movement.clone()).unwrap();
        assert_eq!(record.discrepancy, -8);
        assert_eq!(record.movement.reason.as_deref(), Some("cycle count"));

        let mut not_counted = movement;
        not_counted.count = None;
        assert!(AdjustmentRecord::try_from(not_counted).is_err());
    }

    proptest! {
        /// Property: applying the planned movement to the system count lands
        /// exactly on the physical count.
        #[test]
        fn planned_adjustment_reaches_physical_count(
            system in 0i64..1_000_000,
            physical in 0i64..1_000_000,
        ) {
            match plan_adjustment(system, physical).unwrap() {
                None => prop_assert_eq!(system, physical),
                Some(plan) => {
                    prop_assert!(plan.quantity > 0);
                    prop_assert!(plan.count.is_consistent());
                    let signed = match plan.direction {
                        Direction::Inbound => plan.quantity,
                        Direction::Outbound => -plan.quantity,
                        Direction::Transfer => unreachable!("adjustments never transfer"),
                    };
                    prop_assert_eq!(system + signed, physical);
                }
            }
        }
    }
}
