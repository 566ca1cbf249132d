//! Movement application, stock-count reconciliation and history queries.
//!
//! Every write runs in one SQLite transaction: the movement row and the pool
//! levels it touches commit together or not at all. Progress through the
//! transaction is tracked with [`ApplyPhase`] so a rollback can be logged with
//! the step that failed.

use sqlx::{Sqlite, SqliteConnection, Transaction};

use shopdesk_core::{DomainError, MovementId};
use shopdesk_inventory::{
    AdjustmentOutcome, AdjustmentRecord, AdjustmentRequest, ApplyPhase, MovementFilter,
    MovementPage, MovementRequest, MovementType, PageRequest, Route, StockMovement,
    ValidatedMovement, plan_adjustment,
};

use crate::catalog;
use crate::error::{LedgerError, LedgerResult};
use crate::movements;
use crate::pools;
use crate::rows;
use crate::store::LedgerStore;

/// What a transaction body produced.
enum Applied<T> {
    /// Rows were written; commit.
    Written(T),
    /// Nothing was written (idempotent replay, zero discrepancy).
    ReadOnly(T),
}

/// Records stock movements and keeps pool levels in step with them.
#[derive(Debug, Clone)]
pub struct MovementService {
    store: LedgerStore,
}

impl MovementService {
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    /// Validate, record and apply one movement atomically.
    ///
    /// A request carrying an idempotency key that was already used returns
    /// the stored movement without touching any level.
    #[tracing::instrument(
        skip(self, request),
        fields(
            product_id = %request.product_id,
            movement_type = %request.movement_type,
            quantity = request.quantity,
        )
    )]
    pub async fn create_movement(&self, request: MovementRequest) -> LedgerResult<StockMovement> {
        let movement = request.validate()?;

        let mut phase = ApplyPhase::Requested;
        let mut tx = self.store.begin().await?;
        let applied = apply_movement(&mut *tx, movement, &mut phase).await;
        let movement = settle(tx, &mut phase, applied).await?;

        tracing::info!(
            movement_id = %movement.id,
            direction = %movement.direction,
            phase = %phase,
            "movement applied"
        );
        Ok(movement)
    }

    /// Reconcile a pool against a physical count.
    ///
    /// Records an `adjustment` movement for the discrepancy and sets the
    /// level to the counted value. A count that matches the recorded level
    /// writes nothing and returns [`AdjustmentOutcome::Unchanged`].
    #[tracing::instrument(
        skip(self, request),
        fields(
            pool_id = %request.pool_id,
            product_id = %request.product_id,
            physical_count = request.physical_count,
        )
    )]
    pub async fn create_adjustment(
        &self,
        request: AdjustmentRequest,
    ) -> LedgerResult<AdjustmentOutcome> {
        request.validate()?;

        let mut phase = ApplyPhase::Requested;
        let mut tx = self.store.begin().await?;
        let applied = apply_adjustment(&mut *tx, &request, &mut phase).await;
        let outcome = settle(tx, &mut phase, applied).await?;

        match &outcome {
            AdjustmentOutcome::Recorded { record, level } => tracing::info!(
                movement_id = %record.movement.id,
                discrepancy = record.discrepancy,
                level,
                "stock count reconciled"
            ),
            AdjustmentOutcome::Unchanged { level, .. } => {
                tracing::debug!(level, "stock count matches, nothing recorded")
            }
        }
        Ok(outcome)
    }

    /// Movement history, newest first.
    pub async fn list_movements(
        &self,
        filter: MovementFilter,
        page: PageRequest,
    ) -> LedgerResult<MovementPage> {
        filter.validate()?;
        page.validate()?;
        let mut conn = self.store.pool().acquire().await?;
        movements::list(&mut *conn, &filter, page).await
    }

    pub async fn get_movement(&self, id: MovementId) -> LedgerResult<StockMovement> {
        let mut conn = self.store.pool().acquire().await?;
        movements::require(&mut *conn, id).await
    }
}

/// Commit or roll back according to what the body returned.
async fn settle<T>(
    tx: Transaction<'static, Sqlite>,
    phase: &mut ApplyPhase,
    applied: LedgerResult<Applied<T>>,
) -> LedgerResult<T> {
    match applied {
        Ok(Applied::Written(value)) => match tx.commit().await {
            Ok(()) => {
                phase.advance(ApplyPhase::Committed)?;
                Ok(value)
            }
            Err(err) => Err(abandon(phase, err.into())),
        },
        Ok(Applied::ReadOnly(value)) => {
            tx.rollback().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::error!(error = %rollback, "rollback failed");
            }
            Err(abandon(phase, err))
        }
    }
}

fn abandon(phase: &mut ApplyPhase, err: LedgerError) -> LedgerError {
    let failed_at = *phase;
    if let Err(illegal) = phase.advance(ApplyPhase::RolledBack) {
        tracing::error!(error = %illegal, "rollback after terminal phase");
    }
    tracing::warn!(phase = %failed_at, error = %err, "movement rolled back");
    err
}

async fn apply_movement(
    conn: &mut SqliteConnection,
    movement: ValidatedMovement,
    phase: &mut ApplyPhase,
) -> LedgerResult<Applied<StockMovement>> {
    if let Some(key) = movement.idempotency_key() {
        if let Some(existing) = movements::find_by_idempotency_key(conn, key).await? {
            if !existing.matches_intent(&movement) {
                return Err(DomainError::validation(format!(
                    "idempotency key {key} was already used for a different movement"
                ))
                .into());
            }
            tracing::debug!(movement_id = %existing.id, "idempotent replay");
            return Ok(Applied::ReadOnly(existing));
        }
    }

    let product = catalog::require_product(conn, movement.product_id()).await?;
    catalog::ensure_active(&product)?;
    let employee = catalog::require_employee(conn, movement.performed_by()).await?;
    catalog::ensure_active(&employee)?;
    if let Some(supplier_id) = movement.supplier_id() {
        catalog::require_supplier(conn, supplier_id).await?;
    }

    let quantity = movement.quantity();
    let route = movement.route();
    match route {
        Route::Inbound { pool } => {
            let pool = pools::require(conn, pool).await?;
            pool.ensure_active()?;
            pool.level_after_receiving(quantity)?;
        }
        Route::Outbound { pool } => {
            let pool = pools::require(conn, pool).await?;
            pool.ensure_active()?;
            pool.ensure_can_supply(quantity)?;
        }
        Route::Transfer { source, destination } => {
            let source = pools::require(conn, source).await?;
            let destination = pools::require(conn, destination).await?;
            source.ensure_active()?;
            destination.ensure_active()?;
            source.ensure_can_supply(quantity)?;
            destination.level_after_receiving(quantity)?;
        }
    }
    phase.advance(ApplyPhase::StockChecked)?;

    let recorded = movements::record(conn, movement, rows::now()).await?;
    phase.advance(ApplyPhase::MovementRecorded)?;

    match route {
        Route::Inbound { pool } => {
            pools::increment(conn, pool, quantity).await?;
        }
        Route::Outbound { pool } => {
            pools::decrement(conn, pool, quantity).await?;
        }
        Route::Transfer { source, destination } => {
            pools::decrement(conn, source, quantity).await?;
            pools::increment(conn, destination, quantity).await?;
        }
    }
    phase.advance(ApplyPhase::LevelsUpdated)?;

    Ok(Applied::Written(recorded))
}

async fn apply_adjustment(
    conn: &mut SqliteConnection,
    request: &AdjustmentRequest,
    phase: &mut ApplyPhase,
) -> LedgerResult<Applied<AdjustmentOutcome>> {
    if let Some(key) = request.idempotency_key.as_deref().map(str::trim) {
        if let Some(existing) = movements::find_by_idempotency_key(conn, key).await? {
            let same_count = existing.movement_type == MovementType::Adjustment
                && existing.product_id == request.product_id
                && existing.source_pool_id == request.pool_id
                && existing.count.map(|c| c.physical_count) == Some(request.physical_count);
            if !same_count {
                return Err(DomainError::validation(format!(
                    "idempotency key {key} was already used for a different movement"
                ))
                .into());
            }
            let level = pools::level(conn, request.pool_id).await?;
            return Ok(Applied::ReadOnly(AdjustmentOutcome::Recorded {
                record: AdjustmentRecord::try_from(existing)?,
                level,
            }));
        }
    }

    let product = catalog::require_product(conn, request.product_id).await?;
    catalog::ensure_active(&product)?;
    let employee = catalog::require_employee(conn, request.performed_by).await?;
    catalog::ensure_active(&employee)?;
    let pool = pools::require(conn, request.pool_id).await?;
    pool.ensure_active()?;

    let Some(plan) = plan_adjustment(pool.level, request.physical_count)? else {
        return Ok(Applied::ReadOnly(AdjustmentOutcome::Unchanged {
            pool_id: pool.id,
            level: pool.level,
        }));
    };
    phase.advance(ApplyPhase::StockChecked)?;

    let movement = plan.into_movement(request, product.unit_cost)?;
    let recorded = movements::record(conn, movement, rows::now()).await?;
    phase.advance(ApplyPhase::MovementRecorded)?;

    pools::set_level(conn, pool.id, request.physical_count).await?;
    let level = pools::level(conn, pool.id).await?;
    if level != request.physical_count || !plan.count.is_consistent() {
        return Err(DomainError::invariant(format!(
            "pool {} holds {level} after reconciling to {}",
            pool.id, request.physical_count
        ))
        .into());
    }
    phase.advance(ApplyPhase::LevelsUpdated)?;

    let record = AdjustmentRecord::try_from(recorded)?;
    Ok(Applied::Written(AdjustmentOutcome::Recorded { record, level }))
}
