//! The append-only movement log.
//!
//! Rows are only ever inserted; schema triggers reject UPDATE and DELETE.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use chrono::{DateTime, Utc};
use shopdesk_core::{DomainError, Entity, MovementId};
use shopdesk_inventory::{
    MovementFilter, MovementPage, PageRequest, StockCount, StockMovement, ValidatedMovement,
};

use crate::error::{LedgerError, LedgerResult};
use crate::rows;

const TABLE: &str = "stock_movements";

const MOVEMENT_COLUMNS: &str = r#"
    id, product_id, movement_type, quantity, direction,
    source_pool_id, destination_pool_id, supplier_id, reason, performed_by,
    transaction_ref, cost_per_unit, total_cost,
    physical_count, system_count, discrepancy,
    idempotency_key, created_at
"#;

// Shared by the count and the page query so both see the same rows.
const FILTER_CLAUSE: &str = r#"
    WHERE (?1 IS NULL OR source_pool_id = ?1 OR destination_pool_id = ?1)
      AND (?2 IS NULL OR product_id = ?2)
      AND (?3 IS NULL OR movement_type = ?3)
      AND (?4 IS NULL OR created_at >= ?4)
      AND (?5 IS NULL OR created_at <= ?5)
"#;

fn decode(row: &SqliteRow) -> LedgerResult<StockMovement> {
    let physical: Option<i64> = row.try_get("physical_count")?;
    let system: Option<i64> = row.try_get("system_count")?;
    let discrepancy: Option<i64> = row.try_get("discrepancy")?;
    let count = match (physical, system, discrepancy) {
        (Some(physical_count), Some(system_count), Some(discrepancy)) => Some(StockCount {
            physical_count,
            system_count,
            discrepancy,
        }),
        (None, None, None) => None,
        _ => return Err(LedgerError::corrupt(TABLE, "partial stock count columns")),
    };

    Ok(StockMovement {
        id: rows::decode(TABLE, row, "id")?,
        product_id: rows::decode(TABLE, row, "product_id")?,
        movement_type: rows::decode(TABLE, row, "movement_type")?,
        quantity: row.try_get("quantity")?,
        direction: rows::decode(TABLE, row, "direction")?,
        source_pool_id: rows::decode(TABLE, row, "source_pool_id")?,
        destination_pool_id: rows::decode_opt(TABLE, row, "destination_pool_id")?,
        supplier_id: rows::decode_opt(TABLE, row, "supplier_id")?,
        reason: row.try_get("reason")?,
        performed_by: rows::decode(TABLE, row, "performed_by")?,
        transaction_ref: row.try_get("transaction_ref")?,
        cost_per_unit: row.try_get("cost_per_unit")?,
        total_cost: row.try_get("total_cost")?,
        count,
        idempotency_key: row.try_get("idempotency_key")?,
        created_at: rows::decode_ts(TABLE, row, "created_at")?,
    })
}

/// Append one movement row and return it as stored.
pub(crate) async fn record(
    conn: &mut SqliteConnection,
    movement: ValidatedMovement,
    created_at: DateTime<Utc>,
) -> LedgerResult<StockMovement> {
    let movement = StockMovement::from_validated(MovementId::new(), movement, created_at);
    let count = movement.count;

    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, product_id, movement_type, quantity, direction,
            source_pool_id, destination_pool_id, supplier_id, reason, performed_by,
            transaction_ref, cost_per_unit, total_cost,
            physical_count, system_count, discrepancy,
            idempotency_key, created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
        "#,
    )
    .bind(movement.id.to_string())
    .bind(movement.product_id.to_string())
    .bind(movement.movement_type.as_str())
    .bind(movement.quantity)
    .bind(movement.direction.as_str())
    .bind(movement.source_pool_id.to_string())
    .bind(movement.destination_pool_id.map(|id| id.to_string()))
    .bind(movement.supplier_id.map(|id| id.to_string()))
    .bind(&movement.reason)
    .bind(movement.performed_by.to_string())
    .bind(&movement.transaction_ref)
    .bind(movement.cost_per_unit)
    .bind(movement.total_cost)
    .bind(count.map(|c| c.physical_count))
    .bind(count.map(|c| c.system_count))
    .bind(count.map(|c| c.discrepancy))
    .bind(&movement.idempotency_key)
    .bind(rows::encode_ts(movement.created_at))
    .execute(&mut *conn)
    .await?;

    Ok(movement)
}

pub(crate) async fn fetch(
    conn: &mut SqliteConnection,
    id: MovementId,
) -> LedgerResult<Option<StockMovement>> {
    let row = sqlx::query(&format!(
        "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE id = ?1"
    ))
    .bind(id.to_string())
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(decode).transpose()
}

pub(crate) async fn require(
    conn: &mut SqliteConnection,
    id: MovementId,
) -> LedgerResult<StockMovement> {
    fetch(conn, id)
        .await?
        .ok_or_else(|| DomainError::not_found(StockMovement::KIND, id).into())
}

pub(crate) async fn find_by_idempotency_key(
    conn: &mut SqliteConnection,
    key: &str,
) -> LedgerResult<Option<StockMovement>> {
    let row = sqlx::query(&format!(
        "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE idempotency_key = ?1"
    ))
    .bind(key)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(decode).transpose()
}

/// One page of matching movements, newest first, plus the unpaged total.
pub(crate) async fn list(
    conn: &mut SqliteConnection,
    filter: &MovementFilter,
    page: PageRequest,
) -> LedgerResult<MovementPage> {
    let pool_param = filter.pool_id.map(|id| id.to_string());
    let product_param = filter.product_id.map(|id| id.to_string());
    let type_param = filter.movement_type.map(|t| t.as_str());
    let start_param = filter.start.map(rows::encode_ts);
    let end_param = filter.end.map(rows::encode_ts);

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM stock_movements {FILTER_CLAUSE}"
    ))
    .bind(&pool_param)
    .bind(&product_param)
    .bind(type_param)
    .bind(&start_param)
    .bind(&end_param)
    .fetch_one(&mut *conn)
    .await?;

    let offset = i64::try_from(page.offset())
        .map_err(|_| DomainError::validation("page is out of range"))?;

    let found = sqlx::query(&format!(
        r#"
        SELECT {MOVEMENT_COLUMNS}
        FROM stock_movements
        {FILTER_CLAUSE}
        ORDER BY created_at DESC, id DESC
        LIMIT ?6 OFFSET ?7
        "#
    ))
    .bind(&pool_param)
    .bind(&product_param)
    .bind(type_param)
    .bind(&start_param)
    .bind(&end_param)
    .bind(i64::from(page.limit))
    .bind(offset)
    .fetch_all(&mut *conn)
    .await?;

    let items = found.iter().map(decode).collect::<LedgerResult<Vec<_>>>()?;
    let total_count = u64::try_from(total)
        .map_err(|_| LedgerError::corrupt(TABLE, format!("negative row count {total}")))?;

    Ok(MovementPage {
        items,
        page_count: page.page_count(total_count),
        total_count,
    })
}
