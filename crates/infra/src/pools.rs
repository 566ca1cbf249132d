//! Inventory pools: the level primitives used by movements, and pool
//! provisioning.
//!
//! `increment`, `decrement` and `set_level` are crate-private: the only callers
//! are the movement service's transactions.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use shopdesk_core::{DomainError, Entity, PoolId, ShopId};
use shopdesk_inventory::{InventoryPool, NewPool, PoolUpdate};

use crate::error::LedgerResult;
use crate::rows;
use crate::store::LedgerStore;

const TABLE: &str = "inventory_pools";

const POOL_COLUMNS: &str =
    "id, shop_id, name, level, value, description, active, created_at, updated_at";

fn decode(row: &SqliteRow) -> LedgerResult<InventoryPool> {
    Ok(InventoryPool {
        id: rows::decode(TABLE, row, "id")?,
        shop_id: rows::decode(TABLE, row, "shop_id")?,
        name: row.try_get("name")?,
        level: row.try_get("level")?,
        value: row.try_get("value")?,
        description: row.try_get("description")?,
        active: row.try_get("active")?,
        created_at: rows::decode_ts(TABLE, row, "created_at")?,
        updated_at: rows::decode_ts(TABLE, row, "updated_at")?,
    })
}

pub(crate) async fn fetch(
    conn: &mut SqliteConnection,
    id: PoolId,
) -> LedgerResult<Option<InventoryPool>> {
    let row = sqlx::query(&format!(
        "SELECT {POOL_COLUMNS} FROM inventory_pools WHERE id = ?1"
    ))
    .bind(id.to_string())
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(decode).transpose()
}

pub(crate) async fn require(
    conn: &mut SqliteConnection,
    id: PoolId,
) -> LedgerResult<InventoryPool> {
    fetch(conn, id)
        .await?
        .ok_or_else(|| DomainError::not_found(InventoryPool::KIND, id).into())
}

/// Take `amount` out of a pool.
///
/// The sufficiency check is part of the UPDATE itself, so a level claimed by
/// another writer between our read and this write cannot go negative.
pub(crate) async fn decrement(
    conn: &mut SqliteConnection,
    id: PoolId,
    amount: i64,
) -> LedgerResult<i64> {
    let updated: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE inventory_pools
        SET level = level - ?1,
            updated_at = ?2
        WHERE id = ?3
          AND level >= ?1
        RETURNING level
        "#,
    )
    .bind(amount)
    .bind(rows::encode_ts(rows::now()))
    .bind(id.to_string())
    .fetch_optional(&mut *conn)
    .await?;

    match updated {
        Some(level) => Ok(level),
        None => {
            let pool = require(conn, id).await?;
            Err(DomainError::insufficient_stock(id, amount, pool.level).into())
        }
    }
}

/// Add `amount` to a pool. No capacity limit; 64-bit overflow is refused.
pub(crate) async fn increment(
    conn: &mut SqliteConnection,
    id: PoolId,
    amount: i64,
) -> LedgerResult<i64> {
    let updated: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE inventory_pools
        SET level = level + ?1,
            updated_at = ?2
        WHERE id = ?3
          AND level <= ?4
        RETURNING level
        "#,
    )
    .bind(amount)
    .bind(rows::encode_ts(rows::now()))
    .bind(id.to_string())
    .bind(i64::MAX - amount)
    .fetch_optional(&mut *conn)
    .await?;

    match updated {
        Some(level) => Ok(level),
        None => {
            let pool = require(conn, id).await?;
            pool.level_after_receiving(amount)?;
            Err(DomainError::invariant(format!("increment of pool {id} matched no row")).into())
        }
    }
}

/// Overwrite the level. Reserved for stock-count reconciliation.
pub(crate) async fn set_level(
    conn: &mut SqliteConnection,
    id: PoolId,
    level: i64,
) -> LedgerResult<()> {
    if level < 0 {
        return Err(DomainError::validation("pool level cannot be negative").into());
    }
    let result = sqlx::query(
        r#"
        UPDATE inventory_pools
        SET level = ?1,
            updated_at = ?2
        WHERE id = ?3
        "#,
    )
    .bind(level)
    .bind(rows::encode_ts(rows::now()))
    .bind(id.to_string())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DomainError::not_found(InventoryPool::KIND, id).into());
    }
    Ok(())
}

pub(crate) async fn level(conn: &mut SqliteConnection, id: PoolId) -> LedgerResult<i64> {
    let level: Option<i64> = sqlx::query_scalar("SELECT level FROM inventory_pools WHERE id = ?1")
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;
    level.ok_or_else(|| DomainError::not_found(InventoryPool::KIND, id).into())
}

/// Provisioning and metadata maintenance for pools.
#[derive(Debug, Clone)]
pub struct PoolService {
    store: LedgerStore,
}

impl PoolService {
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    /// Provision a new, empty pool. Stock arrives through movements.
    #[tracing::instrument(skip(self, new), fields(shop_id = %new.shop_id))]
    pub async fn create_pool(&self, new: NewPool) -> LedgerResult<InventoryPool> {
        new.validate()?;

        let now = rows::now();
        let pool = InventoryPool {
            id: PoolId::new(),
            shop_id: new.shop_id,
            name: new.name.trim().to_string(),
            level: 0,
            value: new.value,
            description: new
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            active: true,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO inventory_pools (
                id, shop_id, name, level, value, description, active, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(pool.id.to_string())
        .bind(pool.shop_id.to_string())
        .bind(&pool.name)
        .bind(pool.level)
        .bind(pool.value)
        .bind(&pool.description)
        .bind(pool.active)
        .bind(rows::encode_ts(pool.created_at))
        .bind(rows::encode_ts(pool.updated_at))
        .execute(self.store.pool())
        .await?;

        tracing::info!(pool_id = %pool.id, name = %pool.name, "pool created");
        Ok(pool)
    }

    pub async fn get_pool(&self, id: PoolId) -> LedgerResult<InventoryPool> {
        let mut conn = self.store.pool().acquire().await?;
        require(&mut *conn, id).await
    }

    /// Pools of a shop ordered by name.
    pub async fn list_pools(
        &self,
        shop_id: ShopId,
        include_inactive: bool,
    ) -> LedgerResult<Vec<InventoryPool>> {
        let found = sqlx::query(&format!(
            r#"
            SELECT {POOL_COLUMNS}
            FROM inventory_pools
            WHERE shop_id = ?1
              AND (?2 OR active = 1)
            ORDER BY name ASC, id ASC
            "#
        ))
        .bind(shop_id.to_string())
        .bind(include_inactive)
        .fetch_all(self.store.pool())
        .await?;

        found.iter().map(decode).collect()
    }

    /// Change name, value or description. The level is not editable here.
    pub async fn update_pool(&self, id: PoolId, update: PoolUpdate) -> LedgerResult<InventoryPool> {
        update.validate()?;

        let mut tx = self.store.begin().await?;
        let mut pool = require(&mut *tx, id).await?;
        update.apply_to(&mut pool, rows::now());

        sqlx::query(
            r#"
            UPDATE inventory_pools
            SET name = ?1,
                value = ?2,
                description = ?3,
                updated_at = ?4
            WHERE id = ?5
            "#,
        )
        .bind(&pool.name)
        .bind(pool.value)
        .bind(&pool.description)
        .bind(rows::encode_ts(pool.updated_at))
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(pool_id = %id, "pool updated");
        Ok(pool)
    }

    /// Soft delete: the pool keeps its history but accepts no new movements.
    pub async fn deactivate_pool(&self, id: PoolId) -> LedgerResult<InventoryPool> {
        let mut tx = self.store.begin().await?;
        let mut pool = require(&mut *tx, id).await?;
        if pool.active {
            pool.active = false;
            pool.updated_at = rows::now();
            sqlx::query("UPDATE inventory_pools SET active = 0, updated_at = ?1 WHERE id = ?2")
                .bind(rows::encode_ts(pool.updated_at))
                .bind(id.to_string())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::info!(pool_id = %id, level = pool.level, "pool deactivated");
        Ok(pool)
    }
}
