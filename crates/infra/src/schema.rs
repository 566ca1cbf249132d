//! Schema, created idempotently when the store opens.

pub(crate) const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id          TEXT PRIMARY KEY,
        shop_id     TEXT NOT NULL,
        name        TEXT NOT NULL,
        sku         TEXT NOT NULL,
        unit_cost   INTEGER NOT NULL CHECK (unit_cost >= 0),
        active      INTEGER NOT NULL DEFAULT 1,
        created_at  TEXT NOT NULL,
        UNIQUE (shop_id, sku)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id          TEXT PRIMARY KEY,
        shop_id     TEXT NOT NULL,
        name        TEXT NOT NULL,
        role        TEXT NOT NULL,
        active      INTEGER NOT NULL DEFAULT 1,
        created_at  TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS suppliers (
        id          TEXT PRIMARY KEY,
        shop_id     TEXT NOT NULL,
        name        TEXT NOT NULL,
        contact     TEXT NULL,
        created_at  TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory_pools (
        id           TEXT PRIMARY KEY,
        shop_id      TEXT NOT NULL,
        name         TEXT NOT NULL,
        level        INTEGER NOT NULL DEFAULT 0 CHECK (level >= 0),
        value        INTEGER NOT NULL DEFAULT 0 CHECK (value >= 0),
        description  TEXT NULL,
        active       INTEGER NOT NULL DEFAULT 1,
        created_at   TEXT NOT NULL,
        updated_at   TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_inventory_pools_shop
        ON inventory_pools (shop_id, name)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS stock_movements (
        id                   TEXT PRIMARY KEY,
        product_id           TEXT NOT NULL REFERENCES products (id),
        movement_type        TEXT NOT NULL
            CHECK (movement_type IN ('added', 'sold', 'returned', 'adjustment', 'transfer')),
        quantity             INTEGER NOT NULL CHECK (quantity > 0),
        direction            TEXT NOT NULL
            CHECK (direction IN ('inbound', 'outbound', 'transfer')),
        source_pool_id       TEXT NOT NULL REFERENCES inventory_pools (id),
        destination_pool_id  TEXT NULL REFERENCES inventory_pools (id),
        supplier_id          TEXT NULL REFERENCES suppliers (id),
        reason               TEXT NULL,
        performed_by         TEXT NOT NULL REFERENCES employees (id),
        transaction_ref      TEXT NULL,
        cost_per_unit        INTEGER NOT NULL CHECK (cost_per_unit >= 0),
        total_cost           INTEGER NOT NULL,
        physical_count       INTEGER NULL,
        system_count         INTEGER NULL,
        discrepancy          INTEGER NULL,
        idempotency_key      TEXT NULL UNIQUE,
        created_at           TEXT NOT NULL,
        CHECK ((movement_type = 'transfer') = (destination_pool_id IS NOT NULL))
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_stock_movements_created
        ON stock_movements (created_at DESC, id DESC)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_stock_movements_source
        ON stock_movements (source_pool_id, created_at)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_stock_movements_destination
        ON stock_movements (destination_pool_id, created_at)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_stock_movements_product
        ON stock_movements (product_id, created_at)
    "#,
    // Movements are the audit trail: corrections are new rows, never edits.
    r#"
    CREATE TRIGGER IF NOT EXISTS stock_movements_no_update
    BEFORE UPDATE ON stock_movements
    BEGIN
        SELECT RAISE(ABORT, 'stock movements are append-only');
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS stock_movements_no_delete
    BEFORE DELETE ON stock_movements
    BEGIN
        SELECT RAISE(ABORT, 'stock movements are append-only');
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS inventory_pools_no_delete
    BEFORE DELETE ON inventory_pools
    BEGIN
        SELECT RAISE(ABORT, 'pools are deactivated, not deleted');
    END
    "#,
];
