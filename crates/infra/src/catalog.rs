//! Products, employees and suppliers referenced by movements.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use shopdesk_core::{DomainError, EmployeeId, Entity, ProductId, SupplierId};
use shopdesk_inventory::{Employee, NewEmployee, NewProduct, NewSupplier, Product, Supplier};

use crate::error::{LedgerError, LedgerResult};
use crate::rows;
use crate::store::LedgerStore;

fn decode_product(row: &SqliteRow) -> LedgerResult<Product> {
    Ok(Product {
        id: rows::decode("products", row, "id")?,
        shop_id: rows::decode("products", row, "shop_id")?,
        name: row.try_get("name")?,
        sku: row.try_get("sku")?,
        unit_cost: row.try_get("unit_cost")?,
        active: row.try_get("active")?,
        created_at: rows::decode_ts("products", row, "created_at")?,
    })
}

fn decode_employee(row: &SqliteRow) -> LedgerResult<Employee> {
    Ok(Employee {
        id: rows::decode("employees", row, "id")?,
        shop_id: rows::decode("employees", row, "shop_id")?,
        name: row.try_get("name")?,
        role: row.try_get("role")?,
        active: row.try_get("active")?,
        created_at: rows::decode_ts("employees", row, "created_at")?,
    })
}

fn decode_supplier(row: &SqliteRow) -> LedgerResult<Supplier> {
    Ok(Supplier {
        id: rows::decode("suppliers", row, "id")?,
        shop_id: rows::decode("suppliers", row, "shop_id")?,
        name: row.try_get("name")?,
        contact: row.try_get("contact")?,
        created_at: rows::decode_ts("suppliers", row, "created_at")?,
    })
}

pub(crate) async fn require_product(
    conn: &mut SqliteConnection,
    id: ProductId,
) -> LedgerResult<Product> {
    let row = sqlx::query(
        "SELECT id, shop_id, name, sku, unit_cost, active, created_at FROM products WHERE id = ?1",
    )
    .bind(id.to_string())
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DomainError::not_found(Product::KIND, id))?;
    decode_product(&row)
}

pub(crate) async fn require_employee(
    conn: &mut SqliteConnection,
    id: EmployeeId,
) -> LedgerResult<Employee> {
    let row = sqlx::query(
        "SELECT id, shop_id, name, role, active, created_at FROM employees WHERE id = ?1",
    )
    .bind(id.to_string())
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DomainError::not_found(Employee::KIND, id))?;
    decode_employee(&row)
}

pub(crate) async fn require_supplier(
    conn: &mut SqliteConnection,
    id: SupplierId,
) -> LedgerResult<Supplier> {
    let row = sqlx::query(
        "SELECT id, shop_id, name, contact, created_at FROM suppliers WHERE id = ?1",
    )
    .bind(id.to_string())
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DomainError::not_found(Supplier::KIND, id))?;
    decode_supplier(&row)
}

/// Fails with `Validation` when the record is soft-deleted.
pub(crate) fn ensure_active<E: Entity>(entity: &E) -> LedgerResult<()> {
    if !entity.is_active() {
        return Err(DomainError::validation(format!(
            "{} {} is deactivated",
            E::KIND,
            entity.id()
        ))
        .into());
    }
    Ok(())
}

/// Registry for the records a movement points at.
#[derive(Debug, Clone)]
pub struct CatalogService {
    store: LedgerStore,
}

impl CatalogService {
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    pub async fn register_product(&self, new: NewProduct) -> LedgerResult<Product> {
        new.validate()?;
        let product = Product {
            id: ProductId::new(),
            shop_id: new.shop_id,
            name: new.name.trim().to_string(),
            sku: new.sku.trim().to_string(),
            unit_cost: new.unit_cost,
            active: true,
            created_at: rows::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO products (id, shop_id, name, sku, unit_cost, active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(product.id.to_string())
        .bind(product.shop_id.to_string())
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.unit_cost)
        .bind(product.active)
        .bind(rows::encode_ts(product.created_at))
        .execute(self.store.pool())
        .await
        .map_err(|e| -> LedgerError {
            let duplicate = matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation());
            if duplicate {
                DomainError::validation(format!("sku {} already exists", product.sku)).into()
            } else {
                e.into()
            }
        })?;

        tracing::info!(product_id = %product.id, sku = %product.sku, "product registered");
        Ok(product)
    }

    pub async fn get_product(&self, id: ProductId) -> LedgerResult<Product> {
        let mut conn = self.store.pool().acquire().await?;
        require_product(&mut *conn, id).await
    }

    pub async fn deactivate_product(&self, id: ProductId) -> LedgerResult<Product> {
        let mut conn = self.store.pool().acquire().await?;
        sqlx::query("UPDATE products SET active = 0 WHERE id = ?1")
            .bind(id.to_string())
            .execute(&mut *conn)
            .await?;
        require_product(&mut *conn, id).await
    }

    pub async fn register_employee(&self, new: NewEmployee) -> LedgerResult<Employee> {
        new.validate()?;
        let employee = Employee {
            id: EmployeeId::new(),
            shop_id: new.shop_id,
            name: new.name.trim().to_string(),
            role: new.role.trim().to_string(),
            active: true,
            created_at: rows::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO employees (id, shop_id, name, role, active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(employee.id.to_string())
        .bind(employee.shop_id.to_string())
        .bind(&employee.name)
        .bind(&employee.role)
        .bind(employee.active)
        .bind(rows::encode_ts(employee.created_at))
        .execute(self.store.pool())
        .await?;

        tracing::info!(employee_id = %employee.id, role = %employee.role, "employee registered");
        Ok(employee)
    }

    pub async fn get_employee(&self, id: EmployeeId) -> LedgerResult<Employee> {
        let mut conn = self.store.pool().acquire().await?;
        require_employee(&mut *conn, id).await
    }

    pub async fn deactivate_employee(&self, id: EmployeeId) -> LedgerResult<Employee> {
        let mut conn = self.store.pool().acquire().await?;
        sqlx::query("UPDATE employees SET active = 0 WHERE id = ?1")
            .bind(id.to_string())
            .execute(&mut *conn)
            .await?;
        require_employee(&mut *conn, id).await
    }

    pub async fn register_supplier(&self, new: NewSupplier) -> LedgerResult<Supplier> {
        new.validate()?;
        let supplier = Supplier {
            id: SupplierId::new(),
            shop_id: new.shop_id,
            name: new.name.trim().to_string(),
            contact: new
                .contact
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            created_at: rows::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO suppliers (id, shop_id, name, contact, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(supplier.id.to_string())
        .bind(supplier.shop_id.to_string())
        .bind(&supplier.name)
        .bind(&supplier.contact)
        .bind(rows::encode_ts(supplier.created_at))
        .execute(self.store.pool())
        .await?;

        tracing::info!(supplier_id = %supplier.id, "supplier registered");
        Ok(supplier)
    }

    pub async fn get_supplier(&self, id: SupplierId) -> LedgerResult<Supplier> {
        let mut conn = self.store.pool().acquire().await?;
        require_supplier(&mut *conn, id).await
    }
}
