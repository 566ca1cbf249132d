//! Records referenced by movements: products, employees, suppliers.
//!
//! The ledger only needs their identity and a few attributes; full catalog
//! management lives elsewhere in the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopdesk_core::{DomainError, DomainResult, EmployeeId, Entity, ProductId, ShopId, SupplierId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub shop_id: ShopId,
    pub name: String,
    pub sku: String,
    /// Minor currency units; used as the cost of reconciler adjustments.
    pub unit_cost: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Entity for Product {
    type Id = ProductId;
    const KIND: &'static str = "product";

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub shop_id: ShopId,
    pub name: String,
    pub sku: String,
    pub unit_cost: i64,
}

impl NewProduct {
    pub fn validate(&self) -> DomainResult<()> {
        require("product name", &self.name)?;
        require("sku", &self.sku)?;
        if self.unit_cost < 0 {
            return Err(DomainError::validation("unit cost cannot be negative"));
        }
        Ok(())
    }
}

/// Staff member who performs movements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub shop_id: ShopId,
    pub name: String,
    pub role: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Entity for Employee {
    type Id = EmployeeId;
    const KIND: &'static str = "employee";

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub shop_id: ShopId,
    pub name: String,
    pub role: String,
}

impl NewEmployee {
    pub fn validate(&self) -> DomainResult<()> {
        require("employee name", &self.name)?;
        require("role", &self.role)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub shop_id: ShopId,
    pub name: String,
    pub contact: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Supplier {
    type Id = SupplierId;
    const KIND: &'static str = "supplier";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSupplier {
    pub shop_id: ShopId,
    pub name: String,
    pub contact: Option<String>,
}

impl NewSupplier {
    pub fn validate(&self) -> DomainResult<()> {
        require("supplier name", &self.name)
    }
}

fn require(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}
