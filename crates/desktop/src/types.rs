//! Wire types for the bridge.
//!
//! Requests are `{"method": "<name>", "params": {...}}`; responses carry a
//! `success` flag next to the payload fields. Field names are camelCase,
//! identifiers UUID strings, timestamps RFC 3339 UTC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopdesk_core::{EmployeeId, MovementId, PoolId, ProductId, ShopId, SupplierId};
use shopdesk_inventory::{
    AdjustmentRequest, Direction, Employee, InventoryPool, MovementFilter, MovementRequest,
    MovementType, NewEmployee, NewPool, NewProduct, NewSupplier, PoolUpdate, Product,
    StockMovement, Supplier,
};

/// One bridge call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "camelCase")]
pub enum RpcRequest {
    CreateMovement(CreateMovementParams),
    CreateAdjustment(CreateAdjustmentParams),
    ListMovements(ListMovementsParams),
    GetMovement(MovementRef),
    CreatePool(CreatePoolParams),
    GetPool(PoolRef),
    ListPools(ListPoolsParams),
    UpdatePool(UpdatePoolParams),
    DeactivatePool(PoolRef),
    RegisterProduct(RegisterProductParams),
    RegisterEmployee(RegisterEmployeeParams),
    RegisterSupplier(RegisterSupplierParams),
}

impl RpcRequest {
    pub fn method(&self) -> &'static str {
        match self {
            RpcRequest::CreateMovement(_) => "createMovement",
            RpcRequest::CreateAdjustment(_) => "createAdjustment",
            RpcRequest::ListMovements(_) => "listMovements",
            RpcRequest::GetMovement(_) => "getMovement",
            RpcRequest::CreatePool(_) => "createPool",
            RpcRequest::GetPool(_) => "getPool",
            RpcRequest::ListPools(_) => "listPools",
            RpcRequest::UpdatePool(_) => "updatePool",
            RpcRequest::DeactivatePool(_) => "deactivatePool",
            RpcRequest::RegisterProduct(_) => "registerProduct",
            RpcRequest::RegisterEmployee(_) => "registerEmployee",
            RpcRequest::RegisterSupplier(_) => "registerSupplier",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovementParams {
    pub product_id: ProductId,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub direction: Direction,
    pub source_pool_id: PoolId,
    #[serde(default)]
    pub destination_pool_id: Option<PoolId>,
    #[serde(default)]
    pub supplier_id: Option<SupplierId>,
    #[serde(default)]
    pub reason: Option<String>,
    pub performed_by_id: EmployeeId,
    pub cost_per_unit: i64,
    #[serde(default)]
    pub transaction_ref: Option<String>,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

impl From<CreateMovementParams> for MovementRequest {
    fn from(p: CreateMovementParams) -> Self {
        MovementRequest {
            product_id: p.product_id,
            movement_type: p.movement_type,
            quantity: p.quantity,
            direction: p.direction,
            source_pool_id: p.source_pool_id,
            destination_pool_id: p.destination_pool_id,
            supplier_id: p.supplier_id,
            reason: p.reason,
            performed_by: p.performed_by_id,
            cost_per_unit: p.cost_per_unit,
            transaction_ref: p.transaction_ref,
            idempotency_key: p.idempotency_key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdjustmentParams {
    pub product_id: ProductId,
    pub pool_id: PoolId,
    pub physical_count: i64,
    pub reason: String,
    pub performed_by_id: EmployeeId,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

impl From<CreateAdjustmentParams> for AdjustmentRequest {
    fn from(p: CreateAdjustmentParams) -> Self {
        AdjustmentRequest {
            product_id: p.product_id,
            pool_id: p.pool_id,
            physical_count: p.physical_count,
            reason: p.reason,
            performed_by: p.performed_by_id,
            idempotency_key: p.idempotency_key,
        }
    }
}

fn first_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    50
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMovementsParams {
    #[serde(default)]
    pub pool_id: Option<PoolId>,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub movement_type: Option<MovementType>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl ListMovementsParams {
    pub fn filter(&self) -> MovementFilter {
        MovementFilter {
            pool_id: self.pool_id,
            product_id: self.product_id,
            movement_type: self.movement_type,
            start: self.start_date,
            end: self.end_date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRef {
    pub movement_id: MovementId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRef {
    pub pool_id: PoolId,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePoolParams {
    pub shop_id: ShopId,
    pub name: String,
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<CreatePoolParams> for NewPool {
    fn from(p: CreatePoolParams) -> Self {
        NewPool {
            shop_id: p.shop_id,
            name: p.name,
            value: p.value,
            description: p.description,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPoolsParams {
    pub shop_id: ShopId,
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePoolParams {
    pub pool_id: PoolId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl UpdatePoolParams {
    pub fn into_parts(self) -> (PoolId, PoolUpdate) {
        (
            self.pool_id,
            PoolUpdate {
                name: self.name,
                value: self.value,
                description: self.description,
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterProductParams {
    pub shop_id: ShopId,
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub unit_cost: i64,
}

impl From<RegisterProductParams> for NewProduct {
    fn from(p: RegisterProductParams) -> Self {
        NewProduct {
            shop_id: p.shop_id,
            name: p.name,
            sku: p.sku,
            unit_cost: p.unit_cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterEmployeeParams {
    pub shop_id: ShopId,
    pub name: String,
    pub role: String,
}

impl From<RegisterEmployeeParams> for NewEmployee {
    fn from(p: RegisterEmployeeParams) -> Self {
        NewEmployee {
            shop_id: p.shop_id,
            name: p.name,
            role: p.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSupplierParams {
    pub shop_id: ShopId,
    pub name: String,
    #[serde(default)]
    pub contact: Option<String>,
}

impl From<RegisterSupplierParams> for NewSupplier {
    fn from(p: RegisterSupplierParams) -> Self {
        NewSupplier {
            shop_id: p.shop_id,
            name: p.name,
            contact: p.contact,
        }
    }
}

/// Movement as the UI sees it. Adjustments carry their count snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementDto {
    pub id: MovementId,
    pub product_id: ProductId,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub direction: Direction,
    pub source_pool_id: PoolId,
    pub destination_pool_id: Option<PoolId>,
    pub supplier_id: Option<SupplierId>,
    pub reason: Option<String>,
    pub performed_by_id: EmployeeId,
    pub transaction_ref: Option<String>,
    pub cost_per_unit: i64,
    pub total_cost: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discrepancy: Option<i64>,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<StockMovement> for MovementDto {
    fn from(m: StockMovement) -> Self {
        MovementDto {
            id: m.id,
            product_id: m.product_id,
            movement_type: m.movement_type,
            quantity: m.quantity,
            direction: m.direction,
            source_pool_id: m.source_pool_id,
            destination_pool_id: m.destination_pool_id,
            supplier_id: m.supplier_id,
            reason: m.reason,
            performed_by_id: m.performed_by,
            transaction_ref: m.transaction_ref,
            cost_per_unit: m.cost_per_unit,
            total_cost: m.total_cost,
            physical_count: m.count.map(|c| c.physical_count),
            system_count: m.count.map(|c| c.system_count),
            discrepancy: m.count.map(|c| c.discrepancy),
            idempotency_key: m.idempotency_key,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolDto {
    pub id: PoolId,
    pub shop_id: ShopId,
    pub name: String,
    pub level: i64,
    pub value: i64,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InventoryPool> for PoolDto {
    fn from(p: InventoryPool) -> Self {
        PoolDto {
            id: p.id,
            shop_id: p.shop_id,
            name: p.name,
            level: p.level,
            value: p.value,
            description: p.description,
            active: p.active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: ProductId,
    pub shop_id: ShopId,
    pub name: String,
    pub sku: String,
    pub unit_cost: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        ProductDto {
            id: p.id,
            shop_id: p.shop_id,
            name: p.name,
            sku: p.sku,
            unit_cost: p.unit_cost,
            active: p.active,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
    pub id: EmployeeId,
    pub shop_id: ShopId,
    pub name: String,
    pub role: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Employee> for EmployeeDto {
    fn from(e: Employee) -> Self {
        EmployeeDto {
            id: e.id,
            shop_id: e.shop_id,
            name: e.name,
            role: e.role,
            active: e.active,
            created_at: e.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierDto {
    pub id: SupplierId,
    pub shop_id: ShopId,
    pub name: String,
    pub contact: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Supplier> for SupplierDto {
    fn from(s: Supplier) -> Self {
        SupplierDto {
            id: s.id,
            shop_id: s.shop_id,
            name: s.name,
            contact: s.contact,
            created_at: s.created_at,
        }
    }
}

/// Error discriminant shown to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ValidationError,
    InsufficientStockError,
    NotFoundError,
    PersistenceError,
}

/// Payload fields of a response, flattened next to `success`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum Reply {
    Movement {
        movement: MovementDto,
    },
    /// `adjustment` is null when the count matched and nothing was recorded.
    Adjustment {
        adjustment: Option<MovementDto>,
        level: i64,
    },
    Movements {
        items: Vec<MovementDto>,
        total_count: u64,
        page_count: u64,
    },
    Pool {
        pool: PoolDto,
    },
    Pools {
        pools: Vec<PoolDto>,
    },
    Product {
        product: ProductDto,
    },
    Employee {
        employee: EmployeeDto,
    },
    Supplier {
        supplier: SupplierDto,
    },
    Error {
        error_kind: ErrorKind,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcResponse {
    pub success: bool,
    #[serde(flatten)]
    pub reply: Reply,
}

impl RpcResponse {
    pub fn ok(reply: Reply) -> Self {
        Self {
            success: true,
            reply,
        }
    }

    pub fn error(error_kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            reply: Reply::Error {
                error_kind,
                message: message.into(),
            },
        }
    }
}
