//! Bridge dispatcher: JSON requests in, JSON responses out.
//!
//! Every failure, including malformed input, comes back as a
//! `{success: false, errorKind, message}` response.

use shopdesk_core::DomainError;
use shopdesk_inventory::{AdjustmentOutcome, PageRequest};
use shopdesk_infra::{CatalogService, LedgerError, LedgerStore, MovementService, PoolService};

use crate::types::{ErrorKind, Reply, RpcRequest, RpcResponse};

/// Services behind the bridge, sharing one store.
#[derive(Debug, Clone)]
pub struct Bridge {
    movements: MovementService,
    pools: PoolService,
    catalog: CatalogService,
}

impl Bridge {
    pub fn new(store: LedgerStore) -> Self {
        Self {
            movements: MovementService::new(store.clone()),
            pools: PoolService::new(store.clone()),
            catalog: CatalogService::new(store),
        }
    }

    /// Handle one raw request line and render the response line.
    pub async fn handle_line(&self, line: &str) -> String {
        let response = match serde_json::from_str::<RpcRequest>(line) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => {
                tracing::debug!(error = %e, "rejected malformed request");
                RpcResponse::error(ErrorKind::ValidationError, format!("invalid request: {e}"))
            }
        };
        render(&response)
    }

    pub async fn dispatch(&self, request: RpcRequest) -> RpcResponse {
        let method = request.method();
        match self.call(request).await {
            Ok(reply) => RpcResponse::ok(reply),
            Err(err) => {
                let response = ledger_error_to_response(&err);
                tracing::debug!(method, error = %err, "request failed");
                response
            }
        }
    }

    async fn call(&self, request: RpcRequest) -> Result<Reply, LedgerError> {
        let reply = match request {
            RpcRequest::CreateMovement(params) => Reply::Movement {
                movement: self.movements.create_movement(params.into()).await?.into(),
            },
            RpcRequest::CreateAdjustment(params) => {
                match self.movements.create_adjustment(params.into()).await? {
                    AdjustmentOutcome::Recorded { record, level } => Reply::Adjustment {
                        adjustment: Some(record.movement.into()),
                        level,
                    },
                    AdjustmentOutcome::Unchanged { level, .. } => Reply::Adjustment {
                        adjustment: None,
                        level,
                    },
                }
            }
            RpcRequest::ListMovements(params) => {
                let page = PageRequest {
                    page: params.page,
                    limit: params.limit,
                };
                let found = self.movements.list_movements(params.filter(), page).await?;
                Reply::Movements {
                    items: found.items.into_iter().map(Into::into).collect(),
                    total_count: found.total_count,
                    page_count: found.page_count,
                }
            }
            RpcRequest::GetMovement(r) => Reply::Movement {
                movement: self.movements.get_movement(r.movement_id).await?.into(),
            },
            RpcRequest::CreatePool(params) => Reply::Pool {
                pool: self.pools.create_pool(params.into()).await?.into(),
            },
            RpcRequest::GetPool(r) => Reply::Pool {
                pool: self.pools.get_pool(r.pool_id).await?.into(),
            },
            RpcRequest::ListPools(params) => Reply::Pools {
                pools: self
                    .pools
                    .list_pools(params.shop_id, params.include_inactive)
                    .await?
                    .into_iter()
                    .map(Into::into)
                    .collect(),
            },
            RpcRequest::UpdatePool(params) => {
                let (id, update) = params.into_parts();
                Reply::Pool {
                    pool: self.pools.update_pool(id, update).await?.into(),
                }
            }
            RpcRequest::DeactivatePool(r) => Reply::Pool {
                pool: self.pools.deactivate_pool(r.pool_id).await?.into(),
            },
            RpcRequest::RegisterProduct(params) => Reply::Product {
                product: self.catalog.register_product(params.into()).await?.into(),
            },
            RpcRequest::RegisterEmployee(params) => Reply::Employee {
                employee: self.catalog.register_employee(params.into()).await?.into(),
            },
            RpcRequest::RegisterSupplier(params) => Reply::Supplier {
                supplier: self.catalog.register_supplier(params.into()).await?.into(),
            },
        };
        Ok(reply)
    }
}

/// Map a ledger failure to the error kinds the UI understands.
///
/// Storage details stay in the log; the UI gets a generic message.
pub fn ledger_error_to_response(err: &LedgerError) -> RpcResponse {
    match err {
        LedgerError::Domain(domain) => match domain {
            DomainError::Validation(_) | DomainError::InvalidId(_) => {
                RpcResponse::error(ErrorKind::ValidationError, domain.to_string())
            }
            DomainError::InsufficientStock { .. } => {
                RpcResponse::error(ErrorKind::InsufficientStockError, domain.to_string())
            }
            DomainError::NotFound { .. } => {
                RpcResponse::error(ErrorKind::NotFoundError, domain.to_string())
            }
            DomainError::InvariantViolation(_) => {
                tracing::error!(error = %domain, "ledger invariant violated");
                RpcResponse::error(ErrorKind::PersistenceError, "ledger consistency check failed")
            }
        },
        LedgerError::Persistence(e) => {
            tracing::error!(error = %e, "storage failure");
            RpcResponse::error(ErrorKind::PersistenceError, "storage failure; nothing was changed")
        }
        LedgerError::CorruptRow { .. } => {
            tracing::error!(error = %err, "undecodable row");
            RpcResponse::error(ErrorKind::PersistenceError, "stored data could not be read")
        }
    }
}

fn render(response: &RpcResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to serialize response");
        concat!(
            r#"{"success":false,"errorKind":"PersistenceError","#,
            r#""message":"response could not be encoded"}"#
        )
        .to_string()
    })
}
