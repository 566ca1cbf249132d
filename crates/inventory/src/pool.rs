use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopdesk_core::{DomainError, DomainResult, Entity, PoolId, ShopId};

/// A named stock location holding a current quantity.
///
/// `level` is only ever changed by committed movements; pool maintenance
/// (rename, revalue, deactivate) never touches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryPool {
    pub id: PoolId,
    pub shop_id: ShopId,
    pub name: String,
    pub level: i64,
    /// Minor currency units.
    pub value: i64,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryPool {
    pub fn ensure_active(&self) -> DomainResult<()> {
        if !self.active {
            return Err(DomainError::validation(format!(
                "pool {} is deactivated",
                self.id
            )));
        }
        Ok(())
    }

    /// Fails with `InsufficientStock` when `quantity` exceeds the level.
    pub fn ensure_can_supply(&self, quantity: i64) -> DomainResult<()> {
        if quantity > self.level {
            return Err(DomainError::insufficient_stock(self.id, quantity, self.level));
        }
        Ok(())
    }

    /// Level after receiving `quantity`. There is no capacity limit; only
    /// integer overflow is refused.
    pub fn level_after_receiving(&self, quantity: i64) -> DomainResult<i64> {
        self.level
            .checked_add(quantity)
            .ok_or_else(|| {
                DomainError::validation(format!("pool {} level would overflow", self.id))
            })
    }
}

impl Entity for InventoryPool {
    type Id = PoolId;
    const KIND: &'static str = "pool";

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Input for provisioning a pool. New pools start empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPool {
    pub shop_id: ShopId,
    pub name: String,
    pub value: i64,
    pub description: Option<String>,
}

impl NewPool {
    pub fn validate(&self) -> DomainResult<()> {
        validate_name(&self.name)?;
        validate_value(self.value)
    }
}

/// Metadata changes for an existing pool. `None` leaves a field untouched;
/// an empty description clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolUpdate {
    pub name: Option<String>,
    pub value: Option<i64>,
    pub description: Option<String>,
}

impl PoolUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(value) = self.value {
            validate_value(value)?;
        }
        Ok(())
    }

    pub fn apply_to(&self, pool: &mut InventoryPool, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            pool.name = name.trim().to_string();
        }
        if let Some(value) = self.value {
            pool.value = value;
        }
        if let Some(description) = &self.description {
            let trimmed = description.trim();
            pool.description = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
        pool.updated_at = now;
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("pool name cannot be empty"));
    }
    Ok(())
}

fn validate_value(value: i64) -> DomainResult<()> {
    if value < 0 {
        return Err(DomainError::validation("pool value cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(level: i64) -> InventoryPool {
        let now = Utc::now();
        InventoryPool {
            id: PoolId::new(),
            shop_id: ShopId::new(),
            name: "Back room".into(),
            level,
            value: 0,
            description: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn supplying_more_than_level_is_insufficient() {
        let p = pool(10);
        assert!(p.ensure_can_supply(10).is_ok());
        assert_eq!(
            p.ensure_can_supply(15).unwrap_err(),
            DomainError::insufficient_stock(p.id, 15, 10)
        );
    }

    #[test]
    fn receiving_refuses_overflow_only() {
        assert_eq!(pool(5).level_after_receiving(1_000_000).unwrap(), 1_000_005);
        assert!(pool(i64::MAX).level_after_receiving(1).is_err());
    }

    #[test]
    fn deactivated_pool_rejects_work() {
        let mut p = pool(3);
        p.active = false;
        assert!(!p.is_active());
        assert!(matches!(p.ensure_active(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn update_trims_and_clears_description() {
        let mut p = pool(0);
        p.description = Some("old".into());
        let update = PoolUpdate {
            name: Some("  Front shelf ".into()),
            value: Some(900),
            description: Some(String::new()),
        };
        update.validate().unwrap();
        update.apply_to(&mut p, Utc::now());

        assert_eq!(p.name, "Front shelf");
        assert_eq!(p.value, 900);
        assert_eq!(p.description, None);
        assert_eq!(p.level, 0);
    }

    #[test]
    fn new_pool_requires_name_and_non_negative_value() {
        let mut new = NewPool {
            shop_id: ShopId::new(),
            name: " ".into(),
            value: 0,
            description: None,
        };
        assert!(new.validate().is_err());
        new.name = "Warehouse".into();
        new.value = -1;
        assert!(new.validate().is_err());
        new.value = 10;
        assert!(new.validate().is_ok());
    }
}
