//! Movement history queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopdesk_core::{DomainError, DomainResult, PoolId, ProductId};

use crate::movement::{MovementType, StockMovement};

/// Upper bound on `limit` for one page.
pub const MAX_PAGE_LIMIT: u32 = 500;

/// Filters for movement history. Every field is optional; all set fields must
/// match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementFilter {
    /// Matches movements where the pool is the source or the destination.
    pub pool_id: Option<PoolId>,
    pub product_id: Option<ProductId>,
    pub movement_type: Option<MovementType>,
    /// Inclusive.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive.
    pub end: Option<DateTime<Utc>>,
}

impl MovementFilter {
    pub fn validate(&self) -> DomainResult<()> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(DomainError::validation("start date is after end date"));
            }
        }
        Ok(())
    }

    /// In-memory equivalent of the SQL filter.
    pub fn matches(&self, movement: &StockMovement) -> bool {
        self.pool_id.is_none_or(|pool| {
            movement.source_pool_id == pool || movement.destination_pool_id == Some(pool)
        }) && self.product_id.is_none_or(|p| movement.product_id == p)
            && self.movement_type.is_none_or(|t| movement.movement_type == t)
            && self.start.is_none_or(|s| movement.created_at >= s)
            && self.end.is_none_or(|e| movement.created_at <= e)
    }
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> DomainResult<Self> {
        let req = Self { page, limit };
        req.validate()?;
        Ok(req)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.page < 1 {
            return Err(DomainError::validation("page must be at least 1"));
        }
        if self.limit < 1 || self.limit > MAX_PAGE_LIMIT {
            return Err(DomainError::validation(format!(
                "limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }
        Ok(())
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// `ceil(total / limit)`, zero for an empty result.
    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit.max(1)))
    }
}

/// One page of movement history, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementPage {
    pub items: Vec<StockMovement>,
    pub total_count: u64,
    pub page_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn page_and_limit_must_be_positive() {
        assert!(PageRequest::new(0, 10).is_err());
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(1, MAX_PAGE_LIMIT + 1).is_err());
        assert_eq!(PageRequest::new(2, 10).unwrap().offset(), 10);
    }

    #[test]
    fn page_count_rounds_up() {
        let req = PageRequest::new(1, 10).unwrap();
        assert_eq!(req.page_count(0), 0);
        assert_eq!(req.page_count(10), 1);
        assert_eq!(req.page_count(25), 3);
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let now = Utc::now();
        let filter = MovementFilter {
            start: Some(now),
            end: Some(now - chrono::Duration::days(1)),
            ..MovementFilter::default()
        };
        assert!(filter.validate().is_err());
    }

    proptest! {
        /// Property: page_count * limit covers total, and one fewer page does not.
        #[test]
        fn page_count_is_ceiling(total in 0u64..100_000, limit in 1u32..=MAX_PAGE_LIMIT) {
            let req = PageRequest::new(1, limit).unwrap();
            let pages = req.page_count(total);
            prop_assert!(pages * u64::from(limit) >= total);
            if pages > 0 {
                prop_assert!((pages - 1) * u64::from(limit) < total);
            }
        }
    }
}
