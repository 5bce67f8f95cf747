use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use models::ProductId;

use crate::errors::ServiceError;

/// Time-derived id source.
///
/// Ids are epoch milliseconds, bumped so that every id handed out by one
/// generator is strictly greater than the previous one and than `floor`.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> Result<ProductId, ServiceError> {
        self.next_above(None)
    }

    /// Next id that is also greater than `floor` (the largest id already stored).
    ///
    /// Fails once no id above `floor` or the last issued id fits in a `ProductId`.
    pub fn next_above(&self, floor: Option<ProductId>) -> Result<ProductId, ServiceError> {
        self.next_at(Utc::now().timestamp_millis(), floor)
    }

    fn next_at(&self, now: i64, floor: Option<ProductId>) -> Result<ProductId, ServiceError> {
        let candidate = |prev: i64| {
            let mut id = now.max(prev.checked_add(1)?);
            if let Some(f) = floor {
                id = id.max(f.checked_add(1)?);
            }
            Some(id)
        };
        self.last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, candidate)
            .ok()
            .and_then(candidate)
            .ok_or_else(|| ServiceError::storage("product id space exhausted"))
    }
}
