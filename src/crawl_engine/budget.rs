//! Admission control for the crawl budget.
//!
//! Depth mode needs nothing beyond the depth carried by each task. Limit mode
//! reserves a fetch slot before a fetch is issued: a successful fetch keeps its
//! slot for good, a failed one hands it back. Reserved slots never exceed the
//! limit, so a run never exceeds `limit` successful fetches.

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::config::CrawlBudget;

pub struct BudgetGate {
    slots: Option<Semaphore>,
    limit: Option<usize>,
    consumed: AtomicUsize,
}

/// Outcome of asking for a fetch slot
pub enum Admission<'a> {
    /// Depth mode: nothing to reserve
    Unlimited,
    /// Limit mode: a reserved slot, returned on drop unless committed
    Reserved(FetchSlot<'a>),
    /// The limit has been reached
    Exhausted,
}

impl BudgetGate {
    #[must_use]
    pub fn new(budget: CrawlBudget) -> Self {
        let limit = budget.fetch_limit();
        Self {
            slots: limit.map(|limit| Semaphore::new(limit.min(Semaphore::MAX_PERMITS))),
            limit,
            consumed: AtomicUsize::new(0),
        }
    }

    /// Reserve a fetch slot, waiting while every remaining slot is held by an
    /// in-flight fetch that may still fail.
    pub async fn admit(&self) -> Admission<'_> {
        let Some(slots) = &self.slots else {
            return Admission::Unlimited;
        };

        match slots.acquire().await {
            Ok(permit) => Admission::Reserved(FetchSlot {
                gate: self,
                permit: Some(permit),
            }),
            Err(_) => Admission::Exhausted,
        }
    }

    /// Wake every waiter with `Exhausted`
    pub fn close(&self) {
        if let Some(slots) = &self.slots {
            slots.close();
        }
    }

    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Slots spent on successful fetches
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.consumed.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.limit.is_some_and(|limit| self.consumed() >= limit)
    }
}

/// A reserved fetch slot
pub struct FetchSlot<'a> {
    gate: &'a BudgetGate,
    permit: Option<SemaphorePermit<'a>>,
}

impl FetchSlot<'_> {
    /// Keep the slot after a successful fetch.
    ///
    /// Returns true when this commit spent the last slot.
    pub fn commit(mut self) -> bool {
        if let Some(permit) = self.permit.take() {
            permit.forget();
        }
        let consumed = self.gate.consumed.fetch_add(1, Ordering::AcqRel) + 1;
        let spent = self.gate.limit.is_some_and(|limit| consumed >= limit);
        if spent {
            self.gate.close();
        }
        spent
    }
}
