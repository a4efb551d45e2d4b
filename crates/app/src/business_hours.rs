use std::sync::Arc;

use chrono::NaiveDateTime;

use mealtable_core::domain::store::{OperationStatus, Store};

use crate::clock::Clock;

/// Answers "is this store open" against the injected clock.
#[derive(Clone)]
pub struct BusinessHours {
    clock: Arc<dyn Clock>,
}

impl BusinessHours {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn status(&self, store: &Store) -> OperationStatus {
        self.status_at(store, self.clock.now())
    }

    pub fn status_at(&self, store: &Store, at: NaiveDateTime) -> OperationStatus {
        store.operation_status(at)
    }

    pub fn is_open(&self, store: &Store) -> bool {
        self.status(store).is_open
    }
}
