//! Admission controller
//!
//! Bounds the number of concurrent sessions with a counting semaphore. The
//! accept loop never waits for a permit: a connection that finds none is
//! rejected.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("all {0} session slots are in use")]
    Full(usize),
}

#[derive(Debug, Clone)]
pub struct AdmissionController {
    permits: Arc<Semaphore>,
    capacity: usize,
}

/// One session slot, returned to the controller when dropped.
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionController {
    pub fn new(capacity: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// 空きがあれば即座に permit を返し、なければ `Full` を返す（待たない）
    pub fn try_admit(&self) -> Result<AdmissionPermit, AdmissionError> {
        self.permits
            .clone()
            .try_acquire_owned()
            .map(|permit| AdmissionPermit { _permit: permit })
            .map_err(|_| AdmissionError::Full(self.capacity))
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
