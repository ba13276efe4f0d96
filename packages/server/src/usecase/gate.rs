//! Delivery gate
//!
//! Room membership changes and room deliveries take this gate, so a session
//! joining a room sees every earlier message in its history replay and every
//! later one live, never both and never neither.

use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct DeliveryGate {
    inner: Mutex<()>,
}

impl DeliveryGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn enter(&self) -> MutexGuard<'_, ()> {
        self.inner.lock().await
    }
}
