//! InMemory Client Registry 実装
//!
//! 表示名の重複判定は登録と同じクリティカルセクション内で行うため、
//! 同じ名前を同時に要求した 2 つのセッションが両方ともその名前を得ることはありません。

use std::collections::HashMap;

use async_trait::async_trait;
use rand::{Rng, seq::SliceRandom};
use tokio::sync::Mutex;

use crate::domain::{ClientRepository, DisplayName, RegistryError, SessionId};

/// Minimum number of characters (after trimming) for a name at registration.
pub const MIN_NAME_CHARS: usize = 3;

/// インメモリ Client Registry 実装
#[derive(Default)]
pub struct InMemoryClientRepository {
    /// Key: session, Value: current display name
    names: Mutex<HashMap<SessionId, DisplayName>>,
}

impl InMemoryClientRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Pick a name not currently held by anyone.
///
/// Tries `name` itself, then `name` followed by each digit in random order.
/// If all ten are taken, a random digit is appended and the search repeats.
fn resolve_unique_name(names: &HashMap<SessionId, DisplayName>, name: DisplayName) -> DisplayName {
    let is_taken = |candidate: &DisplayName| names.values().any(|held| held == candidate);
    if !is_taken(&name) {
        return name;
    }

    let mut rng = rand::thread_rng();
    let mut base = name;
    loop {
        let mut digits: Vec<u8> = (0..10).collect();
        digits.shuffle(&mut rng);
        for digit in digits {
            let candidate = base.with_suffix(&digit.to_string());
            if !is_taken(&candidate) {
                return candidate;
            }
        }
        base = base.with_suffix(&rng.gen_range(0..10u8).to_string());
    }
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn register(
        &self,
        session_id: SessionId,
        requested: &str,
    ) -> Result<DisplayName, RegistryError> {
        let trimmed = requested.trim();
        if trimmed.chars().count() < MIN_NAME_CHARS {
            return Err(RegistryError::NameTooShort(trimmed.to_string()));
        }
        let requested = DisplayName::new(trimmed)?;

        let mut names = self.names.lock().await;
        names.remove(&session_id);
        let final_name = resolve_unique_name(&names, requested);
        names.insert(session_id, final_name.clone());
        tracing::debug!("Session {} registered as '{}'", session_id, final_name);

        Ok(final_name)
    }

    async fn rename(
        &self,
        session_id: SessionId,
        new_name: DisplayName,
    ) -> Result<(DisplayName, DisplayName), RegistryError> {
        let mut names = self.names.lock().await;
        let current = names
            .get_mut(&session_id)
            .ok_or(RegistryError::NotRegistered)?;
        let old_name = std::mem::replace(current, new_name.clone());

        Ok((old_name, new_name))
    }

    async fn unregister(&self, session_id: SessionId) -> Option<DisplayName> {
        let mut names = self.names.lock().await;
        let removed = names.remove(&session_id);
        if let Some(name) = &removed {
            tracing::debug!("Session {} ('{}') unregistered", session_id, name);
        }
        removed
    }

    async fn name_of(&self, session_id: SessionId) -> Option<DisplayName> {
        let names = self.names.lock().await;
        names.get(&session_id).cloned()
    }

    async fn list_names(&self) -> Vec<DisplayName> {
        let names = self.names.lock().await;
        let mut list: Vec<DisplayName> = names.values().cloned().collect();
        list.sort();
        list
    }
}
