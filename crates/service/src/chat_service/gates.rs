//! Per-session request serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async gate per session id. A request holds its session's gate from
/// start to final append, so requests within a session run one at a time
/// while different sessions proceed concurrently.
#[derive(Debug, Default)]
pub(crate) struct SessionGates {
    gates: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SessionGates {
    pub(crate) async fn acquire(&self, session_id: &str) -> OwnedMutexGuard<()> {
        let gate = {
            let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries nobody holds or waits on.
            gates.retain(|_, gate| Arc::strong_count(gate) > 1);
            Arc::clone(gates.entry(session_id.to_owned()).or_default())
        };
        gate.lock_owned().await
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.gates.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_same_session_waits_for_holder() {
        let gates = Arc::new(SessionGates::default());
        let held = gates.acquire("s1").await;

        let waiter = {
            let gates = Arc::clone(&gates);
            tokio::spawn(async move {
                let _guard = gates.acquire("s1").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(held);
        tokio::time::timeout(Duration::from_secs(2), waiter).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_other_sessions_not_blocked() {
        let gates = SessionGates::default();
        let _held = gates.acquire("s1").await;

        let other = tokio::time::timeout(Duration::from_secs(1), gates.acquire("s2")).await;

        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn test_released_gates_are_pruned() {
        let gates = SessionGates::default();
        drop(gates.acquire("a").await);
        drop(gates.acquire("b").await);

        let _held = gates.acquire("c").await;

        assert_eq!(gates.len(), 1);
    }
}
