/*
    Copyright 2025 MydriaTech AB

    Licensed under the Apache License 2.0 with Free world makers exception
    1.0.0 (the "License"); you may not use this file except in compliance with
    the License. You should have obtained a copy of the License with the source
    or binary distribution in file named

        LICENSE-Apache-2.0-with-FWM-Exception-1.0.0

    Unless required by applicable law or agreed to in writing, software
    distributed under the License is distributed on an "AS IS" BASIS,
    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
    See the License for the specific language governing permissions and
    limitations under the License.
*/

//! Ephemeral in-memory implementation of [NodeLeaseFacade].

use crate::InMemoryDatabaseProvider;
use rand::Rng;
use std::sync::Arc;
use tally_dbp::dbp::facades::NodeLeaseFacade;
use tally_dbp::time::get_timestamp_nanos;
use tally_dbp::tm::NodeLease;
use tally_dbp::tm::TelemetryError;
use tally_dbp::tm::TelemetryErrorKind;
use uuid::Uuid;

/// Ephemeral in-memory implementation of [NodeLeaseFacade].
///
/// The whole lease table sits behind one mutex, which is trivially as strong
/// as the serializable isolation the real backends provide.
pub struct InMemNodeLeaseFacade {
    inmem_provider: Arc<InMemoryDatabaseProvider>,
}

impl InMemNodeLeaseFacade {
    /// Return a new instance.
    pub fn new(inmem_provider: &Arc<InMemoryDatabaseProvider>) -> Self {
        Self {
            inmem_provider: Arc::clone(inmem_provider),
        }
    }

    /// Insert a lease row for `node_id` unless a live one already holds it.
    fn create_with_node_id(&self, node_id: i64) -> Result<NodeLease, TelemetryError> {
        let now = get_timestamp_nanos();
        let mut leases = self.inmem_provider.leases.lock().unwrap();
        if leases
            .values()
            .any(|lease| lease.node_id() == node_id && lease.is_live(now))
        {
            return Err(TelemetryErrorKind::LeaseConflict
                .error_with_msg(format!("Node id {node_id} is held by a live lease.")));
        }
        let lease = NodeLease::new(Uuid::now_v7(), node_id, now, now + NodeLease::TTL_NANOS);
        leases.insert(lease.lease_id(), lease.clone());
        Ok(lease)
    }
}

#[async_trait::async_trait]
impl NodeLeaseFacade for InMemNodeLeaseFacade {
    async fn lease_create(&self) -> Result<NodeLease, TelemetryError> {
        let node_id = rand::rng().random_range(0..=NodeLease::MAX_NODE_ID);
        self.create_with_node_id(node_id)
    }

    async fn lease_extend(&self, prev: &NodeLease) -> Result<NodeLease, TelemetryError> {
        let now = get_timestamp_nanos();
        let mut leases = self.inmem_provider.leases.lock().unwrap();
        match leases.get_mut(&prev.lease_id()) {
            Some(row) if row.is_live(now) => {
                *row = row.with_expiry(now + NodeLease::TTL_NANOS);
                Ok(row.clone())
            }
            _ => Err(TelemetryErrorKind::LeaseLost.error_with_msg(format!(
                "Lease {} is gone or lapsed and cannot be extended.",
                prev.lease_id()
            ))),
        }
    }

    async fn lease_gc(&self, cutoff_nanos: i64) -> Result<u64, TelemetryError> {
        let mut leases = self.inmem_provider.leases.lock().unwrap();
        let before = leases.len();
        leases.retain(|_, lease| lease.expires_at_nanos() >= cutoff_nanos);
        Ok(u64::try_from(before - leases.len()).unwrap_or(0))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    async fn facade() -> InMemNodeLeaseFacade {
        InMemNodeLeaseFacade::new(&InMemoryDatabaseProvider::new().await)
    }

    #[tokio::test]
    async fn live_leases_never_share_a_node_id() {
        let facade = facade().await;
        let mut seen = std::collections::HashSet::new();
        for _ in 0..256 {
            if let Ok(lease) = facade.lease_create().await {
                assert!(
                    seen.insert(lease.node_id()),
                    "two live leases share node id {}",
                    lease.node_id()
                );
            }
        }
    }

    #[tokio::test]
    async fn create_conflicts_on_held_node_id() {
        let facade = facade().await;
        let lease = facade.create_with_node_id(17).unwrap();
        let conflict = facade.create_with_node_id(17).unwrap_err();
        assert_eq!(conflict.kind(), &TelemetryErrorKind::LeaseConflict);
        assert!(lease.is_live(get_timestamp_nanos()));
    }

    #[tokio::test]
    async fn extend_moves_expiry_and_keeps_identity() {
        let facade = facade().await;
        let lease = facade.lease_create().await.unwrap();
        let extended = facade.lease_extend(&lease).await.unwrap();
        assert_eq!(extended.lease_id(), lease.lease_id());
        assert_eq!(extended.node_id(), lease.node_id());
        assert_eq!(extended.created_at_nanos(), lease.created_at_nanos());
        assert!(extended.expires_at_nanos() >= lease.expires_at_nanos());
    }

    #[tokio::test]
    async fn extend_fails_after_row_is_reclaimed() {
        let facade = facade().await;
        let lease = facade.lease_create().await.unwrap();
        // Force reclamation with a cutoff beyond the lease expiry.
        let reclaimed = facade
            .lease_gc(lease.expires_at_nanos() + 1)
            .await
            .unwrap();
        assert_eq!(reclaimed, 1);
        let lost = facade.lease_extend(&lease).await.unwrap_err();
        assert_eq!(lost.kind(), &TelemetryErrorKind::LeaseLost);
    }

    #[tokio::test]
    async fn gc_spares_rows_inside_the_safe_window() {
        let facade = facade().await;
        let lease = facade.lease_create().await.unwrap();
        let reclaimed = facade
            .lease_gc(get_timestamp_nanos() - NodeLease::SAFE_WINDOW_NANOS)
            .await
            .unwrap();
        assert_eq!(reclaimed, 0);
        assert!(facade.lease_extend(&lease).await.is_ok());
    }
}
