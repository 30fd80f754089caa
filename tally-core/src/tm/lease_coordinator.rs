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

//! Keep this instance's exclusive ID issuance slice alive.

use super::randflake_generator::RandflakeGenerator;
use std::sync::Arc;
use std::sync::RwLock;
use tally_dbp::dbp::DatabaseProvider;
use tally_dbp::dbp::facades::DatabaseProviderFacades;
use tally_dbp::time::get_timestamp_nanos;
use tally_dbp::tm::NodeLease;
use tally_dbp::tm::TelemetryError;
use tally_dbp::tm::TelemetryErrorKind;
use tokio::sync::watch;
use tokio::time::Duration;
use tokio::time::sleep;
use tokio::time::timeout;

/** Keep this instance's exclusive ID issuance slice alive.

Owns the process's node lease and the [RandflakeGenerator] bound to it. A
background worker re-evaluates the lease every tick:

- lapsed lease: acquire a fresh one and replace the generator, since the
  node id may change;
- lease inside the renewal window: extend it and install the pushed-out
  window on the existing generator in place;
- otherwise: idle.

After the lease decision the worker garbage-collects lease rows that have
been expired for longer than the safety padding. A failed extension or
re-acquisition is retried on the next tick; the generator simply refuses to
mint once its window closes, so a coordinator that keeps failing goes quiet
instead of risking duplicate identifiers.
*/
pub struct LeaseCoordinator {
    /// See [DatabaseProvider].
    dbp: Arc<DatabaseProvider>,
    /// Key for the ID permutation, shared by the whole fleet.
    secret_key: [u8; 16],
    /// The lease this instance currently holds.
    lease: RwLock<NodeLease>,
    /// The generator minting under [Self::lease]. Replaced wholesale on
    /// re-acquisition; handlers pick up the replacement on their next call.
    generator: RwLock<Arc<RandflakeGenerator>>,
    /// Closed on shutdown to stop the background worker.
    stop_tx: watch::Sender<bool>,
}

impl LeaseCoordinator {
    /// Time between lease re-evaluations.
    const TICK_INTERVAL: Duration = Duration::from_secs(30);
    /// Extension starts once less than this much lease lifetime remains:
    /// 8 minutes of the 10 minute TTL.
    const RENEW_WINDOW_NANOS: i64 = 480 * 1_000_000_000;
    /// Upper bound on one extension round-trip.
    const EXTEND_TIMEOUT: Duration = Duration::from_secs(10);
    /// Bounded number of create attempts during startup.
    const CREATE_ATTEMPTS: usize = 3;

    /// Ping the persistence layer, acquire the initial lease and start the
    /// background worker.
    ///
    /// Fails when the backend is unreachable or when no lease could be
    /// created within [Self::CREATE_ATTEMPTS] attempts. Both are fatal for
    /// startup: without a lease this instance must not mint identifiers.
    pub async fn new(
        dbp: &Arc<DatabaseProvider>,
        secret_key: [u8; 16],
    ) -> Result<Arc<Self>, TelemetryError> {
        log::debug!("Pinging the persistence backend.");
        dbp.connectivity_facade().ping().await?;
        let mut lease_opt = None;
        for attempt in 1..=Self::CREATE_ATTEMPTS {
            match dbp.node_lease_facade().lease_create().await {
                Ok(lease) => {
                    lease_opt = Some(lease);
                    break;
                }
                Err(e) => {
                    log::error!("Failed to create node lease (attempt {attempt}): {e}");
                }
            }
        }
        let Some(lease) = lease_opt else {
            return Err(TelemetryErrorKind::Unspecified.error_with_msg(format!(
                "Gave up creating a node lease after {} attempts.",
                Self::CREATE_ATTEMPTS
            )));
        };
        log::debug!(
            "Created node lease {} for node id {} expiring at {}.",
            lease.lease_id(),
            lease.node_id(),
            lease.expires_at_nanos()
        );
        let generator = Arc::new(RandflakeGenerator::new(
            lease.node_id(),
            lease.window_start_secs(),
            lease.window_end_secs(),
            &secret_key,
        )?);
        let (stop_tx, stop_rx) = watch::channel(false);
        Ok(Arc::new(Self {
            dbp: Arc::clone(dbp),
            secret_key,
            lease: RwLock::new(lease),
            generator: RwLock::new(generator),
            stop_tx,
        })
        .initialize(stop_rx))
    }

    /// Initialize
    fn initialize(self: Arc<Self>, stop_rx: watch::Receiver<bool>) -> Arc<Self> {
        let self_clone = Arc::clone(&self);
        tokio::spawn(async move { self_clone.run_lease_worker(stop_rx).await });
        self
    }

    /// Mint the next identifier under the current lease.
    pub fn generate_id(&self) -> Result<i64, TelemetryError> {
        // Clone out of the lock so a slow mint never blocks a generator swap.
        let generator = Arc::clone(&self.generator.read().unwrap());
        generator.generate()
    }

    /// Mint the next identifier in its textual form.
    pub fn generate_id_string(&self) -> Result<String, TelemetryError> {
        let generator = Arc::clone(&self.generator.read().unwrap());
        generator.generate_string()
    }

    /// Signal the background worker to stop.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Background loop driving renewal, re-acquisition and GC.
    async fn run_lease_worker(&self, mut stop_rx: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                _ = sleep(Self::TICK_INTERVAL) => self.tick().await,
                _ = stop_rx.changed() => {
                    log::debug!("Lease worker stopping.");
                    return;
                }
            }
        }
    }

    /// One lease re-evaluation pass.
    pub(crate) async fn tick(&self) {
        let prev = self.lease.read().unwrap().clone();
        let now = get_timestamp_nanos();
        if now > prev.expires_at_nanos() {
            log::error!(
                "Node lease {} expired. Trying to acquire a fresh one.",
                prev.lease_id()
            );
            self.reacquire().await;
        } else if now > prev.expires_at_nanos() - Self::RENEW_WINDOW_NANOS {
            if prev.expires_at_nanos() - NodeLease::SAFE_WINDOW_NANOS < now {
                // Too close to expiry to extend safely. The generator window
                // has already closed; wait for expiry and re-acquire.
                log::warn!(
                    "Node lease {} is inside the safety padding and will be replaced after expiry.",
                    prev.lease_id()
                );
            } else {
                self.extend(&prev).await;
            }
        }
        match self
            .dbp
            .node_lease_facade()
            .lease_gc(now - NodeLease::SAFE_WINDOW_NANOS)
            .await
        {
            Ok(reclaimed) => {
                if reclaimed > 0 && log::log_enabled!(log::Level::Debug) {
                    log::debug!("Lease GC reclaimed {reclaimed} row(s).");
                }
            }
            Err(e) => {
                // GC is retried next tick and never affects the local lease.
                log::error!("Lease GC failed: {e}");
            }
        }
    }

    /// Acquire a fresh lease and replace the generator.
    async fn reacquire(&self) {
        match self.dbp.node_lease_facade().lease_create().await {
            Ok(lease) => {
                match RandflakeGenerator::new(
                    lease.node_id(),
                    lease.window_start_secs(),
                    lease.window_end_secs(),
                    &self.secret_key,
                ) {
                    Ok(generator) => {
                        log::debug!(
                            "Created node lease {} for node id {} expiring at {}.",
                            lease.lease_id(),
                            lease.node_id(),
                            lease.expires_at_nanos()
                        );
                        *self.lease.write().unwrap() = lease;
                        *self.generator.write().unwrap() = Arc::new(generator);
                    }
                    Err(e) => {
                        log::error!("Failed to construct a generator for the fresh lease: {e}");
                    }
                }
            }
            Err(e) => {
                // Retried next tick. Requests keep failing until then.
                log::error!("Failed to re-acquire a node lease: {e}");
            }
        }
    }

    /// Extend the held lease and install the new window in place.
    async fn extend(&self, prev: &NodeLease) {
        let extend_call = self.dbp.node_lease_facade().lease_extend(prev);
        match timeout(Self::EXTEND_TIMEOUT, extend_call).await {
            Ok(Ok(lease)) => {
                self.generator
                    .read()
                    .unwrap()
                    .update_lease(lease.window_start_secs(), lease.window_end_secs());
                log::debug!(
                    "Extended node lease {} to expire at {}.",
                    lease.lease_id(),
                    lease.expires_at_nanos()
                );
                *self.lease.write().unwrap() = lease;
            }
            Ok(Err(e)) => {
                // Retried next tick while the current lease is still live.
                log::error!("Failed to extend node lease {}: {e}", prev.lease_id());
            }
            Err(_) => {
                log::error!(
                    "Extension of node lease {} timed out after {:?}.",
                    prev.lease_id(),
                    Self::EXTEND_TIMEOUT
                );
            }
        }
    }

    /// Snapshot of the currently held lease.
    pub fn current_lease(&self) -> NodeLease {
        self.lease.read().unwrap().clone()
    }

    /// Pretend the held lease has lapsed, so the next tick re-acquires.
    #[cfg(test)]
    pub(crate) fn force_expire(&self) {
        let mut lease = self.lease.write().unwrap();
        *lease = lease.with_expiry(get_timestamp_nanos() - 1);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tally_dbp_mem::InMemoryDatabaseProvider;

    const KEY: [u8; 16] = *b"0123456789abcdef";

    async fn coordinator_with_mem_store() -> (Arc<DatabaseProvider>, Arc<LeaseCoordinator>) {
        let dbp = Arc::new(
            InMemoryDatabaseProvider::new()
                .await
                .as_database_provider(),
        );
        let lease_coordinator = LeaseCoordinator::new(&dbp, KEY).await.unwrap();
        (dbp, lease_coordinator)
    }

    #[tokio::test]
    async fn startup_acquires_a_live_lease_and_mints() {
        let (_dbp, coordinator) = coordinator_with_mem_store().await;
        let lease = coordinator.current_lease();
        assert!(lease.is_live(get_timestamp_nanos()));
        let id = coordinator.generate_id().unwrap();
        assert!(id >= 0);
        assert_eq!(
            coordinator.generate_id_string().unwrap().len(),
            tally_dbp::tm::RandflakeId::ENCODED_WIDTH
        );
        coordinator.stop();
    }

    #[tokio::test]
    async fn tick_extends_nothing_while_the_lease_is_fresh() {
        let (_dbp, coordinator) = coordinator_with_mem_store().await;
        let before = coordinator.current_lease();
        coordinator.tick().await;
        assert_eq!(coordinator.current_lease(), before);
        coordinator.stop();
    }

    #[tokio::test]
    async fn reacquire_after_expiry_replaces_lease_and_keeps_ids_unique() {
        let (_dbp, coordinator) = coordinator_with_mem_store().await;
        let mut seen = std::collections::HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(coordinator.generate_id().unwrap()));
        }
        let old_lease = coordinator.current_lease();
        coordinator.force_expire();
        coordinator.tick().await;
        let new_lease = coordinator.current_lease();
        assert_ne!(new_lease.lease_id(), old_lease.lease_id());
        assert!(new_lease.is_live(get_timestamp_nanos()));
        for _ in 0..10_000 {
            assert!(
                seen.insert(coordinator.generate_id().unwrap()),
                "id minted twice across a lease hand-over"
            );
        }
        coordinator.stop();
    }

    #[tokio::test]
    async fn concurrent_coordinators_hold_distinct_node_ids() {
        let dbp = Arc::new(
            InMemoryDatabaseProvider::new()
                .await
                .as_database_provider(),
        );
        let mut coordinators = Vec::new();
        for _ in 0..32 {
            coordinators.push(LeaseCoordinator::new(&dbp, KEY).await.unwrap());
        }
        let mut node_ids = std::collections::HashSet::new();
        for coordinator in &coordinators {
            assert!(
                node_ids.insert(coordinator.current_lease().node_id()),
                "two live coordinators share a node id"
            );
            coordinator.stop();
        }
    }

    #[tokio::test]
    async fn gc_leaves_the_live_lease_alone() {
        let (dbp, coordinator) = coordinator_with_mem_store().await;
        coordinator.tick().await;
        let lease = coordinator.current_lease();
        assert!(
            dbp.node_lease_facade().lease_extend(&lease).await.is_ok(),
            "the held lease row should have survived GC"
        );
        coordinator.stop();
    }
}
