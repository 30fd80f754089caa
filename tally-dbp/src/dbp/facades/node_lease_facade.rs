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

//! Database facade for operations related to node id reservation.

use crate::tm::NodeLease;
use crate::tm::TelemetryError;

/// Database facade for operations related to node id reservation.
///
/// All three operations run under serializable isolation so that a committed
/// lease row is authoritative: no two live rows can share a node id.
#[async_trait::async_trait]
pub trait NodeLeaseFacade: Send + Sync {
    /// Reserve a random node id for [NodeLease::TTL_NANOS].
    ///
    /// Fails with [TelemetryErrorKind::LeaseConflict] when the sampled node
    /// id is already held by a live lease. The node id space is large
    /// (131072) compared to the expected fleet, so the caller simply retries
    /// with a fresh sample a bounded number of times.
    ///
    /// [TelemetryErrorKind::LeaseConflict]: crate::tm::TelemetryErrorKind::LeaseConflict
    async fn lease_create(&self) -> Result<NodeLease, TelemetryError>;

    /// Push the expiry of `prev` out to now + [NodeLease::TTL_NANOS].
    ///
    /// Fails with [TelemetryErrorKind::LeaseLost] when the row is gone
    /// (already reclaimed) or had lapsed at commit time. Callers must not
    /// attempt to extend a lease whose issuance window has already closed,
    /// i.e. when `prev.expires_at - SAFE_WINDOW < now`.
    ///
    /// [TelemetryErrorKind::LeaseLost]: crate::tm::TelemetryErrorKind::LeaseLost
    async fn lease_extend(&self, prev: &NodeLease) -> Result<NodeLease, TelemetryError>;

    /// Delete every lease row that expired before `cutoff_nanos` and return
    /// the number of reclaimed rows.
    ///
    /// The caller passes `now - SAFE_WINDOW` so that a row is never reclaimed
    /// while a partitioned holder could still be minting inside its already
    /// closed window.
    async fn lease_gc(&self, cutoff_nanos: i64) -> Result<u64, TelemetryError>;
}
