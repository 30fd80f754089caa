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

//! Time-bounded exclusive node id reservations.

use uuid::Uuid;

/** A time-bounded exclusive reservation of one node id.

While a lease is live (`now < expires_at`), no other process may hold the
same node id. The ID generator fed by a lease must stop minting
[NodeLease::SAFE_WINDOW_NANOS] before the lease expires, and the garbage
collector must wait the same padding after expiry before reclaiming the row.
Together the two paddings keep a stalled holder and its successor from ever
minting inside overlapping (node id, window) slices.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeLease {
    /// Version 7 UUID identifying this reservation.
    lease_id: Uuid,
    /// The reserved node id in `[0, 2^17)`.
    node_id: i64,
    /// Epoch nanoseconds when the reservation was created.
    created_at_nanos: i64,
    /// Epoch nanoseconds when the reservation lapses.
    expires_at_nanos: i64,
}

impl NodeLease {
    /// Bits of the node id space leases are drawn from.
    pub const NODE_ID_BITS: u32 = 17;
    /// The highest node id a lease can reserve.
    pub const MAX_NODE_ID: i64 = (1 << Self::NODE_ID_BITS) - 1;
    /// How long a fresh or extended reservation lives: 10 minutes.
    pub const TTL_NANOS: i64 = 600 * 1_000_000_000;
    /// Clock skew padding: 30 seconds.
    pub const SAFE_WINDOW_NANOS: i64 = 30 * 1_000_000_000;

    /// Return a new instance.
    pub fn new(lease_id: Uuid, node_id: i64, created_at_nanos: i64, expires_at_nanos: i64) -> Self {
        Self {
            lease_id,
            node_id,
            created_at_nanos,
            expires_at_nanos,
        }
    }

    /// Get the reservation identifier.
    pub fn lease_id(&self) -> Uuid {
        self.lease_id
    }

    /// Get the reserved node id.
    pub fn node_id(&self) -> i64 {
        self.node_id
    }

    /// Get the creation time in epoch nanoseconds.
    pub fn created_at_nanos(&self) -> i64 {
        self.created_at_nanos
    }

    /// Get the expiry time in epoch nanoseconds.
    pub fn expires_at_nanos(&self) -> i64 {
        self.expires_at_nanos
    }

    /// Return `true` while the reservation has not lapsed.
    pub fn is_live(&self, now_nanos: i64) -> bool {
        now_nanos < self.expires_at_nanos
    }

    /// Opening second of the ID issuance window granted by this lease.
    pub fn window_start_secs(&self) -> i64 {
        self.created_at_nanos / 1_000_000_000
    }

    /// Closing second of the ID issuance window granted by this lease.
    ///
    /// Pinned [Self::SAFE_WINDOW_NANOS] before expiry so that every minted ID
    /// still has wall-clock headroom under the live lease.
    pub fn window_end_secs(&self) -> i64 {
        (self.expires_at_nanos - Self::SAFE_WINDOW_NANOS) / 1_000_000_000
    }

    /// Return a copy with a later expiry, as produced by a successful extend.
    pub fn with_expiry(&self, expires_at_nanos: i64) -> Self {
        Self {
            expires_at_nanos,
            ..self.clone()
        }
    }
}
