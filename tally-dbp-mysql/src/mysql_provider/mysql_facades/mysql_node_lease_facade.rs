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

//! MySQL implementation of [NodeLeaseFacade].

use crate::MysqlProvider;
use rand::Rng;
use std::sync::Arc;
use tally_dbp::dbp::facades::NodeLeaseFacade;
use tally_dbp::time::get_timestamp_nanos;
use tally_dbp::tm::NodeLease;
use tally_dbp::tm::TelemetryError;
use tally_dbp::tm::TelemetryErrorKind;
use uuid::Uuid;

/// MySQL implementation of [NodeLeaseFacade].
pub struct MysqlNodeLeaseFacade {
    mysql_provider: Arc<MysqlProvider>,
}

impl MysqlNodeLeaseFacade {
    /// Return a new instance.
    pub fn new(mysql_provider: &Arc<MysqlProvider>) -> Self {
        Self {
            mysql_provider: Arc::clone(mysql_provider),
        }
    }

    /// Insert a lease row for `node_id` unless a live one already holds it.
    ///
    /// The liveness probe and the insert share one serializable transaction,
    /// so two racing creators cannot both commit the same node id.
    async fn create_with_node_id(&self, node_id: i64) -> Result<NodeLease, TelemetryError> {
        let now = get_timestamp_nanos();
        let lease = NodeLease::new(Uuid::now_v7(), node_id, now, now + NodeLease::TTL_NANOS);
        let mut tx = self
            .mysql_provider
            .pool
            .begin()
            .await
            .map_err(MysqlProvider::db_error)?;
        let held: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM node_lease WHERE node_id = ? AND expires_at > ?",
        )
        .bind(node_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(MysqlProvider::db_error)?;
        if held > 0 {
            // Dropping the transaction rolls it back.
            return Err(TelemetryErrorKind::LeaseConflict
                .error_with_msg(format!("Node id {node_id} is held by a live lease.")));
        }
        sqlx::query("INSERT INTO node_lease (uuid, node_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
            .bind(lease.lease_id().as_bytes().to_vec())
            .bind(lease.node_id())
            .bind(lease.created_at_nanos())
            .bind(lease.expires_at_nanos())
            .execute(&mut *tx)
            .await
            .map_err(MysqlProvider::db_error)?;
        tx.commit().await.map_err(MysqlProvider::db_error)?;
        Ok(lease)
    }
}

#[async_trait::async_trait]
impl NodeLeaseFacade for MysqlNodeLeaseFacade {
    async fn lease_create(&self) -> Result<NodeLease, TelemetryError> {
        let node_id = rand::rng().random_range(0..=NodeLease::MAX_NODE_ID);
        self.create_with_node_id(node_id).await
    }

    async fn lease_extend(&self, prev: &NodeLease) -> Result<NodeLease, TelemetryError> {
        let now = get_timestamp_nanos();
        let expires_at = now + NodeLease::TTL_NANOS;
        let mut tx = self
            .mysql_provider
            .pool
            .begin()
            .await
            .map_err(MysqlProvider::db_error)?;
        let updated =
            sqlx::query("UPDATE node_lease SET expires_at = ? WHERE uuid = ? AND expires_at > ?")
                .bind(expires_at)
                .bind(prev.lease_id().as_bytes().to_vec())
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(MysqlProvider::db_error)?
                .rows_affected();
        if updated == 0 {
            return Err(TelemetryErrorKind::LeaseLost.error_with_msg(format!(
                "Lease {} is gone or lapsed and cannot be extended.",
                prev.lease_id()
            )));
        }
        tx.commit().await.map_err(MysqlProvider::db_error)?;
        Ok(prev.with_expiry(expires_at))
    }

    async fn lease_gc(&self, cutoff_nanos: i64) -> Result<u64, TelemetryError> {
        Ok(sqlx::query("DELETE FROM node_lease WHERE expires_at < ?")
            .bind(cutoff_nanos)
            .execute(&self.mysql_provider.pool)
            .await
            .map_err(MysqlProvider::db_error)?
            .rows_affected())
    }
}
