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

//! MySQL implementation of [ClientFacade].

use crate::MysqlProvider;
use std::sync::Arc;
use tally_dbp::dbp::facades::ClientFacade;
use tally_dbp::time::get_timestamp_nanos;
use tally_dbp::tm::FingerprintRecord;
use tally_dbp::tm::TelemetryError;

/// MySQL implementation of [ClientFacade].
pub struct MysqlClientFacade {
    mysql_provider: Arc<MysqlProvider>,
}

impl MysqlClientFacade {
    /// Return a new instance.
    pub fn new(mysql_provider: &Arc<MysqlProvider>) -> Self {
        Self {
            mysql_provider: Arc::clone(mysql_provider),
        }
    }
}

#[async_trait::async_trait]
impl ClientFacade for MysqlClientFacade {
    async fn client_register(&self, client_id: i64, token: &str) -> Result<(), TelemetryError> {
        sqlx::query("INSERT INTO client (id, token, created_at) VALUES (?, ?, ?)")
            .bind(client_id)
            .bind(token)
            .bind(get_timestamp_nanos())
            .execute(&self.mysql_provider.pool)
            .await
            .map_err(MysqlProvider::db_error)?;
        Ok(())
    }

    async fn client_verify_token(
        &self,
        client_id: i64,
        token: &str,
    ) -> Result<bool, TelemetryError> {
        let matches: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM client WHERE id = ? AND token = ?")
                .bind(client_id)
                .bind(token)
                .fetch_one(&self.mysql_provider.pool)
                .await
                .map_err(MysqlProvider::db_error)?;
        Ok(matches == 1)
    }

    async fn fingerprint_register(
        &self,
        fingerprint: FingerprintRecord,
    ) -> Result<(), TelemetryError> {
        sqlx::query(
            "INSERT INTO client_fingerprint \
             (id, client_id, fp_version, fp_hash, user_agent, user_agent_data, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(fingerprint.id)
        .bind(fingerprint.client_id)
        .bind(fingerprint.fp_version)
        .bind(fingerprint.fp_hash)
        .bind(fingerprint.user_agent)
        .bind(fingerprint.user_agent_data)
        .bind(fingerprint.created_at_nanos)
        .execute(&self.mysql_provider.pool)
        .await
        .map_err(MysqlProvider::db_error)?;
        Ok(())
    }
}
