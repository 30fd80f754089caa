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

//! MySQL implementation of [ConnectivityFacade].

use crate::MysqlProvider;
use std::sync::Arc;
use tally_dbp::dbp::facades::ConnectivityFacade;
use tally_dbp::tm::TelemetryError;
use tally_dbp::tm::TelemetryErrorKind;

/// MySQL implementation of [ConnectivityFacade].
pub struct MysqlConnectivityFacade {
    mysql_provider: Arc<MysqlProvider>,
}

impl MysqlConnectivityFacade {
    /// Return a new instance.
    pub fn new(mysql_provider: &Arc<MysqlProvider>) -> Self {
        Self {
            mysql_provider: Arc::clone(mysql_provider),
        }
    }
}

#[async_trait::async_trait]
impl ConnectivityFacade for MysqlConnectivityFacade {
    async fn ping(&self) -> Result<(), TelemetryError> {
        let mut tx = self
            .mysql_provider
            .pool
            .begin()
            .await
            .map_err(MysqlProvider::db_error)?;
        let echo: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&mut *tx)
            .await
            .map_err(MysqlProvider::db_error)?;
        if echo != 1 {
            return Err(TelemetryErrorKind::UnexpectedPingResult
                .error_with_msg(format!("SELECT 1 returned {echo}.")));
        }
        tx.commit().await.map_err(MysqlProvider::db_error)
    }
}
