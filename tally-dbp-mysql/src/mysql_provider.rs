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

//! MySQL implementation of [DatabaseProvider].

mod mysql_facades;
mod mysql_schema;

use self::mysql_facades::MysqlProviderFacades;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlConnectOptions;
use sqlx::mysql::MySqlPoolOptions;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tally_dbp::dbp::DatabaseProvider;
use tally_dbp::tm::TelemetryError;
use tally_dbp::tm::TelemetryErrorKind;

/// MySQL implementation of [DatabaseProvider].
///
/// Every pooled connection runs at SERIALIZABLE isolation, so a row observed
/// inside any transaction of this provider is authoritative.
pub struct MysqlProvider {
    pub(crate) pool: MySqlPool,
}

impl MysqlProvider {
    /// Connect, apply pool limits and bootstrap the schema.
    ///
    /// A zero `max_open_conns` or `conn_max_lifetime_secs` means
    /// "driver default/unbounded", matching the usual SQL pool semantics.
    pub async fn new(
        dsn: &str,
        conn_max_idle_time_secs: u64,
        conn_max_lifetime_secs: u64,
        max_idle_conns: u32,
        max_open_conns: u32,
    ) -> Result<Arc<Self>, TelemetryError> {
        let connect_options = MySqlConnectOptions::from_str(dsn).map_err(|e| {
            TelemetryErrorKind::Unspecified.error_with_msg(format!("Malformed DSN: {e}"))
        })?;
        let mut pool_options = MySqlPoolOptions::new()
            .min_connections(max_idle_conns)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("SET SESSION TRANSACTION ISOLATION LEVEL SERIALIZABLE")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            });
        if max_open_conns > 0 {
            pool_options = pool_options.max_connections(max_open_conns);
        }
        if conn_max_idle_time_secs > 0 {
            pool_options = pool_options.idle_timeout(Duration::from_secs(conn_max_idle_time_secs));
        }
        if conn_max_lifetime_secs > 0 {
            pool_options = pool_options.max_lifetime(Duration::from_secs(conn_max_lifetime_secs));
        }
        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(Self::db_error)?;
        log::debug!("Connected to MySQL backend.");
        let provider = Arc::new(Self { pool });
        mysql_schema::ensure_schema(&provider).await?;
        Ok(provider)
    }

    /// Get [DatabaseProvider] instance.
    pub fn as_database_provider(self: &Arc<Self>) -> DatabaseProvider {
        DatabaseProvider::new(Arc::new(MysqlProviderFacades::new(self)))
    }

    /// Wrap a driver error into the service error type.
    pub(crate) fn db_error(e: sqlx::Error) -> TelemetryError {
        TelemetryErrorKind::Unspecified.error_with_msg(format!("Database error: {e}"))
    }

    /// Return `true` when the driver reported a duplicate-key insert.
    pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
        if let sqlx::Error::Database(db_error) = e {
            db_error.is_unique_violation()
        } else {
            false
        }
    }
}
