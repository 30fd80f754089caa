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

//! MySQL implementation of [UrlFacade].

use crate::MysqlProvider;
use std::sync::Arc;
use tally_dbp::dbp::facades::UrlFacade;
use tally_dbp::time::get_timestamp_nanos;
use tally_dbp::tm::TelemetryError;
use tally_dbp::tm::UrlRecord;

/// MySQL implementation of [UrlFacade].
pub struct MysqlUrlFacade {
    mysql_provider: Arc<MysqlProvider>,
}

impl MysqlUrlFacade {
    /// Return a new instance.
    pub fn new(mysql_provider: &Arc<MysqlProvider>) -> Self {
        Self {
            mysql_provider: Arc::clone(mysql_provider),
        }
    }
}

#[async_trait::async_trait]
impl UrlFacade for MysqlUrlFacade {
    async fn url_by_normalized(&self, url: &str) -> Result<Option<UrlRecord>, TelemetryError> {
        Ok(sqlx::query_as::<_, (i64, String, i64)>(
            "SELECT id, url, created_at FROM url WHERE url = ?",
        )
        .bind(url)
        .fetch_optional(&self.mysql_provider.pool)
        .await
        .map_err(MysqlProvider::db_error)?
        .map(|(id, url, created_at_nanos)| UrlRecord {
            id,
            url,
            created_at_nanos,
        }))
    }

    async fn url_insert(&self, url_id: i64, url: &str) -> Result<(), TelemetryError> {
        let insert = sqlx::query("INSERT INTO url (id, url, created_at) VALUES (?, ?, ?)")
            .bind(url_id)
            .bind(url)
            .bind(get_timestamp_nanos())
            .execute(&self.mysql_provider.pool)
            .await;
        match insert {
            Ok(_) => Ok(()),
            // A racing first-seen insert for the same URL is fine.
            Err(e) if MysqlProvider::is_unique_violation(&e) => Ok(()),
            Err(e) => Err(MysqlProvider::db_error(e)),
        }
    }
}
