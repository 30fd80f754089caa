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

//! MySQL implementation of [CounterFacade].

use crate::MysqlProvider;
use std::sync::Arc;
use tally_dbp::dbp::facades::CounterFacade;
use tally_dbp::time::get_timestamp_nanos;
use tally_dbp::tm::BulkCountRow;
use tally_dbp::tm::CounterRecord;
use tally_dbp::tm::TelemetryError;

/// MySQL implementation of [CounterFacade].
pub struct MysqlCounterFacade {
    mysql_provider: Arc<MysqlProvider>,
}

impl MysqlCounterFacade {
    /// Return a new instance.
    pub fn new(mysql_provider: &Arc<MysqlProvider>) -> Self {
        Self {
            mysql_provider: Arc::clone(mysql_provider),
        }
    }

    /// Insert one event row and bump the matching counter row, atomically.
    ///
    /// A duplicate event insert rolls back and reports success without
    /// touching the counter. A counter insert racing a concurrent creator
    /// falls back to incrementing the winner's row.
    async fn event_insert_with_count(
        &self,
        event_table: &str,
        count_table: &str,
        event_id: i64,
        url_id: i64,
        client_id: i64,
        count_id: i64,
    ) -> Result<(), TelemetryError> {
        let now = get_timestamp_nanos();
        let mut tx = self
            .mysql_provider
            .pool
            .begin()
            .await
            .map_err(MysqlProvider::db_error)?;
        let event_insert = sqlx::query(&format!(
            "INSERT INTO {event_table} (id, url_id, client_id, created_at) VALUES (?, ?, ?, ?)"
        ))
        .bind(event_id)
        .bind(url_id)
        .bind(client_id)
        .bind(now)
        .execute(&mut *tx)
        .await;
        if let Err(e) = event_insert {
            if MysqlProvider::is_unique_violation(&e) {
                // Already counted for this (url, client): dropping the
                // transaction rolls back and the call reports success.
                return Ok(());
            }
            return Err(MysqlProvider::db_error(e));
        }
        let existing: Option<i64> =
            sqlx::query_scalar(&format!("SELECT id FROM {count_table} WHERE url_id = ?"))
                .bind(url_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(MysqlProvider::db_error)?;
        if existing.is_some() {
            Self::increment_count(&mut tx, count_table, url_id, now).await?;
        } else {
            let count_insert = sqlx::query(&format!(
                "INSERT INTO {count_table} (id, url_id, count, updated_at) VALUES (?, ?, 1, ?)"
            ))
            .bind(count_id)
            .bind(url_id)
            .bind(now)
            .execute(&mut *tx)
            .await;
            match count_insert {
                Ok(_) => {}
                Err(e) if MysqlProvider::is_unique_violation(&e) => {
                    // A concurrent transaction created the row first.
                    Self::increment_count(&mut tx, count_table, url_id, now).await?;
                }
                Err(e) => return Err(MysqlProvider::db_error(e)),
            }
        }
        tx.commit().await.map_err(MysqlProvider::db_error)
    }

    async fn increment_count(
        tx: &mut sqlx::Transaction<'_, sqlx::MySql>,
        count_table: &str,
        url_id: i64,
        now: i64,
    ) -> Result<(), TelemetryError> {
        sqlx::query(&format!(
            "UPDATE {count_table} SET count = count + 1, updated_at = ? WHERE url_id = ?"
        ))
        .bind(now)
        .bind(url_id)
        .execute(&mut **tx)
        .await
        .map_err(MysqlProvider::db_error)?;
        Ok(())
    }

    async fn count_by_url_id(
        &self,
        count_table: &str,
        url_id: i64,
    ) -> Result<Option<CounterRecord>, TelemetryError> {
        Ok(sqlx::query_as::<_, (i64, i64, i64, i64)>(&format!(
            "SELECT id, url_id, count, updated_at FROM {count_table} WHERE url_id = ?"
        ))
        .bind(url_id)
        .fetch_optional(&self.mysql_provider.pool)
        .await
        .map_err(MysqlProvider::db_error)?
        .map(|(id, url_id, count, updated_at_nanos)| CounterRecord {
            id,
            url_id,
            count,
            updated_at_nanos,
        }))
    }
}

#[async_trait::async_trait]
impl CounterFacade for MysqlCounterFacade {
    async fn view_insert_with_count(
        &self,
        view_id: i64,
        url_id: i64,
        client_id: i64,
        count_id: i64,
    ) -> Result<(), TelemetryError> {
        self.event_insert_with_count("page_view", "view_count", view_id, url_id, client_id, count_id)
            .await
    }

    async fn view_count_by_url_id(
        &self,
        url_id: i64,
    ) -> Result<Option<CounterRecord>, TelemetryError> {
        self.count_by_url_id("view_count", url_id).await
    }

    async fn like_insert_with_count(
        &self,
        like_id: i64,
        url_id: i64,
        client_id: i64,
        count_id: i64,
    ) -> Result<(), TelemetryError> {
        self.event_insert_with_count("page_like", "like_count", like_id, url_id, client_id, count_id)
            .await
    }

    async fn like_count_by_url_id(
        &self,
        url_id: i64,
    ) -> Result<Option<CounterRecord>, TelemetryError> {
        self.count_by_url_id("like_count", url_id).await
    }

    async fn counts_by_urls(&self, urls: &[String]) -> Result<Vec<BulkCountRow>, TelemetryError> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }
        let mut query_builder = sqlx::QueryBuilder::<sqlx::MySql>::new(
            "SELECT u.url, COALESCE(vc.count, 0), COALESCE(lc.count, 0) \
             FROM url u \
             LEFT JOIN view_count vc ON vc.url_id = u.id \
             LEFT JOIN like_count lc ON lc.url_id = u.id \
             WHERE u.url IN (",
        );
        let mut separated = query_builder.separated(", ");
        for url in urls {
            separated.push_bind(url.as_str());
        }
        query_builder.push(")");
        Ok(query_builder
            .build_query_as::<(String, i64, i64)>()
            .fetch_all(&self.mysql_provider.pool)
            .await
            .map_err(MysqlProvider::db_error)?
            .into_iter()
            .map(|(url, view_count, like_count)| BulkCountRow {
                url,
                view_count,
                like_count,
            })
            .collect())
    }
}
