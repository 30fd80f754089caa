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

//! Ephemeral in-memory implementation of [CounterFacade].

use crate::InMemoryDatabaseProvider;
use crate::inmemdb_provider::inmem_counter::InMemCounter;
use std::sync::Arc;
use tally_dbp::dbp::facades::CounterFacade;
use tally_dbp::time::get_timestamp_nanos;
use tally_dbp::tm::BulkCountRow;
use tally_dbp::tm::CounterRecord;
use tally_dbp::tm::TelemetryError;

/// Ephemeral in-memory implementation of [CounterFacade].
pub struct InMemCounterFacade {
    inmem_provider: Arc<InMemoryDatabaseProvider>,
}

impl InMemCounterFacade {
    /// Return a new instance.
    pub fn new(inmem_provider: &Arc<InMemoryDatabaseProvider>) -> Self {
        Self {
            inmem_provider: Arc::clone(inmem_provider),
        }
    }
}

#[async_trait::async_trait]
impl CounterFacade for InMemCounterFacade {
    async fn view_insert_with_count(
        &self,
        view_id: i64,
        url_id: i64,
        client_id: i64,
        count_id: i64,
    ) -> Result<(), TelemetryError> {
        let now = get_timestamp_nanos();
        self.inmem_provider
            .views
            .insert(view_id, (url_id, client_id, now));
        self.inmem_provider
            .view_counts
            .get_or_insert_with(url_id, || InMemCounter::new(count_id, url_id, now))
            .value()
            .increment(now);
        Ok(())
    }

    async fn view_count_by_url_id(
        &self,
        url_id: i64,
    ) -> Result<Option<CounterRecord>, TelemetryError> {
        Ok(self
            .inmem_provider
            .view_counts
            .get(&url_id)
            .map(|entry| entry.value().as_record()))
    }

    async fn like_insert_with_count(
        &self,
        like_id: i64,
        url_id: i64,
        client_id: i64,
        count_id: i64,
    ) -> Result<(), TelemetryError> {
        let now = get_timestamp_nanos();
        let entry = self
            .inmem_provider
            .likes
            .get_or_insert_with((url_id, client_id), || like_id);
        if *entry.value() != like_id {
            // The (url, client) pair has already liked: idempotent no-op.
            return Ok(());
        }
        self.inmem_provider
            .like_counts
            .get_or_insert_with(url_id, || InMemCounter::new(count_id, url_id, now))
            .value()
            .increment(now);
        Ok(())
    }

    async fn like_count_by_url_id(
        &self,
        url_id: i64,
    ) -> Result<Option<CounterRecord>, TelemetryError> {
        Ok(self
            .inmem_provider
            .like_counts
            .get(&url_id)
            .map(|entry| entry.value().as_record()))
    }

    async fn counts_by_urls(&self, urls: &[String]) -> Result<Vec<BulkCountRow>, TelemetryError> {
        let mut rows = Vec::with_capacity(urls.len());
        for url in urls {
            if let Some(url_record) = self.inmem_provider.urls_by_normalized.get(url.as_str()) {
                let url_id = url_record.value().id;
                let view_count = self
                    .inmem_provider
                    .view_counts
                    .get(&url_id)
                    .map(|entry| entry.value().as_record().count)
                    .unwrap_or_default();
                let like_count = self
                    .inmem_provider
                    .like_counts
                    .get(&url_id)
                    .map(|entry| entry.value().as_record().count)
                    .unwrap_or_default();
                rows.push(BulkCountRow {
                    url: url.to_owned(),
                    view_count,
                    like_count,
                });
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    async fn facade() -> InMemCounterFacade {
        InMemCounterFacade::new(&InMemoryDatabaseProvider::new().await)
    }

    #[tokio::test]
    async fn every_view_increments() {
        let facade = facade().await;
        facade.view_insert_with_count(1, 100, 7, 50).await.unwrap();
        facade.view_insert_with_count(2, 100, 7, 51).await.unwrap();
        let count = facade.view_count_by_url_id(100).await.unwrap().unwrap();
        assert_eq!(count.count, 2);
        // The racing count row id is only used by the creator.
        assert_eq!(count.id, 50);
    }

    #[tokio::test]
    async fn duplicate_like_is_a_silent_noop() {
        let facade = facade().await;
        facade.like_insert_with_count(1, 100, 7, 50).await.unwrap();
        facade.like_insert_with_count(2, 100, 7, 51).await.unwrap();
        let count = facade.like_count_by_url_id(100).await.unwrap().unwrap();
        assert_eq!(count.count, 1);
        // A different client still increments.
        facade.like_insert_with_count(3, 100, 8, 52).await.unwrap();
        let count = facade.like_count_by_url_id(100).await.unwrap().unwrap();
        assert_eq!(count.count, 2);
    }

    #[tokio::test]
    async fn missing_count_rows_read_as_absent() {
        let facade = facade().await;
        assert!(facade.view_count_by_url_id(404).await.unwrap().is_none());
        assert!(facade.like_count_by_url_id(404).await.unwrap().is_none());
    }
}
