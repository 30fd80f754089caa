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

//! Ephemeral in-memory implementation of [UrlFacade].

use crate::InMemoryDatabaseProvider;
use std::sync::Arc;
use tally_dbp::dbp::facades::UrlFacade;
use tally_dbp::time::get_timestamp_nanos;
use tally_dbp::tm::TelemetryError;
use tally_dbp::tm::UrlRecord;

/// Ephemeral in-memory implementation of [UrlFacade].
pub struct InMemUrlFacade {
    inmem_provider: Arc<InMemoryDatabaseProvider>,
}

impl InMemUrlFacade {
    /// Return a new instance.
    pub fn new(inmem_provider: &Arc<InMemoryDatabaseProvider>) -> Self {
        Self {
            inmem_provider: Arc::clone(inmem_provider),
        }
    }
}

#[async_trait::async_trait]
impl UrlFacade for InMemUrlFacade {
    async fn url_by_normalized(&self, url: &str) -> Result<Option<UrlRecord>, TelemetryError> {
        Ok(self
            .inmem_provider
            .urls_by_normalized
            .get(url)
            .map(|entry| entry.value().to_owned()))
    }

    async fn url_insert(&self, url_id: i64, url: &str) -> Result<(), TelemetryError> {
        // First writer wins, so a racing insert behaves like the unique
        // constraint of the transactional backends.
        self.inmem_provider
            .urls_by_normalized
            .get_or_insert_with(url.to_owned(), || UrlRecord {
                id: url_id,
                url: url.to_owned(),
                created_at_nanos: get_timestamp_nanos(),
            });
        Ok(())
    }
}
