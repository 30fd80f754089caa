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

//! Ephemeral in-memory implementation of [ClientFacade].

use crate::InMemoryDatabaseProvider;
use std::sync::Arc;
use tally_dbp::dbp::facades::ClientFacade;
use tally_dbp::time::get_timestamp_nanos;
use tally_dbp::tm::ClientRecord;
use tally_dbp::tm::FingerprintRecord;
use tally_dbp::tm::TelemetryError;

/// Ephemeral in-memory implementation of [ClientFacade].
pub struct InMemClientFacade {
    inmem_provider: Arc<InMemoryDatabaseProvider>,
}

impl InMemClientFacade {
    /// Return a new instance.
    pub fn new(inmem_provider: &Arc<InMemoryDatabaseProvider>) -> Self {
        Self {
            inmem_provider: Arc::clone(inmem_provider),
        }
    }
}

#[async_trait::async_trait]
impl ClientFacade for InMemClientFacade {
    async fn client_register(&self, client_id: i64, token: &str) -> Result<(), TelemetryError> {
        self.inmem_provider.clients.insert(
            client_id,
            ClientRecord {
                id: client_id,
                token: token.to_owned(),
                created_at_nanos: get_timestamp_nanos(),
            },
        );
        Ok(())
    }

    async fn client_verify_token(
        &self,
        client_id: i64,
        token: &str,
    ) -> Result<bool, TelemetryError> {
        Ok(self
            .inmem_provider
            .clients
            .get(&client_id)
            .is_some_and(|entry| entry.value().token == token))
    }

    async fn fingerprint_register(
        &self,
        fingerprint: FingerprintRecord,
    ) -> Result<(), TelemetryError> {
        self.inmem_provider
            .fingerprints
            .insert(fingerprint.id, fingerprint);
        Ok(())
    }
}
