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

//! Ephemeral in-memory implementation of [DatabaseProvider].

mod inmem_counter;
mod inmem_facades;

use self::inmem_counter::InMemCounter;
use self::inmem_facades::InMemProviderFacades;
use crossbeam_skiplist::SkipMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use tally_dbp::dbp::DatabaseProvider;
use tally_dbp::tm::ClientRecord;
use tally_dbp::tm::FingerprintRecord;
use tally_dbp::tm::NodeLease;
use tally_dbp::tm::UrlRecord;
use uuid::Uuid;

/// Ephemeral in-memory implementation of [DatabaseProvider].
pub struct InMemoryDatabaseProvider {
    clients: SkipMap<i64, ClientRecord>,
    fingerprints: SkipMap<i64, FingerprintRecord>,
    urls_by_normalized: SkipMap<String, UrlRecord>,
    /// view event id -> (url id, client id, created at)
    views: SkipMap<i64, (i64, i64, i64)>,
    view_counts: SkipMap<i64, InMemCounter>,
    /// (url id, client id) -> like event id
    likes: SkipMap<(i64, i64), i64>,
    like_counts: SkipMap<i64, InMemCounter>,
    /// Lease rows. A plain mutex stands in for serializable isolation.
    leases: Mutex<HashMap<Uuid, NodeLease>>,
}

impl InMemoryDatabaseProvider {
    /// Return a new instance.
    pub async fn new() -> Arc<Self> {
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("Using in-mem db provider.");
        }
        Arc::new(Self {
            clients: SkipMap::default(),
            fingerprints: SkipMap::default(),
            urls_by_normalized: SkipMap::default(),
            views: SkipMap::default(),
            view_counts: SkipMap::default(),
            likes: SkipMap::default(),
            like_counts: SkipMap::default(),
            leases: Mutex::default(),
        })
    }

    /// Get [DatabaseProvider] instance.
    pub fn as_database_provider(self: &Arc<Self>) -> DatabaseProvider {
        DatabaseProvider::new(Arc::new(InMemProviderFacades::new(self)))
    }
}
