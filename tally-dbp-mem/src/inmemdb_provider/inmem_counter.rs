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

//! In-memory running counter row.

use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use tally_dbp::tm::CounterRecord;

/// In-memory running counter row.
///
/// Increments use an atomic so that concurrent inserts for the same URL
/// never lose an update, mirroring what the transactional backends get from
/// serializable isolation.
pub struct InMemCounter {
    id: i64,
    url_id: i64,
    count: AtomicI64,
    updated_at_nanos: AtomicI64,
}

impl InMemCounter {
    /// Return a new instance with a zero count.
    pub fn new(id: i64, url_id: i64, now_nanos: i64) -> Self {
        Self {
            id,
            url_id,
            count: AtomicI64::default(),
            updated_at_nanos: AtomicI64::new(now_nanos),
        }
    }

    /// Add one counted event.
    pub fn increment(&self, now_nanos: i64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.updated_at_nanos.store(now_nanos, Ordering::Relaxed);
    }

    /// Snapshot into the shared record form.
    pub fn as_record(&self) -> CounterRecord {
        CounterRecord {
            id: self.id,
            url_id: self.url_id,
            count: self.count.load(Ordering::Relaxed),
            updated_at_nanos: self.updated_at_nanos.load(Ordering::Relaxed),
        }
    }
}
