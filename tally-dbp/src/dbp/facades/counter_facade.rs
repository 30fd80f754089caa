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

//! Database facade for view/like event ingest and counter reads.

use crate::tm::BulkCountRow;
use crate::tm::CounterRecord;
use crate::tm::TelemetryError;

/// Database facade for view/like event ingest and counter reads.
///
/// Event insert and counter upsert always form a single serializable
/// transaction. When the counter insert races a concurrent creator, the
/// implementation falls back to an increment of the winner's row.
#[async_trait::async_trait]
pub trait CounterFacade: Send + Sync {
    /// Insert a view event and bump the URL's view counter.
    ///
    /// Views carry no uniqueness constraint; every call increments.
    /// `count_id` keys the counter row if this call has to create it.
    async fn view_insert_with_count(
        &self,
        view_id: i64,
        url_id: i64,
        client_id: i64,
        count_id: i64,
    ) -> Result<(), TelemetryError>;

    /// Read the view counter row of a URL.
    async fn view_count_by_url_id(
        &self,
        url_id: i64,
    ) -> Result<Option<CounterRecord>, TelemetryError>;

    /// Insert a like event and bump the URL's like counter.
    ///
    /// Likes are unique per (url, client): a duplicate commits as a silent
    /// no-op and does not increment the counter.
    async fn like_insert_with_count(
        &self,
        like_id: i64,
        url_id: i64,
        client_id: i64,
        count_id: i64,
    ) -> Result<(), TelemetryError>;

    /// Read the like counter row of a URL.
    async fn like_count_by_url_id(
        &self,
        url_id: i64,
    ) -> Result<Option<CounterRecord>, TelemetryError>;

    /// Batched view and like counters for a set of normalized URLs.
    ///
    /// URLs without any record are simply absent from the result; callers
    /// fill in zeroes.
    async fn counts_by_urls(&self, urls: &[String]) -> Result<Vec<BulkCountRow>, TelemetryError>;
}
