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

//! Database facade for operations related to tracked URLs.

use crate::tm::TelemetryError;
use crate::tm::UrlRecord;

/// Database facade for operations related to tracked URLs.
///
/// URLs are stored in normalized `host + path` form only.
#[async_trait::async_trait]
pub trait UrlFacade: Send + Sync {
    /// Look up a URL record by its normalized form.
    async fn url_by_normalized(&self, url: &str) -> Result<Option<UrlRecord>, TelemetryError>;

    /// Persist a URL first seen by a view or like event.
    async fn url_insert(&self, url_id: i64, url: &str) -> Result<(), TelemetryError>;
}
