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

//! Tracked URL record.

/// A tracked URL in normalized `host + path` form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlRecord {
    /// Generated identifier of the URL.
    pub id: i64,
    /// Normalized URL.
    pub url: String,
    /// Epoch nanoseconds when the URL was first seen.
    pub created_at_nanos: i64,
}
