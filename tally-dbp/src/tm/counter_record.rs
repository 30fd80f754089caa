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

//! Per-URL running event counter.

/// A single-row running counter for one (URL, event kind) pair.
///
/// The counter is maintained in the same transaction as its event insert and
/// is the source of truth for the count read paths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CounterRecord {
    /// Generated identifier of the counter row.
    pub id: i64,
    /// Identifier of the counted URL.
    pub url_id: i64,
    /// Number of counted events.
    pub count: i64,
    /// Epoch nanoseconds of the latest increment.
    pub updated_at_nanos: i64,
}
