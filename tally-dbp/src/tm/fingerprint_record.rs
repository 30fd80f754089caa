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

//! Client browser fingerprint snapshot.

/// Browser fingerprint reported by a client on check-in.
#[derive(Clone, Debug)]
pub struct FingerprintRecord {
    /// Generated identifier of this fingerprint snapshot.
    pub id: i64,
    /// Identifier of the reporting client.
    pub client_id: i64,
    /// Version of the fingerprinting script that produced the hash.
    pub fp_version: i32,
    /// The fingerprint hash itself.
    pub fp_hash: String,
    /// Raw `User-Agent` request header value.
    pub user_agent: String,
    /// Structured user agent data (client hints), serialized by the client.
    pub user_agent_data: String,
    /// Epoch nanoseconds of the check-in.
    pub created_at_nanos: i64,
}
