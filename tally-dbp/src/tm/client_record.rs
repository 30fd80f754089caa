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

//! Registered client identity.

/// A registered client: a generated identifier bound to an opaque token.
///
/// Created on registration, looked up on every authenticated request and
/// never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientRecord {
    /// Generated 63-bit client identifier.
    pub id: i64,
    /// Opaque bearer token presented by the client.
    pub token: String,
    /// Epoch nanoseconds of registration.
    pub created_at_nanos: i64,
}
