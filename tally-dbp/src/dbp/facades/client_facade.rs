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

//! Database facade for operations related to client identities.

use crate::tm::FingerprintRecord;
use crate::tm::TelemetryError;

/// Database facade for operations related to client identities.
#[async_trait::async_trait]
pub trait ClientFacade: Send + Sync {
    /// Persist a freshly generated client identity.
    async fn client_register(&self, client_id: i64, token: &str) -> Result<(), TelemetryError>;

    /// Return `true` when `token` matches the stored token of `client_id`.
    ///
    /// An unknown client id verifies as `false`, not as an error.
    async fn client_verify_token(
        &self,
        client_id: i64,
        token: &str,
    ) -> Result<bool, TelemetryError>;

    /// Persist a fingerprint snapshot reported on check-in.
    async fn fingerprint_register(
        &self,
        fingerprint: FingerprintRecord,
    ) -> Result<(), TelemetryError>;
}
