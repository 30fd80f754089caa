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

//! Ephemeral in-memory implementation of [ConnectivityFacade].

use tally_dbp::dbp::facades::ConnectivityFacade;
use tally_dbp::tm::TelemetryError;

/// Ephemeral in-memory implementation of [ConnectivityFacade].
#[derive(Default)]
pub struct InMemConnectivityFacade {}

#[async_trait::async_trait]
impl ConnectivityFacade for InMemConnectivityFacade {
    async fn ping(&self) -> Result<(), TelemetryError> {
        // NOOP: the in-mem backend is always reachable
        Ok(())
    }
}
