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

//! Ephemeral in-memory implementations of the database facades.

mod inmem_client_facade;
mod inmem_connectivity_facade;
mod inmem_counter_facade;
mod inmem_node_lease_facade;
mod inmem_url_facade;

use self::inmem_client_facade::InMemClientFacade;
use self::inmem_connectivity_facade::InMemConnectivityFacade;
use self::inmem_counter_facade::InMemCounterFacade;
use self::inmem_node_lease_facade::InMemNodeLeaseFacade;
use self::inmem_url_facade::InMemUrlFacade;
use crate::InMemoryDatabaseProvider;
use std::sync::Arc;
use tally_dbp::dbp::facades::*;

/// Ephemeral in-memory implementation of [DatabaseProviderFacades].
pub struct InMemProviderFacades {
    client_facade: InMemClientFacade,
    connectivity_facade: InMemConnectivityFacade,
    counter_facade: InMemCounterFacade,
    node_lease_facade: InMemNodeLeaseFacade,
    url_facade: InMemUrlFacade,
}

impl InMemProviderFacades {
    /// Return a new instance.
    pub fn new(inmem_provider: &Arc<InMemoryDatabaseProvider>) -> Self {
        Self {
            client_facade: InMemClientFacade::new(inmem_provider),
            connectivity_facade: InMemConnectivityFacade::default(),
            counter_facade: InMemCounterFacade::new(inmem_provider),
            node_lease_facade: InMemNodeLeaseFacade::new(inmem_provider),
            url_facade: InMemUrlFacade::new(inmem_provider),
        }
    }
}

impl DatabaseProviderFacades for InMemProviderFacades {
    fn client_facade(&self) -> &dyn ClientFacade {
        &self.client_facade
    }

    fn connectivity_facade(&self) -> &dyn ConnectivityFacade {
        &self.connectivity_facade
    }

    fn counter_facade(&self) -> &dyn CounterFacade {
        &self.counter_facade
    }

    fn node_lease_facade(&self) -> &dyn NodeLeaseFacade {
        &self.node_lease_facade
    }

    fn url_facade(&self) -> &dyn UrlFacade {
        &self.url_facade
    }
}
