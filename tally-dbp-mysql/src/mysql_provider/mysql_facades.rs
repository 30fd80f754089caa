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

//! MySQL implementations of the database facades.

mod mysql_client_facade;
mod mysql_connectivity_facade;
mod mysql_counter_facade;
mod mysql_node_lease_facade;
mod mysql_url_facade;

use self::mysql_client_facade::MysqlClientFacade;
use self::mysql_connectivity_facade::MysqlConnectivityFacade;
use self::mysql_counter_facade::MysqlCounterFacade;
use self::mysql_node_lease_facade::MysqlNodeLeaseFacade;
use self::mysql_url_facade::MysqlUrlFacade;
use crate::MysqlProvider;
use std::sync::Arc;
use tally_dbp::dbp::facades::*;

/// MySQL implementation of [DatabaseProviderFacades].
pub struct MysqlProviderFacades {
    client_facade: MysqlClientFacade,
    connectivity_facade: MysqlConnectivityFacade,
    counter_facade: MysqlCounterFacade,
    node_lease_facade: MysqlNodeLeaseFacade,
    url_facade: MysqlUrlFacade,
}

impl MysqlProviderFacades {
    /// Return a new instance.
    pub fn new(mysql_provider: &Arc<MysqlProvider>) -> Self {
        Self {
            client_facade: MysqlClientFacade::new(mysql_provider),
            connectivity_facade: MysqlConnectivityFacade::new(mysql_provider),
            counter_facade: MysqlCounterFacade::new(mysql_provider),
            node_lease_facade: MysqlNodeLeaseFacade::new(mysql_provider),
            url_facade: MysqlUrlFacade::new(mysql_provider),
        }
    }
}

impl DatabaseProviderFacades for MysqlProviderFacades {
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
