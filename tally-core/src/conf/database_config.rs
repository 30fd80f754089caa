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

//! Parsing of configuration for the database backend.

use config::ConfigBuilder;
use config::builder::BuilderState;
use serde::Deserialize;

use super::AppConfigDefaults;

/// Configuration for the database backend.
#[derive(Deserialize)]
pub struct DatabaseConfig {
    /// Backend implementation.
    backend: String,
    /// Connection URL of the MySQL backend.
    dsn: String,
    /// Seconds a pooled connection may sit idle. 0 disables the limit.
    conn_max_idle_time: u64,
    /// Seconds a pooled connection may live. 0 disables the limit.
    conn_max_lifetime: u64,
    /// Number of idle connections to keep around.
    max_idle_conns: u32,
    /// Upper bound on open connections. 0 means driver default.
    max_open_conns: u32,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("backend", &self.backend)
            // The DSN may embed credentials.
            .field("dsn", &"*redacted*")
            .field("conn_max_idle_time", &self.conn_max_idle_time)
            .field("conn_max_lifetime", &self.conn_max_lifetime)
            .field("max_idle_conns", &self.max_idle_conns)
            .field("max_open_conns", &self.max_open_conns)
            .finish()
    }
}

impl AppConfigDefaults for DatabaseConfig {
    const ENV_PREFIX: &'static str = "DATABASE";

    /// Provide defaults for this part of the configuration
    fn set_defaults<T: BuilderState>(config_builder: ConfigBuilder<T>) -> ConfigBuilder<T> {
        config_builder
            .set_default("backend", "mysql")
            .unwrap()
            .set_default("dsn", "mysql://root@localhost/tally")
            .unwrap()
            .set_default("conn_max_idle_time", "240")
            .unwrap()
            .set_default("conn_max_lifetime", "0")
            .unwrap()
            .set_default("max_idle_conns", "5")
            .unwrap()
            .set_default("max_open_conns", "0")
            .unwrap()
    }
}

impl DatabaseConfig {
    /// Backend implementation variant: `mysql` or the ephemeral `mem`.
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Connection URL of the MySQL backend.
    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    /// Seconds a pooled connection may sit idle before being closed.
    pub fn conn_max_idle_time(&self) -> u64 {
        self.conn_max_idle_time
    }

    /// Seconds a pooled connection may live before being recycled.
    pub fn conn_max_lifetime(&self) -> u64 {
        self.conn_max_lifetime
    }

    /// Number of idle connections to keep around.
    pub fn max_idle_conns(&self) -> u32 {
        self.max_idle_conns
    }

    /// Upper bound on open connections.
    pub fn max_open_conns(&self) -> u32 {
        self.max_open_conns
    }
}
