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

//! Parsing of application configuration.

mod api_config;
mod database_config;
mod randflake_config;

use config::Config;
use config::ConfigBuilder;
use config::Environment;
use config::builder::BuilderState;
use serde::de::DeserializeOwned;

pub use self::api_config::ApiConfig;
pub use self::database_config::DatabaseConfig;
pub use self::randflake_config::RandflakeConfig;

/// Package version reported by Cargo at build time.
const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Static trait for configuration sections.
trait AppConfigDefaults {
    /// Environment variable prefix of this section, e.g. `DATABASE` for
    /// `DATABASE_DSN`.
    const ENV_PREFIX: &'static str;

    fn set_defaults<T: BuilderState>(config_builder: ConfigBuilder<T>) -> ConfigBuilder<T>;
}

/**
Application configuration root.

Each section is pre-populated with defaults and then overridden from
environment variables in the form `{SECTION}_{KEYWITHUNDERSCORES}`, e.g.
`DATABASE_CONN_MAX_IDLE_TIME` or `RANDFLAKE_SECRET`.
*/
#[derive(Debug)]
pub struct AppConfig {
    /// Configuration of the exposed REST API.
    pub api: ApiConfig,
    /// Configuration for the persistence backend.
    pub database: DatabaseConfig,
    /// Configuration for the Randflake ID generator.
    pub randflake: RandflakeConfig,

    /// Time of application startup in epoch nanoseconds.
    startup_ts_nanos: i64,
}

impl AppConfig {
    /// Creates a new instance pre-populated with defaults and environment
    /// variable overrides.
    pub fn new(startup_ts_nanos: i64) -> Self {
        let app_config = Self {
            api: Self::load_section::<ApiConfig>().with_ip_header(std::env::var("IP_HEADER").ok()),
            database: Self::load_section::<DatabaseConfig>(),
            randflake: Self::load_section::<RandflakeConfig>(),
            startup_ts_nanos,
        };
        log::info!("Running with configuration: {app_config:?}");
        app_config
    }

    /// Build one configuration section from its defaults and its environment
    /// variable overrides.
    fn load_section<C: AppConfigDefaults + DeserializeOwned>() -> C {
        C::set_defaults(Config::builder())
            .add_source(Environment::with_prefix(C::ENV_PREFIX))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    /// SemVer application version derived from the Rust package version.
    pub fn app_version(&self) -> &'static str {
        CARGO_PKG_VERSION
    }

    /// Time of application startup in epoch nanoseconds.
    pub fn startup_ts_nanos(&self) -> i64 {
        self.startup_ts_nanos
    }
}
