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

//! Parsing of configuration for the Randflake ID generator.

use config::ConfigBuilder;
use config::builder::BuilderState;
use serde::Deserialize;

use super::AppConfigDefaults;

/// Configuration for the Randflake ID generator.
#[derive(Deserialize)]
pub struct RandflakeConfig {
    /// See [Self::secret()].
    secret: String,
}

impl std::fmt::Debug for RandflakeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandflakeConfig")
            .field("secret", &"*redacted*")
            .finish()
    }
}

impl AppConfigDefaults for RandflakeConfig {
    const ENV_PREFIX: &'static str = "RANDFLAKE";

    /// Provide defaults for this part of the configuration
    fn set_defaults<T: BuilderState>(config_builder: ConfigBuilder<T>) -> ConfigBuilder<T> {
        config_builder.set_default("secret", "").unwrap()
    }
}

impl RandflakeConfig {
    /// Shared fleet secret behind the keyed ID permutation, from the
    /// required `RANDFLAKE_SECRET` environment variable.
    ///
    /// Every instance of a fleet must run with the same secret, or IDs will
    /// collide across instances.
    pub fn secret(&self) -> &str {
        &self.secret
    }
}
