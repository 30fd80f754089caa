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

//! Telemetry core.

mod lease_coordinator;
mod randflake_generator;
mod url_normalizer;

pub use self::lease_coordinator::LeaseCoordinator;
pub use self::randflake_generator::RandflakeGenerator;
pub use self::url_normalizer::normalize_url;

use crate::conf::AppConfig;
use sha2::Digest;
use sha2::Sha256;
use std::sync::Arc;
use tally_dbp::dbp::DatabaseProvider;
use tally_dbp::dbp::facades::DatabaseProviderFacades;
use tally_dbp::time::get_timestamp_nanos;
use tally_dbp::tm::BulkCountRow;
use tally_dbp::tm::FingerprintRecord;
use tally_dbp::tm::RandflakeId;
pub use tally_dbp::tm::TelemetryError;
pub use tally_dbp::tm::TelemetryErrorKind;
use tally_dbp_mem::InMemoryDatabaseProvider;
use tally_dbp_mysql::MysqlProvider;

/// Fingerprinting script version accepted on check-in.
const SUPPORTED_FP_VERSION: i32 = 1;

/** Telemetry core.

The telemetry core records per-URL view and like events contributed by
registered clients and exposes their running counters. Every identifier it
hands out comes from the lease-backed Randflake generator, so identifiers
stay unique across a whole fleet sharing one database.

This is also the narrow capability surface the REST resources program
against: ID minting plus the domain operations, nothing more.
*/
pub struct TelemetryCore {
    /// The database provider
    dbp: Arc<DatabaseProvider>,
    /// Keeper of this instance's exclusive ID issuance slice.
    lease_coordinator: Arc<LeaseCoordinator>,
}

impl TelemetryCore {
    /// Return a new instance.
    ///
    /// Fails when the persistence backend is unreachable, when no node lease
    /// could be acquired or when `RANDFLAKE_SECRET` is missing. All of these
    /// abort startup.
    pub async fn new(app_config: &Arc<AppConfig>) -> Result<Arc<Self>, TelemetryError> {
        // Setup persistence from config.
        let dbp = match app_config.database.backend() {
            "mysql" => {
                let mysql_provider = MysqlProvider::new(
                    app_config.database.dsn(),
                    app_config.database.conn_max_idle_time(),
                    app_config.database.conn_max_lifetime(),
                    app_config.database.max_idle_conns(),
                    app_config.database.max_open_conns(),
                )
                .await?;
                Arc::new(mysql_provider.as_database_provider())
            }
            "mem" => {
                let inmem_provider = InMemoryDatabaseProvider::new().await;
                Arc::new(inmem_provider.as_database_provider())
            }
            unknown_provider => panic!("Unknown database provider type '{unknown_provider}'."),
        };
        let secret = app_config.randflake.secret();
        if secret.is_empty() {
            return Err(TelemetryErrorKind::Unspecified
                .error_with_msg("The RANDFLAKE_SECRET environment variable is required."));
        }
        let digest = Sha256::digest(secret.as_bytes());
        let mut secret_key = [0u8; 16];
        secret_key.copy_from_slice(&digest[..16]);
        Self::with_database_provider(dbp, secret_key).await
    }

    /// Return a new instance on top of an existing database provider.
    pub async fn with_database_provider(
        dbp: Arc<DatabaseProvider>,
        secret_key: [u8; 16],
    ) -> Result<Arc<Self>, TelemetryError> {
        let lease_coordinator = LeaseCoordinator::new(&dbp, secret_key).await?;
        log::info!("Telemetry core dependencies have been created.");
        Ok(Arc::new(Self {
            dbp,
            lease_coordinator,
        }))
    }

    /// Mint the next cluster-wide unique identifier.
    pub fn generate_id(&self) -> Result<i64, TelemetryError> {
        self.lease_coordinator.generate_id()
    }

    /// Mint the next cluster-wide unique identifier in textual form.
    pub fn generate_id_string(&self) -> Result<String, TelemetryError> {
        self.lease_coordinator.generate_id_string()
    }

    /// Probe the backend and the ID generator.
    ///
    /// Healthy means the database answers its echo query and the current
    /// lease window still permits minting.
    pub async fn health_check(&self) -> Result<(), TelemetryError> {
        self.dbp.connectivity_facade().ping().await?;
        self.generate_id()?;
        Ok(())
    }

    /// Register a new client and return its (textual id, token) identity.
    pub async fn register_client(&self) -> Result<(String, String), TelemetryError> {
        let client_id = self.generate_id()?;
        let token = self.generate_id_string()?;
        self.dbp
            .client_facade()
            .client_register(client_id, &token)
            .await?;
        let encoded_id = RandflakeId::from(client_id).as_string();
        log::debug!("Registered client {encoded_id}.");
        Ok((encoded_id, token))
    }

    /// Decode a textual client id and verify its token.
    ///
    /// Returns the numeric client id on success, [TelemetryErrorKind::InvalidInput]
    /// for an undecodable id and [TelemetryErrorKind::Unauthorized] on a
    /// token mismatch.
    pub async fn verify_client(
        &self,
        client_id: &str,
        client_token: &str,
    ) -> Result<i64, TelemetryError> {
        let decoded_id = RandflakeId::from_string(client_id)?.as_encoded_i64();
        let token_ok = self
            .dbp
            .client_facade()
            .client_verify_token(decoded_id, client_token)
            .await?;
        if !token_ok {
            if log::log_enabled!(log::Level::Debug) {
                log::debug!("Token verification failed for client {client_id}.");
            }
            return Err(TelemetryErrorKind::Unauthorized.error());
        }
        Ok(decoded_id)
    }

    /// Record a fingerprint snapshot for an authenticated client.
    ///
    /// Only fingerprinting script version 1 is understood; anything else is
    /// rejected as invalid input.
    pub async fn checkin_client(
        &self,
        client_id: &str,
        client_token: &str,
        fp_version: i32,
        fp_hash: &str,
        user_agent: &str,
        user_agent_data: &str,
    ) -> Result<(), TelemetryError> {
        if fp_version != SUPPORTED_FP_VERSION {
            return Err(TelemetryErrorKind::InvalidInput
                .error_with_msg(format!("Unsupported fingerprint version {fp_version}.")));
        }
        let decoded_id = self.verify_client(client_id, client_token).await?;
        let fingerprint_id = self.generate_id()?;
        self.dbp
            .client_facade()
            .fingerprint_register(FingerprintRecord {
                id: fingerprint_id,
                client_id: decoded_id,
                fp_version,
                fp_hash: fp_hash.to_owned(),
                user_agent: user_agent.to_owned(),
                user_agent_data: user_agent_data.to_owned(),
                created_at_nanos: get_timestamp_nanos(),
            })
            .await
    }

    /// Record one view of `url` by an authenticated client.
    ///
    /// Views are not deduplicated: every call increments the counter.
    pub async fn record_view(
        &self,
        client_id: &str,
        client_token: &str,
        url: &str,
    ) -> Result<(), TelemetryError> {
        let normalized_url = normalize_url(url)?;
        let decoded_id = self.verify_client(client_id, client_token).await?;
        let url_id = self.url_id_or_insert(&normalized_url).await?;
        let view_id = self.generate_id()?;
        let count_id = self.generate_id()?;
        self.dbp
            .counter_facade()
            .view_insert_with_count(view_id, url_id, decoded_id, count_id)
            .await
    }

    /// Record a like of `url` by an authenticated client.
    ///
    /// Likes are idempotent per (url, client).
    pub async fn record_like(
        &self,
        client_id: &str,
        client_token: &str,
        url: &str,
    ) -> Result<(), TelemetryError> {
        let normalized_url = normalize_url(url)?;
        let decoded_id = self.verify_client(client_id, client_token).await?;
        let url_id = self.url_id_or_insert(&normalized_url).await?;
        let like_id = self.generate_id()?;
        let count_id = self.generate_id()?;
        self.dbp
            .counter_facade()
            .like_insert_with_count(like_id, url_id, decoded_id, count_id)
            .await
    }

    /// Return the view counter of a URL as (normalized url, count).
    ///
    /// An unknown URL is [TelemetryErrorKind::NotFound]; a known URL without
    /// a counter row reads as zero.
    pub async fn view_count(&self, url: &str) -> Result<(String, i64), TelemetryError> {
        let normalized_url = normalize_url(url)?;
        let url_record = self
            .dbp
            .url_facade()
            .url_by_normalized(&normalized_url)
            .await?
            .ok_or_else(|| TelemetryErrorKind::NotFound.error())?;
        let count = self
            .dbp
            .counter_facade()
            .view_count_by_url_id(url_record.id)
            .await?
            .map(|counter| counter.count)
            .unwrap_or_default();
        Ok((normalized_url, count))
    }

    /// Return the like counter of a URL as (normalized url, count).
    ///
    /// Same absence semantics as [Self::view_count].
    pub async fn like_count(&self, url: &str) -> Result<(String, i64), TelemetryError> {
        let normalized_url = normalize_url(url)?;
        let url_record = self
            .dbp
            .url_facade()
            .url_by_normalized(&normalized_url)
            .await?
            .ok_or_else(|| TelemetryErrorKind::NotFound.error())?;
        let count = self
            .dbp
            .counter_facade()
            .like_count_by_url_id(url_record.id)
            .await?
            .map(|counter| counter.count)
            .unwrap_or_default();
        Ok((normalized_url, count))
    }

    /// Return view and like counters for a list of URLs.
    ///
    /// The result holds exactly one entry per deduplicated normalized URL in
    /// first-seen order of the request. Unknown URLs report zero counts. Any
    /// unparsable URL fails the whole call.
    pub async fn bulk_counts(&self, urls: &[String]) -> Result<Vec<BulkCountRow>, TelemetryError> {
        if urls.is_empty() {
            return Err(TelemetryErrorKind::InvalidInput.error_with_msg("The URL list is empty."));
        }
        let mut normalized = Vec::with_capacity(urls.len());
        let mut seen = std::collections::HashSet::new();
        for url in urls {
            let normalized_url = normalize_url(url)?;
            if seen.insert(normalized_url.clone()) {
                normalized.push(normalized_url);
            }
        }
        let rows = self.dbp.counter_facade().counts_by_urls(&normalized).await?;
        let mut by_url: std::collections::HashMap<String, BulkCountRow> =
            rows.into_iter().map(|row| (row.url.clone(), row)).collect();
        Ok(normalized
            .into_iter()
            .map(|url| {
                by_url.remove(&url).unwrap_or(BulkCountRow {
                    url,
                    view_count: 0,
                    like_count: 0,
                })
            })
            .collect())
    }

    /// Invoked on graceful shutdowns to stop the lease worker.
    ///
    /// This is not guaranteed to run, so no code relies on it.
    pub fn exit_hook(&self) {
        self.lease_coordinator.stop();
    }

    /// Look up the id of a normalized URL, creating the record on first
    /// sight.
    async fn url_id_or_insert(&self, normalized_url: &str) -> Result<i64, TelemetryError> {
        if let Some(url_record) = self
            .dbp
            .url_facade()
            .url_by_normalized(normalized_url)
            .await?
        {
            return Ok(url_record.id);
        }
        let url_id = self.generate_id()?;
        self.dbp
            .url_facade()
            .url_insert(url_id, normalized_url)
            .await?;
        // A racing first-seen insert may have won; re-read for its id.
        Ok(self
            .dbp
            .url_facade()
            .url_by_normalized(normalized_url)
            .await?
            .map(|url_record| url_record.id)
            .unwrap_or(url_id))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    pub fn initialize_env_logger() {
        env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init()
            .map_err(|e| {
                log::trace!("Env logger for testing was probably already initialized: {e:?}")
            })
            .ok();
    }

    async fn core_with_mem_backend() -> Arc<TelemetryCore> {
        initialize_env_logger();
        let dbp = Arc::new(
            InMemoryDatabaseProvider::new()
                .await
                .as_database_provider(),
        );
        TelemetryCore::with_database_provider(dbp, *b"0123456789abcdef")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn register_then_verify_round_trips() {
        let core = core_with_mem_backend().await;
        let (client_id, token) = core.register_client().await.unwrap();
        assert!(!client_id.is_empty());
        assert!(!token.is_empty());
        assert!(core.verify_client(&client_id, &token).await.is_ok());
        // Flip one character of the token.
        let bad_token = format!("{}#", &token[..token.len() - 1]);
        let e = core.verify_client(&client_id, &bad_token).await.unwrap_err();
        assert_eq!(e.kind(), &TelemetryErrorKind::Unauthorized);
        // An undecodable client id is invalid input, not unauthorized.
        let e = core.verify_client("not an id", &token).await.unwrap_err();
        assert_eq!(e.kind(), &TelemetryErrorKind::InvalidInput);
        core.exit_hook();
    }

    #[tokio::test]
    async fn every_view_counts() {
        let core = core_with_mem_backend().await;
        let (client_id, token) = core.register_client().await.unwrap();
        core.record_view(&client_id, &token, "https://ex.com/a/")
            .await
            .unwrap();
        core.record_view(&client_id, &token, "ex.com/a")
            .await
            .unwrap();
        let (url, count) = core.view_count("ex.com/a").await.unwrap();
        assert_eq!(url, "ex.com/a");
        assert_eq!(count, 2);
        core.exit_hook();
    }

    #[tokio::test]
    async fn likes_count_once_per_client() {
        let core = core_with_mem_backend().await;
        let (client_id, token) = core.register_client().await.unwrap();
        core.record_like(&client_id, &token, "ex.com/p")
            .await
            .unwrap();
        core.record_like(&client_id, &token, "ex.com/p")
            .await
            .unwrap();
        let (_url, count) = core.like_count("ex.com/p").await.unwrap();
        assert_eq!(count, 1);
        core.exit_hook();
    }

    #[tokio::test]
    async fn counts_of_an_unknown_url_are_not_found() {
        let core = core_with_mem_backend().await;
        let e = core.like_count("ex.com/q").await.unwrap_err();
        assert_eq!(e.kind(), &TelemetryErrorKind::NotFound);
        let e = core.view_count("ex.com/q").await.unwrap_err();
        assert_eq!(e.kind(), &TelemetryErrorKind::NotFound);
        core.exit_hook();
    }

    #[tokio::test]
    async fn bulk_counts_deduplicate_in_first_seen_order() {
        let core = core_with_mem_backend().await;
        let (client_id, token) = core.register_client().await.unwrap();
        core.record_view(&client_id, &token, "ex.com/a")
            .await
            .unwrap();
        core.record_like(&client_id, &token, "ex.com/a")
            .await
            .unwrap();
        let rows = core
            .bulk_counts(&[
                "ex.com/b".to_owned(),
                "https://ex.com/a/".to_owned(),
                "ex.com/a".to_owned(),
                "ex.com/b/".to_owned(),
            ])
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].url, "ex.com/b");
        assert_eq!(rows[0].view_count, 0);
        assert_eq!(rows[0].like_count, 0);
        assert_eq!(rows[1].url, "ex.com/a");
        assert_eq!(rows[1].view_count, 1);
        assert_eq!(rows[1].like_count, 1);
        assert!(core.bulk_counts(&[]).await.is_err());
        assert!(core.bulk_counts(&["http://".to_owned()]).await.is_err());
        core.exit_hook();
    }

    #[tokio::test]
    async fn checkin_rejects_unknown_fingerprint_versions() {
        let core = core_with_mem_backend().await;
        let (client_id, token) = core.register_client().await.unwrap();
        let e = core
            .checkin_client(&client_id, &token, 2, "hash", "ua", "uad")
            .await
            .unwrap_err();
        assert_eq!(e.kind(), &TelemetryErrorKind::InvalidInput);
        assert!(
            core.checkin_client(&client_id, &token, 1, "hash", "ua", "uad")
                .await
                .is_ok()
        );
        core.exit_hook();
    }

    #[tokio::test]
    async fn health_check_passes_with_a_live_lease() {
        let core = core_with_mem_backend().await;
        assert!(core.health_check().await.is_ok());
        core.exit_hook();
    }
}
