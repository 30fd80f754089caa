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

//! Idempotent schema bootstrap.

use super::MysqlProvider;
use tally_dbp::tm::TelemetryError;

/// Registered client identities.
const DDL_CLIENT: &str = "
    CREATE TABLE IF NOT EXISTS client (
        id          BIGINT NOT NULL PRIMARY KEY,
        token       VARCHAR(64) NOT NULL,
        created_at  BIGINT NOT NULL,
        KEY idx_client_token (token)
    )";

/// Fingerprint snapshots reported on check-in.
const DDL_CLIENT_FINGERPRINT: &str = "
    CREATE TABLE IF NOT EXISTS client_fingerprint (
        id               BIGINT NOT NULL PRIMARY KEY,
        client_id        BIGINT NOT NULL,
        fp_version       INT NOT NULL,
        fp_hash          VARCHAR(128) NOT NULL,
        user_agent       TEXT NOT NULL,
        user_agent_data  TEXT NOT NULL,
        created_at       BIGINT NOT NULL,
        KEY idx_client_fingerprint_client_id (client_id)
    )";

/// Tracked URLs in normalized form.
const DDL_URL: &str = "
    CREATE TABLE IF NOT EXISTS url (
        id          BIGINT NOT NULL PRIMARY KEY,
        url         VARCHAR(768) NOT NULL,
        created_at  BIGINT NOT NULL,
        UNIQUE KEY idx_url_url (url)
    )";

/// View events. No uniqueness: every view counts.
const DDL_PAGE_VIEW: &str = "
    CREATE TABLE IF NOT EXISTS page_view (
        id          BIGINT NOT NULL PRIMARY KEY,
        url_id      BIGINT NOT NULL,
        client_id   BIGINT NOT NULL,
        created_at  BIGINT NOT NULL,
        KEY idx_page_view_url_id (url_id)
    )";

/// Running view counter, one row per URL.
const DDL_VIEW_COUNT: &str = "
    CREATE TABLE IF NOT EXISTS view_count (
        id          BIGINT NOT NULL PRIMARY KEY,
        url_id      BIGINT NOT NULL,
        count       BIGINT NOT NULL,
        updated_at  BIGINT NOT NULL,
        UNIQUE KEY idx_view_count_url_id (url_id)
    )";

/// Like events, unique per (url, client).
const DDL_PAGE_LIKE: &str = "
    CREATE TABLE IF NOT EXISTS page_like (
        id          BIGINT NOT NULL PRIMARY KEY,
        url_id      BIGINT NOT NULL,
        client_id   BIGINT NOT NULL,
        created_at  BIGINT NOT NULL,
        UNIQUE KEY idx_page_like_url_client (url_id, client_id)
    )";

/// Running like counter, one row per URL.
const DDL_LIKE_COUNT: &str = "
    CREATE TABLE IF NOT EXISTS like_count (
        id          BIGINT NOT NULL PRIMARY KEY,
        url_id      BIGINT NOT NULL,
        count       BIGINT NOT NULL,
        updated_at  BIGINT NOT NULL,
        UNIQUE KEY idx_like_count_url_id (url_id)
    )";

/// Node id reservations. The (node_id, expires_at) key backs the liveness
/// probe inside the lease create transaction.
const DDL_NODE_LEASE: &str = "
    CREATE TABLE IF NOT EXISTS node_lease (
        uuid        BINARY(16) NOT NULL PRIMARY KEY,
        node_id     BIGINT NOT NULL,
        created_at  BIGINT NOT NULL,
        expires_at  BIGINT NOT NULL,
        KEY idx_node_lease_node_id (node_id, expires_at)
    )";

/// Create all tables and indices unless they already exist.
pub async fn ensure_schema(provider: &MysqlProvider) -> Result<(), TelemetryError> {
    for ddl in [
        DDL_CLIENT,
        DDL_CLIENT_FINGERPRINT,
        DDL_URL,
        DDL_PAGE_VIEW,
        DDL_VIEW_COUNT,
        DDL_PAGE_LIKE,
        DDL_LIKE_COUNT,
        DDL_NODE_LEASE,
    ] {
        sqlx::query(ddl)
            .execute(&provider.pool)
            .await
            .map_err(MysqlProvider::db_error)?;
    }
    log::debug!("Schema bootstrap completed.");
    Ok(())
}
