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

//! API resources for client registration, status and check-in.

use crate::rest_api::AppState;
use crate::rest_api::common::ApiErrorMapper;
use actix_web::HttpResponse;
use actix_web::post;
use actix_web::web::Data;
use actix_web::web::Json;
use serde::Deserialize;
use serde::Serialize;
use tally_core::TelemetryErrorKind;
use utoipa::ToSchema;

/// Identity handed to a freshly registered client.
#[derive(Serialize, ToSchema)]
pub struct ClientIdentity {
    /// Textual client identifier.
    id: String,
    /// Opaque bearer token.
    token: String,
}

/// Credentials and fingerprint material presented by a client.
///
/// Status requests only carry the credential fields; the remainder defaults
/// to empty.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ClientPassport {
    /// Textual client identifier.
    client_id: String,
    /// Opaque bearer token.
    client_token: String,
    /// Client script version.
    #[serde(default)]
    version: String,
    /// Fingerprinting script version.
    #[serde(default)]
    fpv: i32,
    /// Fingerprint hash.
    #[serde(default)]
    fp: String,
    /// Raw `User-Agent` value.
    #[serde(default)]
    ua: String,
    /// Structured user agent data.
    #[serde(default)]
    uad: String,
}

/// Register a new client identity.
#[utoipa::path(
    tag = "client",
    responses(
        (
            status = 201,
            description = "Created. The new client identity.",
            body = ClientIdentity,
        ),
        (status = 500, description = "Internal server error."),
    ),
)]
#[post("/client/register")]
pub async fn client_register(app_state: Data<AppState>) -> HttpResponse {
    match app_state.core.register_client().await {
        Ok((id, token)) => HttpResponse::Created().json(ClientIdentity { id, token }),
        Err(e) => {
            log::error!("Failed to register client: {e}");
            ApiErrorMapper::to_response(e)
        }
    }
}

/// Check the credentials of a registered client.
#[utoipa::path(
    tag = "client",
    responses(
        (status = 200, description = "Ok. The credentials check out."),
        (status = 400, description = "Bad request. Malformed body or client identifier."),
        (status = 401, description = "Unauthorized: the token does not match."),
    ),
)]
#[post("/client/status")]
pub async fn client_status(
    app_state: Data<AppState>,
    passport: Json<ClientPassport>,
) -> HttpResponse {
    match app_state
        .core
        .verify_client(&passport.client_id, &passport.client_token)
        .await
    {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })),
        Err(e) if e.kind() == &TelemetryErrorKind::InvalidInput => ApiErrorMapper::to_response(e),
        Err(e) => {
            // Any other failure reads as "these credentials do not check
            // out", including backend trouble during verification.
            if log::log_enabled!(log::Level::Debug) {
                log::debug!("Client status check failed: {e}");
            }
            HttpResponse::Unauthorized().json(serde_json::json!({ "status": "unauthorized" }))
        }
    }
}

/// Record a fingerprint snapshot for an authenticated client.
#[utoipa::path(
    tag = "client",
    responses(
        (status = 200, description = "Ok. Fingerprint recorded."),
        (
            status = 400,
            description = "Bad request. Malformed body, client identifier or fingerprint version.",
        ),
        (status = 401, description = "Unauthorized: the token does not match."),
        (status = 500, description = "Internal server error."),
    ),
)]
#[post("/client/checkin")]
pub async fn client_checkin(
    app_state: Data<AppState>,
    passport: Json<ClientPassport>,
) -> HttpResponse {
    let passport = passport.into_inner();
    if log::log_enabled!(log::Level::Debug) {
        log::debug!(
            "Check-in of client '{}' running version '{}' with fingerprint version {}.",
            passport.client_id,
            passport.version,
            passport.fpv
        );
    }
    match app_state
        .core
        .checkin_client(
            &passport.client_id,
            &passport.client_token,
            passport.fpv,
            &passport.fp,
            &passport.ua,
            &passport.uad,
        )
        .await
    {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })),
        Err(e) => ApiErrorMapper::to_response(e),
    }
}
