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

//! Mapper of app errors to HTTP responses.

use actix_web::HttpResponse;
pub use tally_core::TelemetryError;
use tally_core::TelemetryErrorKind;

/// Mapper of app errors to HTTP responses.
pub struct ApiErrorMapper {}

impl ApiErrorMapper {
    /// Return the REST API response for a [TelemetryError].
    ///
    /// Lease internals never surface here: a coordinator whose lease lapsed
    /// shows up as a failed ID mint, which is an internal error like any
    /// other.
    pub fn to_response<E: AsRef<TelemetryError>>(e: E) -> HttpResponse {
        let e = e.as_ref();
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("Will respond with error. kind: {} msg: {e:?}", e.kind());
        }
        match e.kind() {
            TelemetryErrorKind::InvalidInput => {
                // HTTP 400
                HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
            }
            TelemetryErrorKind::Unauthorized => {
                // HTTP 401
                HttpResponse::Unauthorized()
                    .json(serde_json::json!({ "status": "unauthorized" }))
            }
            TelemetryErrorKind::NotFound => {
                // HTTP 404
                HttpResponse::NotFound().json(serde_json::json!({ "error": "URL not found" }))
            }
            _other => {
                // HTTP 500
                HttpResponse::InternalServerError().finish()
            }
        }
    }
}
