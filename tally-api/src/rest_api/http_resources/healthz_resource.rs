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

//! API resource for the health probe.

use crate::rest_api::AppState;
use actix_web::HttpResponse;
use actix_web::get;
use actix_web::web::Data;

/// Probe the health of the service.
///
/// Healthy means the database answers its echo query and the ID generator
/// mints under a live lease window.
#[utoipa::path(
    tag = "probe",
    responses(
        (status = 200, description = "Ok. Database and ID generator are healthy."),
        (status = 500, description = "Database or ID generator failed."),
    ),
)]
#[get("/healthz")]
pub async fn healthz(app_state: Data<AppState>) -> HttpResponse {
    match app_state.core.health_check().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })),
        Err(e) => {
            log::error!("Health check failed: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({ "status": "error" }))
        }
    }
}
