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

//! API resource for minting a single identifier.

use crate::rest_api::AppState;
use actix_web::HttpResponse;
use actix_web::get;
use actix_web::http::header::ContentType;
use actix_web::web::Data;

/// Mint one identifier and return its textual form.
#[utoipa::path(
    tag = "probe",
    responses(
        (status = 200, description = "Ok. The minted identifier.", body = String),
        (status = 500, description = "The generator window has closed."),
    ),
)]
#[get("/idz")]
pub async fn idz(app_state: Data<AppState>) -> HttpResponse {
    match app_state.core.generate_id_string() {
        Ok(id) => HttpResponse::Ok().content_type(ContentType::json()).body(id),
        Err(e) => {
            log::error!("Failed to mint an identifier: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
