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

//! API resources for view submission and view counter lookup.

use crate::rest_api::AppState;
use crate::rest_api::common::ApiErrorMapper;
use actix_web::HttpResponse;
use actix_web::get;
use actix_web::post;
use actix_web::web::Data;
use actix_web::web::Json;
use actix_web::web::Query;
use serde::Deserialize;
use serde::Serialize;
use utoipa::ToSchema;

/// A view or like submission with client credentials.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EventRequest {
    /// Textual client identifier.
    pub client_id: String,
    /// Opaque bearer token.
    pub client_token: String,
    /// The URL the event applies to.
    pub url: String,
}

/// Counter lookup query.
#[derive(Debug, Deserialize)]
pub struct CountQuery {
    /// The URL to look up, normalized before the query.
    pub url: String,
}

/// A counter lookup response.
#[derive(Serialize, ToSchema)]
pub struct CountResponse {
    /// Normalized URL the counter belongs to.
    pub url: String,
    /// Counted events.
    pub count: i64,
}

/// Record one view of a URL.
///
/// Views are not deduplicated: every submission increments the counter.
#[utoipa::path(
    tag = "telemetry",
    responses(
        (status = 200, description = "Ok. View recorded."),
        (status = 400, description = "Bad request. Malformed body, URL or client identifier."),
        (status = 401, description = "Unauthorized: the token does not match."),
        (status = 500, description = "Internal server error."),
    ),
)]
#[post("/client/view")]
pub async fn client_view(app_state: Data<AppState>, request: Json<EventRequest>) -> HttpResponse {
    match app_state
        .core
        .record_view(&request.client_id, &request.client_token, &request.url)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })),
        Err(e) => ApiErrorMapper::to_response(e),
    }
}

/// Look up the view counter of a URL.
#[utoipa::path(
    tag = "telemetry",
    params(("url" = String, Query, description = "The URL to look up.")),
    responses(
        (
            status = 200,
            description = "Ok. The counter, zero when the URL has never been counted.",
            body = CountResponse,
        ),
        (status = 400, description = "Bad request. Missing or invalid URL."),
        (status = 404, description = "The URL is not tracked at all."),
    ),
)]
#[get("/view/count")]
pub async fn view_count(app_state: Data<AppState>, query: Query<CountQuery>) -> HttpResponse {
    match app_state.core.view_count(&query.url).await {
        Ok((url, count)) => HttpResponse::Ok().json(CountResponse { url, count }),
        Err(e) => ApiErrorMapper::to_response(e),
    }
}
