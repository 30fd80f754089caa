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

//! API resources for like submission and like counter lookup.

use super::view_resource::CountQuery;
use super::view_resource::CountResponse;
use super::view_resource::EventRequest;
use crate::rest_api::AppState;
use crate::rest_api::common::ApiErrorMapper;
use actix_web::HttpResponse;
use actix_web::get;
use actix_web::post;
use actix_web::web::Data;
use actix_web::web::Json;
use actix_web::web::Query;

/// Record a like of a URL.
///
/// Likes are idempotent per (url, client): repeated submissions by the same
/// client leave the counter untouched.
#[utoipa::path(
    tag = "telemetry",
    responses(
        (status = 200, description = "Ok. Like recorded (or already present)."),
        (status = 400, description = "Bad request. Malformed body, URL or client identifier."),
        (status = 401, description = "Unauthorized: the token does not match."),
        (status = 500, description = "Internal server error."),
    ),
)]
#[post("/client/like")]
pub async fn client_like(app_state: Data<AppState>, request: Json<EventRequest>) -> HttpResponse {
    match app_state
        .core
        .record_like(&request.client_id, &request.client_token, &request.url)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })),
        Err(e) => ApiErrorMapper::to_response(e),
    }
}

/// Look up the like counter of a URL.
#[utoipa::path(
    tag = "telemetry",
    params(("url" = String, Query, description = "The URL to look up.")),
    responses(
        (
            status = 200,
            description = "Ok. The counter, zero when the URL has never been liked.",
            body = CountResponse,
        ),
        (status = 400, description = "Bad request. Missing or invalid URL."),
        (status = 404, description = "The URL is not tracked at all."),
    ),
)]
#[get("/like/count")]
pub async fn like_count(app_state: Data<AppState>, query: Query<CountQuery>) -> HttpResponse {
    match app_state.core.like_count(&query.url).await {
        Ok((url, count)) => HttpResponse::Ok().json(CountResponse { url, count }),
        Err(e) => ApiErrorMapper::to_response(e),
    }
}
