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

//! API resource for batched counter lookups.

use crate::rest_api::AppState;
use crate::rest_api::common::ApiErrorMapper;
use actix_web::HttpResponse;
use actix_web::post;
use actix_web::web::Data;
use actix_web::web::Json;
use serde::Deserialize;
use serde::Serialize;
use utoipa::ToSchema;

/// Batched counter lookup request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkCountsRequest {
    /// URLs to look up. Normalized and deduplicated, preserving first-seen
    /// order.
    urls: Vec<String>,
}

/// View and like counters of one URL.
#[derive(Serialize, ToSchema)]
pub struct BulkCountEntry {
    /// Normalized URL.
    url: String,
    /// Counted views.
    view_count: i64,
    /// Counted likes.
    like_count: i64,
}

/// Batched counter lookup response.
#[derive(Serialize, ToSchema)]
pub struct BulkCountsResponse {
    /// One entry per deduplicated input URL in first-seen order. Unknown
    /// URLs report zero counts.
    results: Vec<BulkCountEntry>,
}

/// Look up view and like counters for a list of URLs.
#[utoipa::path(
    tag = "telemetry",
    responses(
        (
            status = 200,
            description = "Ok. One entry per deduplicated URL in first-seen order.",
            body = BulkCountsResponse,
        ),
        (status = 400, description = "Bad request. Empty list or an invalid URL."),
        (status = 500, description = "Internal server error."),
    ),
)]
#[post("/counts/bulk")]
pub async fn bulk_counts(
    app_state: Data<AppState>,
    request: Json<BulkCountsRequest>,
) -> HttpResponse {
    match app_state.core.bulk_counts(&request.urls).await {
        Ok(rows) => HttpResponse::Ok().json(BulkCountsResponse {
            results: rows
                .into_iter()
                .map(|row| BulkCountEntry {
                    url: row.url,
                    view_count: row.view_count,
                    like_count: row.like_count,
                })
                .collect(),
        }),
        Err(e) => ApiErrorMapper::to_response(e),
    }
}
