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

//! API resource echoing the request as the server saw it.

use crate::rest_api::AppState;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::get;
use actix_web::http::header::ContentType;
use actix_web::web::Data;
use actix_web::web::Query;
use serde::Serialize;
use std::collections::BTreeMap;

/// Echo of a request as the server saw it.
#[derive(Serialize)]
struct RequestEcho {
    /// Query arguments, multi-valued.
    args: BTreeMap<String, Vec<String>>,
    /// Request headers, first value each.
    headers: BTreeMap<String, String>,
    /// Peer address, or the configured proxy header when present.
    origin: String,
    /// Request URI.
    url: String,
}

/// Echo query arguments, headers and the caller's address.
///
/// When an `IP_HEADER` is configured and present, its first
/// comma-separated entry wins over the transport peer address.
#[utoipa::path(
    tag = "probe",
    responses(
        (status = 200, description = "Ok. The request echo."),
    ),
)]
#[get("/getz")]
pub async fn getz(
    app_state: Data<AppState>,
    query: Query<Vec<(String, String)>>,
    http_request: HttpRequest,
) -> HttpResponse {
    let mut args: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in query.into_inner() {
        args.entry(key).or_default().push(value);
    }
    let mut headers = BTreeMap::new();
    for (name, value) in http_request.headers() {
        headers.insert(
            name.as_str().to_owned(),
            value.to_str().unwrap_or_default().to_owned(),
        );
    }
    let mut origin = http_request
        .peer_addr()
        .map(|peer_addr| peer_addr.to_string())
        .unwrap_or_default();
    if let Some(ip_header) = &app_state.ip_header {
        if let Some(real_ip) = http_request
            .headers()
            .get(ip_header.as_str())
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(|header_value_str| header_value_str.split(',').next())
        {
            origin = real_ip.trim().to_owned();
        }
    }
    let echo = RequestEcho {
        args,
        headers,
        origin,
        url: http_request.uri().to_string(),
    };
    match serde_json::to_string_pretty(&echo) {
        Ok(body) => HttpResponse::Ok().content_type(ContentType::json()).body(body),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}
