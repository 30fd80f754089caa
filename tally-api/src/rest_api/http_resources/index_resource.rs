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

//! API resource serving the service banner.

use actix_web::HttpResponse;
use actix_web::get;
use actix_web::http::header::ContentType;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
	<title>Tally Telemetry Service</title>
</head>
<body>
	<h1>Tally Telemetry Service</h1>
	<hr/>
	<p>Welcome to the Tally Telemetry Service!</p>
	<p>Public APIs:</p>
	<ul>
		<li>GET <a href="/healthz">/healthz</a> - Check the health of the service</li>
		<li>GET <a href="/idz">/idz</a> - Generate a new randflake ID</li>
		<li>POST <code>/client/like</code> - Submit a like (JSON: client_id, client_token, url)</li>
		<li>GET <code>/like/count?url=&lt;url&gt;</code> - Get like count for a normalized URL (host + pathname)</li>
		<li>POST <code>/client/view</code> - Submit a view (JSON: client_id, client_token, url)</li>
		<li>GET <code>/view/count?url=&lt;url&gt;</code> - Get view count for a normalized URL (host + pathname)</li>
	</ul>
	<p>Notes:</p>
	<ul>
		<li>URLs are normalized to host + pathname before storage and queries.</li>
		<li>CORS: all origins are allowed.</li>
	</ul>
</body>
</html>"#;

/// Serve the HTML service banner.
#[utoipa::path(
    tag = "probe",
    responses((status = 200, description = "Ok. The service banner.")),
)]
#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(INDEX_HTML)
}
