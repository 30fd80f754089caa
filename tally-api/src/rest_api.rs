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

//! REST API server and resources.

mod http_resources {
    //! API resources

    pub mod bulk_resource;
    pub mod client_resource;
    pub mod getz_resource;
    pub mod healthz_resource;
    pub mod idz_resource;
    pub mod index_resource;
    pub mod like_resource;
    pub mod view_resource;
}
mod common {
    //! Common REST API resources and utils.

    mod api_error_mapper;
    mod cors;

    pub use api_error_mapper::*;
    pub use cors::*;
}

use self::common::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::get;
use actix_web::http::header::ContentType;
use actix_web::web;
use std::sync::Arc;
use tally_core::AppConfig;
use tally_core::TelemetryCore;
use utoipa::OpenApi;

/// Shared state between requests.
#[derive(Clone)]
struct AppState {
    core: Arc<TelemetryCore>,
    /// Request header carrying the real client IP behind a proxy.
    ip_header: Option<String>,
}

/// Run HTTP server.
///
/// Binds the configured address and port (an ephemeral port by default) and
/// reports the bound port as a single JSON line on stdout so that
/// orchestrators can discover where the service listens.
pub async fn run_http_server(
    app_config: &Arc<AppConfig>,
    core: &Arc<TelemetryCore>,
) -> Result<(), Box<dyn core::error::Error>> {
    let app_state = AppState {
        core: Arc::clone(core),
        ip_header: app_config.api.ip_header().map(str::to_owned),
    };
    let app_data = web::Data::<AppState>::new(app_state);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_data.clone())
            .wrap(Cors)
            .service(get_openapi)
            .service(http_resources::index_resource::index)
            .service(http_resources::healthz_resource::healthz)
            .service(http_resources::idz_resource::idz)
            .service(http_resources::getz_resource::getz)
            .service(http_resources::client_resource::client_register)
            .service(http_resources::client_resource::client_status)
            .service(http_resources::client_resource::client_checkin)
            .service(http_resources::view_resource::client_view)
            .service(http_resources::view_resource::view_count)
            .service(http_resources::like_resource::client_like)
            .service(http_resources::like_resource::like_count)
            .service(http_resources::bulk_resource::bulk_counts)
    })
    .disable_signals()
    .shutdown_timeout(5) // Default 30
    .bind((app_config.api.bind_address(), app_config.api.bind_port()))?;
    let bound_port = server
        .addrs()
        .first()
        .map(|addr| addr.port())
        .unwrap_or_default();
    // Startup protocol: one JSON line with the bound port.
    println!("{}", serde_json::json!({ "port": bound_port }));
    log::info!(
        "API described by http://{}:{bound_port}/openapi.json is ready.",
        app_config.api.bind_address(),
    );
    server.run().await?;
    Ok(())
}

/// Serve Open API documentation.
#[get("/openapi.json")]
async fn get_openapi() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(openapi_as_string())
}

/// Get the OpenAPI definition as a pretty JSON String.
pub fn openapi_as_string() -> String {
    #[derive(OpenApi)]
    #[openapi(
        // Use Cargo.toml as source for the "info" section
        paths(
            http_resources::index_resource::index,
            http_resources::healthz_resource::healthz,
            http_resources::idz_resource::idz,
            http_resources::getz_resource::getz,
            http_resources::client_resource::client_register,
            http_resources::client_resource::client_status,
            http_resources::client_resource::client_checkin,
            http_resources::view_resource::client_view,
            http_resources::view_resource::view_count,
            http_resources::like_resource::client_like,
            http_resources::like_resource::like_count,
            http_resources::bulk_resource::bulk_counts,
        )
    )]
    struct ApiDoc;
    ApiDoc::openapi().to_pretty_json().unwrap()
}

#[cfg(test)]
mod test {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use tally_dbp_mem::InMemoryDatabaseProvider;

    async fn test_app_state() -> web::Data<AppState> {
        let dbp = Arc::new(
            InMemoryDatabaseProvider::new()
                .await
                .as_database_provider(),
        );
        let core = TelemetryCore::with_database_provider(dbp, *b"0123456789abcdef")
            .await
            .unwrap();
        web::Data::new(AppState {
            core,
            ip_header: Some("X-Real-IP".to_owned()),
        })
    }

    macro_rules! test_app {
        ($app_data:expr) => {
            test::init_service(
                App::new()
                    .app_data($app_data.clone())
                    .wrap(Cors)
                    .service(http_resources::healthz_resource::healthz)
                    .service(http_resources::idz_resource::idz)
                    .service(http_resources::getz_resource::getz)
                    .service(http_resources::client_resource::client_register)
                    .service(http_resources::client_resource::client_status)
                    .service(http_resources::client_resource::client_checkin)
                    .service(http_resources::view_resource::client_view)
                    .service(http_resources::view_resource::view_count)
                    .service(http_resources::like_resource::client_like)
                    .service(http_resources::like_resource::like_count)
                    .service(http_resources::bulk_resource::bulk_counts),
            )
            .await
        };
    }

    macro_rules! register_client {
        ($app:expr) => {{
            let req = test::TestRequest::post()
                .uri("/client/register")
                .to_request();
            let resp: serde_json::Value = test::call_and_read_body_json(&$app, req).await;
            (
                resp["id"].as_str().unwrap().to_owned(),
                resp["token"].as_str().unwrap().to_owned(),
            )
        }};
    }

    #[actix_web::test]
    async fn healthz_reports_ok() {
        let app = test_app!(test_app_state().await);
        let req = test::TestRequest::get().uri("/healthz").to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["status"], "ok");
    }

    #[actix_web::test]
    async fn idz_returns_a_fixed_width_id() {
        let app = test_app!(test_app_state().await);
        let req = test::TestRequest::get().uri("/idz").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body.len(), tally_dbp::tm::RandflakeId::ENCODED_WIDTH);
    }

    #[actix_web::test]
    async fn register_status_and_token_flip() {
        let app = test_app!(test_app_state().await);
        let req = test::TestRequest::post()
            .uri("/client/register")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let identity: serde_json::Value = test::read_body_json(resp).await;
        let client_id = identity["id"].as_str().unwrap();
        let token = identity["token"].as_str().unwrap();
        assert!(!client_id.is_empty());
        assert!(!token.is_empty());

        let req = test::TestRequest::post()
            .uri("/client/status")
            .set_json(serde_json::json!({
                "client_id": client_id,
                "client_token": token,
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let flipped = format!("{}#", &token[..token.len() - 1]);
        let req = test::TestRequest::post()
            .uri("/client/status")
            .set_json(serde_json::json!({
                "client_id": client_id,
                "client_token": flipped,
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "unauthorized");
    }

    #[actix_web::test]
    async fn checkin_rejects_unsupported_fingerprint_versions() {
        let app = test_app!(test_app_state().await);
        let (client_id, token) = register_client!(app);
        let req = test::TestRequest::post()
            .uri("/client/checkin")
            .set_json(serde_json::json!({
                "client_id": client_id,
                "client_token": token,
                "version": "1.0.0",
                "fpv": 2,
                "fp": "hash",
                "ua": "agent",
                "uad": "{}",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn double_view_counts_twice_and_double_like_once() {
        let app = test_app!(test_app_state().await);
        let (client_id, token) = register_client!(app);
        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/client/view")
                .set_json(serde_json::json!({
                    "client_id": client_id,
                    "client_token": token,
                    "url": "https://ex.com/a/",
                }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
            let req = test::TestRequest::post()
                .uri("/client/like")
                .set_json(serde_json::json!({
                    "client_id": client_id,
                    "client_token": token,
                    "url": "https://ex.com/a/",
                }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }
        let req = test::TestRequest::get()
            .uri("/view/count?url=ex.com/a")
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["url"], "ex.com/a");
        assert_eq!(resp["count"], 2);
        let req = test::TestRequest::get()
            .uri("/like/count?url=ex.com/a")
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["count"], 1);
    }

    #[actix_web::test]
    async fn count_of_an_unknown_url_is_not_found() {
        let app = test_app!(test_app_state().await);
        let req = test::TestRequest::get()
            .uri("/like/count?url=ex.com/q")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "URL not found");
    }

    #[actix_web::test]
    async fn bulk_counts_preserve_first_seen_order() {
        let app = test_app!(test_app_state().await);
        let (client_id, token) = register_client!(app);
        let req = test::TestRequest::post()
            .uri("/client/view")
            .set_json(serde_json::json!({
                "client_id": client_id,
                "client_token": token,
                "url": "ex.com/a",
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        let req = test::TestRequest::post()
            .uri("/counts/bulk")
            .set_json(serde_json::json!({
                "urls": ["ex.com/b", "ex.com/a", "ex.com/b/"],
            }))
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let results = resp["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["url"], "ex.com/b");
        assert_eq!(results[0]["view_count"], 0);
        assert_eq!(results[1]["url"], "ex.com/a");
        assert_eq!(results[1]["view_count"], 1);
    }

    #[actix_web::test]
    async fn cors_echoes_the_origin_and_short_circuits_preflight() {
        let app = test_app!(test_app_state().await);
        let req = test::TestRequest::get()
            .uri("/healthz")
            .insert_header(("Origin", "https://example.org"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let headers = resp.headers();
        assert_eq!(
            headers.get("Access-Control-Allow-Origin").unwrap(),
            "https://example.org"
        );
        assert_eq!(
            headers.get("Access-Control-Allow-Credentials").unwrap(),
            "true"
        );
        assert_eq!(headers.get("Vary").unwrap(), "Origin");

        let req = test::TestRequest::get().uri("/healthz").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );

        let req = test::TestRequest::with_uri("/client/view")
            .method(actix_web::http::Method::OPTIONS)
            .insert_header(("Origin", "https://example.org"))
            .insert_header(("Access-Control-Request-Method", "POST"))
            .insert_header(("Access-Control-Request-Headers", "content-type"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let headers = resp.headers();
        assert_eq!(
            headers.get("Access-Control-Allow-Methods").unwrap(),
            "POST"
        );
        assert_eq!(
            headers.get("Access-Control-Allow-Headers").unwrap(),
            "content-type"
        );
        assert_eq!(headers.get("Access-Control-Max-Age").unwrap(), "86400");
    }

    #[actix_web::test]
    async fn getz_honors_the_configured_ip_header() {
        let app = test_app!(test_app_state().await);
        let req = test::TestRequest::get()
            .uri("/getz?a=1&a=2&b=x")
            .insert_header(("X-Real-IP", "203.0.113.9, 10.0.0.1"))
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["origin"], "203.0.113.9");
        assert_eq!(resp["args"]["a"][1], "2");
        assert_eq!(resp["args"]["b"][0], "x");
        assert_eq!(resp["headers"]["x-real-ip"], "203.0.113.9, 10.0.0.1");
        assert!(resp["url"].as_str().unwrap().contains("/getz"));
    }
}
