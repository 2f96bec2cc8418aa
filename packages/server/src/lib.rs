#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the route planner.
//!
//! Exposes address suggestions and resolution, one-shot route
//! generation, and planner sessions. Each session belongs to one planner
//! mode and keeps its own points, options and last generated route.

mod error;
mod handlers;
pub mod interactive;
pub mod sessions;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use route_planner_geocoder::resolver::AddressResolver;

pub use error::ServerError;
use sessions::SessionStore;

/// Shared application state.
pub struct AppState {
    /// Suggestion and resolution front end for the configured geocoder.
    pub resolver: AddressResolver,
    /// Open planner sessions.
    pub sessions: SessionStore,
}

impl AppState {
    /// State with no open sessions.
    #[must_use]
    pub fn new(resolver: AddressResolver) -> Self {
        Self {
            resolver,
            sessions: SessionStore::default(),
        }
    }
}

/// Registers every `/api` route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/suggest", web::get().to(handlers::suggest))
            .route("/resolve", web::post().to(handlers::resolve))
            .route("/route", web::post().to(handlers::route))
            .route("/sessions", web::post().to(handlers::create_session))
            .service(
                web::resource("/sessions/{id}")
                    .route(web::get().to(handlers::get_session))
                    .route(web::delete().to(handlers::delete_session)),
            )
            .route(
                "/sessions/{id}/suggest",
                web::get().to(handlers::session_suggest),
            )
            .service(
                web::resource("/sessions/{id}/points")
                    .route(web::post().to(handlers::add_point))
                    .route(web::delete().to(handlers::clear_points)),
            )
            .service(
                web::resource("/sessions/{id}/points/active")
                    .route(web::put().to(handlers::edit_active))
                    .route(web::delete().to(handlers::delete_active)),
            )
            .route(
                "/sessions/{id}/points/select",
                web::post().to(handlers::select_point),
            )
            .route(
                "/sessions/{id}/points/move",
                web::post().to(handlers::move_point),
            )
            .route("/sessions/{id}/slots", web::put().to(handlers::put_slots))
            .route(
                "/sessions/{id}/options",
                web::put().to(handlers::put_options),
            )
            .route(
                "/sessions/{id}/route",
                web::post().to(handlers::generate_route),
            ),
    );
}

/// Where the server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl ServerConfig {
    pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
    pub const DEFAULT_PORT: u16 = 8080;

    /// Reads `BIND_ADDR` and `PORT`, keeping the defaults for anything
    /// missing or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: Self::DEFAULT_BIND_ADDR.to_string(),
            port: Self::DEFAULT_PORT,
        }
    }
}

/// Starts the route planner API server configured from the environment.
///
/// The caller provides the async runtime (e.g. via `#[actix_web::main]`)
/// and initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    serve(ServerConfig::from_env(), AddressResolver::from_env()).await
}

/// Starts the Actix-Web HTTP server with an explicit configuration.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn serve(config: ServerConfig, resolver: AddressResolver) -> std::io::Result<()> {
    if !resolver.is_available() {
        log::warn!("No geocoder configured: suggestions are disabled and addresses are echoed");
    }

    let state = web::Data::new(AppState::new(resolver));
    let ServerConfig { bind_addr, port } = config;

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test;
    use route_planner_geocoder::resolver::ResolverConfig;
    use route_planner_geocoder::{GeocodeError, GeocodedPlace, GeocodingClient, GeocodingProvider};
    use route_planner_route_models::{LocationBias, Suggestion};
    use serde_json::{Value, json};

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState::new(AddressResolver::unavailable()))
    }

    /// Answers every autocomplete with one suggestion naming the bias it
    /// was given.
    struct BiasEcho;

    #[async_trait::async_trait]
    impl GeocodingClient for BiasEcho {
        fn provider(&self) -> GeocodingProvider {
            GeocodingProvider::GooglePlaces
        }

        async fn autocomplete(
            &self,
            text: &str,
            bias: Option<&LocationBias>,
        ) -> Result<Vec<Suggestion>, GeocodeError> {
            let description = bias.map_or_else(
                || format!("{text} (anywhere)"),
                |b| {
                    let LocationBias { center, radius_m } = b;
                    format!("{text} near {},{} within {radius_m}m", center.lat, center.lng)
                },
            );
            Ok(vec![Suggestion {
                description,
                place_id: "echo".to_string(),
            }])
        }

        async fn place_details(
            &self,
            _place_id: &str,
        ) -> Result<Option<GeocodedPlace>, GeocodeError> {
            Ok(None)
        }

        async fn geocode(&self, _text: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
            Ok(None)
        }
    }

    fn echo_state() -> web::Data<AppState> {
        let client: Arc<dyn GeocodingClient> = Arc::new(BiasEcho);
        web::Data::new(AppState::new(AddressResolver::new(
            Some(client),
            ResolverConfig::default(),
        )))
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(configure)).await
        };
    }

    #[actix_web::test]
    async fn health_reports_missing_geocoder() {
        let app = app!(state());
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["geocoder"], false);
    }

    #[actix_web::test]
    async fn suggest_without_geocoder_is_empty() {
        let app = app!(state());
        let req = test::TestRequest::get()
            .uri("/api/suggest?term=Plaza%20Mayor&lat=40.4&lng=-3.7")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!([]));
    }

    #[actix_web::test]
    async fn resolve_echoes_label() {
        let app = app!(state());
        let req = test::TestRequest::post()
            .uri("/api/resolve")
            .set_json(json!({"label": "Plaza Mayor", "placeId": "abc"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["query"], "Plaza Mayor");
        assert_eq!(body["address"], "Plaza Mayor");
        assert!(body.get("lat").is_none());
    }

    #[actix_web::test]
    async fn route_builds_all_links() {
        let app = app!(state());
        let req = test::TestRequest::post()
            .uri("/api/route")
            .set_json(json!({
                "points": ["Madrid", {"address": "Zaragoza"}, [41.4, 2.2]],
                "mode": "walking",
                "avoid": ["tolls", "nonsense"],
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let google = body["google"]["url"].as_str().unwrap();
        assert!(google.contains("travelmode=walking"), "{google}");
        assert!(google.contains("avoid=tolls&"), "{google}");
        assert_eq!(
            body["waze"]["url"],
            "https://waze.com/ul?ll=41.4,2.2&navigate=yes"
        );
        let apple = body["apple"]["url"].as_str().unwrap();
        assert!(
            apple.starts_with("https://maps.apple.com/?dirflg=d&"),
            "{apple}"
        );
    }

    #[actix_web::test]
    async fn route_with_one_point_is_bad_request() {
        let app = app!(state());
        let req = test::TestRequest::post()
            .uri("/api/route")
            .set_json(json!({"points": ["Madrid"]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "A route needs at least 2 points (got 1)");
    }

    #[actix_web::test]
    async fn unknown_session_is_not_found() {
        let app = app!(state());
        let req = test::TestRequest::get()
            .uri("/api/sessions/00000000-0000-0000-0000-000000000000")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    macro_rules! create_session {
        ($app:expr, $mode:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/sessions")
                .set_json(json!({"mode": $mode}))
                .to_request();
            let body: Value = test::call_and_read_body_json(&$app, req).await;
            assert_eq!(body["mode"], $mode);
            body["id"].as_str().unwrap().to_string()
        }};
    }

    #[actix_web::test]
    async fn professional_session_flow() {
        let state = state();
        let app = app!(state);
        let id = create_session!(app, "professional");

        for value in ["Madrid", "Barcelona", "Zaragoza"] {
            let req = test::TestRequest::post()
                .uri(&format!("/api/sessions/{id}/points"))
                .set_json(json!({"value": value}))
                .to_request();
            assert!(test::call_service(&app, req).await.status().is_success());
        }

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{id}/points"))
            .set_json(json!({"value": "ab"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{id}/points/move"))
            .set_json(json!({"direction": "up"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["moved"], true);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{id}/route"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let google = body["google"]["url"].as_str().unwrap();
        assert!(
            google.contains("waypoints=optimize%3Atrue%7CZaragoza"),
            "{google}"
        );

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{id}"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["mode"], "professional");
        assert_eq!(body["canRoute"], true);
        assert_eq!(body["points"]["activeIndex"], 1);
        assert!(body["lastRoute"].is_object());

        let req = test::TestRequest::delete()
            .uri(&format!("/api/sessions/{id}/points/active"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["removed"]["input"]["text"], "Zaragoza");

        let req = test::TestRequest::delete()
            .uri(&format!("/api/sessions/{id}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.sessions.len().await, 0);
    }

    #[actix_web::test]
    async fn traveler_session_needs_endpoints() {
        let app = app!(state());
        let id = create_session!(app, "traveler");

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{id}/route"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{id}/slots"))
            .set_json(json!({"origin": "Madrid", "destination": "Barcelona", "stop": "Zaragoza"}))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{id}/options"))
            .set_json(json!({"preset": "economic", "avoid": "ferries"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["options"]["avoid"], json!(["tolls", "ferries"]));

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{id}/route"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["waypoints"][0]["address"], "Zaragoza");
    }

    #[actix_web::test]
    async fn point_edits_are_rejected_for_tourist_sessions() {
        let app = app!(state());
        let id = create_session!(app, "tourist");

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{id}/points"))
            .set_json(json!({"value": "Madrid"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{id}/slots"))
            .set_json(json!({"stopsText": "Sagrada Familia\n\nCasa Batlló\n"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["stops"].as_array().map(Vec::len), Some(2));
    }

    #[actix_web::test]
    async fn session_suggest_falls_back_to_stored_bias() {
        let app = app!(echo_state());
        let id = create_session!(app, "traveler");

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{id}/suggest?term=Plaza%20Mayor"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["description"], "Plaza Mayor (anywhere)");

        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{id}/options"))
            .set_json(json!({
                "bias": {"center": {"lat": 40.4, "lng": -3.7}, "radiusM": 2000},
            }))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{id}/suggest?term=Plaza%20Mayor"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body[0]["description"],
            "Plaza Mayor near 40.4,-3.7 within 2000m"
        );

        let req = test::TestRequest::get()
            .uri(&format!(
                "/api/sessions/{id}/suggest?term=Plaza%20Mayor&lat=41.4&lng=2.2&radius=500"
            ))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body[0]["description"],
            "Plaza Mayor near 41.4,2.2 within 500m"
        );
    }

    #[actix_web::test]
    async fn session_suggest_needs_a_known_session() {
        let app = app!(echo_state());
        let req = test::TestRequest::get()
            .uri("/api/sessions/00000000-0000-0000-0000-000000000000/suggest?term=Plaza")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn changing_preset_replaces_its_avoids() {
        let app = app!(state());
        let id = create_session!(app, "professional");

        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{id}/options"))
            .set_json(json!({"preset": "economic"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["options"]["avoid"], json!(["tolls"]));

        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{id}/options"))
            .set_json(json!({"preset": "fastest"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["options"]["avoid"], json!([]));
    }

    #[actix_web::test]
    async fn full_session_store_is_unavailable() {
        let state = web::Data::new(AppState {
            resolver: AddressResolver::unavailable(),
            sessions: SessionStore::with_limit(1),
        });
        let app = app!(state);
        create_session!(app, "tourist");

        let req = test::TestRequest::post()
            .uri("/api/sessions")
            .set_json(json!({"mode": "tourist"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Too many open sessions (limit 1)");
    }
}
