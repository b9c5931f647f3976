use axum::{routing::get, routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::api::flyovers as flyover_handlers;
use super::api::location as location_handlers;
use super::api::satellites as satellite_handlers;
use super::api::tracker as tracker_handlers;
use super::api_doc::ApiDoc;
use super::config::Config;
use super::state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Satellite selection
        .route("/api/satellites", get(satellite_handlers::list))
        .route(
            "/api/satellites/{norad_id}/select",
            post(satellite_handlers::select),
        )
        // Flyovers
        .route(
            "/api/flyovers",
            post(flyover_handlers::calculate).get(flyover_handlers::list),
        )
        .route(
            "/api/flyovers/{index}/select",
            post(flyover_handlers::select),
        )
        .route("/api/flyovers/reset", post(flyover_handlers::reset))
        // Live tracking
        .route("/api/tracker/position", get(tracker_handlers::position))
        .route("/api/orbit", get(tracker_handlers::orbit))
        .route("/api/scene", get(tracker_handlers::scene))
        .route("/api/location", get(location_handlers::current))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let state = AppState::from_config(config).map_err(std::io::Error::other)?;

    let tracking = state.clone();
    tokio::spawn(async move {
        if let Err(e) = tracking.track_default_satellite().await {
            log::warn!("Failed to start tracking: {}", e);
        }
    });

    let session = state.session.clone();
    let app = router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
    session.shutdown().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::elements::{fixtures, HttpElementSource};
    use crate::propagator::Sgp4Propagator;
    use axum::{extract::Path, http::StatusCode, Json};
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn tle(Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
        if id == "25544" {
            Ok(Json(json!({
                "line1": fixtures::ISS_LINE1,
                "line2": fixtures::ISS_LINE2,
            })))
        } else {
            Err(StatusCode::NOT_FOUND)
        }
    }

    async fn app() -> (String, AppState) {
        let _ = env_logger::builder().is_test(true).try_init();

        let tle_base = spawn(Router::new().route("/api/tle/{id}", get(tle))).await;
        let config = Config::from_yaml(&format!(
            "elements:\n  base_url: {}/api/tle\nprediction:\n  default_days: 2\n",
            tle_base
        ))
        .unwrap();
        let source =
            HttpElementSource::new(&config.elements.base_url, Duration::from_secs(5)).unwrap();
        let clock = FixedClock(Utc.with_ymd_and_hms(2008, 9, 20, 12, 0, 0).unwrap());
        let state = AppState::new(config, source, Arc::new(Sgp4Propagator::new()), Arc::new(clock));
        let base = spawn(router(state.clone())).await;
        (base, state)
    }

    #[tokio::test]
    async fn predicts_and_selects_a_flyover() {
        let (base, state) = app().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base}/api/flyovers"))
            .json(&json!({ "latitude": 40.0, "longitude": -75.0 }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let passes: Vec<Value> = response.json().await.unwrap();
        assert!(!passes.is_empty());
        assert!(passes[0]["max_elevation_deg"].as_i64().unwrap() >= 10);

        let listed: Vec<Value> = client
            .get(format!("{base}/api/flyovers"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(listed.len(), passes.len());

        let scene: Value = client
            .post(format!("{base}/api/flyovers/0/select"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(scene["trajectory"].as_array().unwrap().len(), 120);
        assert_eq!(scene["direction_indicators"].as_array().unwrap().len(), 5);
        assert!(state.scene.snapshot().flyover.is_some());

        let response = client
            .post(format!("{base}/api/flyovers/reset"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 204);
        assert!(state.scene.snapshot().flyover.is_none());
    }

    #[tokio::test]
    async fn rejects_out_of_range_latitude() {
        let (base, _state) = app().await;
        let response = reqwest::Client::new()
            .post(format!("{base}/api/flyovers"))
            .json(&json!({ "latitude": 90.0001, "longitude": 0.0 }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Latitude must be between -90 and 90 degrees.");
    }

    #[tokio::test]
    async fn rejects_look_ahead_beyond_the_cap() {
        let (base, state) = app().await;
        let response = reqwest::Client::new()
            .post(format!("{base}/api/flyovers"))
            .json(&json!({ "latitude": 47.0, "longitude": 8.5, "days": 4294967295u32 }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
        assert!(!state.session.is_busy());
    }

    #[tokio::test]
    async fn lists_and_selects_satellites() {
        let (base, state) = app().await;
        let client = reqwest::Client::new();

        let body: Value = client
            .get(format!("{base}/api/satellites"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["satellites"].as_array().unwrap().len(), 20);
        assert_eq!(body["selected"]["model_file"], "ISS.dae");

        let response = client
            .post(format!("{base}/api/satellites/99999/select"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 404);

        // Listed, but the element source does not know it.
        let response = client
            .post(format!("{base}/api/satellites/33591/select"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 502);
        assert_eq!(state.session.satellite().norad_id, "33591");

        let response = client
            .post(format!("{base}/api/satellites/25544/select"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let orbit: Vec<Value> = client
            .get(format!("{base}/api/orbit"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(!orbit.is_empty());
        state.session.shutdown().await;
    }

    #[tokio::test]
    async fn location_requires_configuration() {
        let (base, _state) = app().await;
        let response = reqwest::get(format!("{base}/api/location")).await.unwrap();
        assert_eq!(response.status(), 503);
    }

    #[tokio::test]
    async fn serves_openapi_document() {
        let (base, _state) = app().await;
        let doc: Value = reqwest::get(format!("{base}/api-doc/openapi.json"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(doc["paths"]["/api/flyovers"].is_object());
    }
}
