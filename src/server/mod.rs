mod extract;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{health, rides, routes};
use crate::{
    api::API,
    auth::TokenVerifier,
    error::{server_error, Error},
};

pub type DynAPI = Arc<dyn API + Send + Sync>;

pub fn router(api: DynAPI, verifier: Arc<TokenVerifier>) -> Router {
    Router::new()
        .route("/rides", post(rides::book).get(rides::list))
        .route("/rides/:id", get(rides::find))
        .route("/routes/optimize", post(routes::optimize))
        .route("/health", get(health))
        .layer(Extension(api))
        .layer(Extension(verifier))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE, AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(api: DynAPI, verifier: Arc<TokenVerifier>, addr: SocketAddr) -> Result<(), Error> {
    let app = router(api, verifier);

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(server_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Role, User};
    use crate::db::seed_drivers;
    use crate::engine::testing::{engine_with, Reply};
    use crate::entities::Driver;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const SECRET: &str = "server-test-secret";

    fn app(drivers: Vec<Driver>, reply: Reply) -> Router {
        let (engine, _) = engine_with(drivers, reply);

        router(Arc::new(engine), Arc::new(TokenVerifier::new(SECRET)))
    }

    fn token(id: &str) -> String {
        let user = User::new(id, format!("{id}@example.com"), Role::Rider);

        TokenVerifier::new(SECRET)
            .issue(&user, chrono::Duration::hours(1))
            .unwrap()
    }

    fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_with(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, body)
    }

    fn trip() -> Value {
        json!({ "pickup": "123 Main St", "destination": "456 Oak Ave" })
    }

    #[tokio::test]
    async fn booking_requires_a_token() {
        let app = app(seed_drivers(), Reply::Empty);

        let (status, body) = send(&app, post_json("/rides", None, trip())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 102);

        let (status, _) = send(&app, post_json("/rides", Some("not-a-jwt"), trip())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn booking_then_reading_back() {
        let app = app(seed_drivers(), Reply::Empty);
        let rider = token("1");

        let (status, body) = send(&app, post_json("/rides", Some(&rider), trip())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Ride booked successfully");
        assert_eq!(body["ride"]["status"], "booked");
        assert_eq!(body["ride"]["riderId"], "1");
        assert!(!body["ride"]["driverId"].as_str().unwrap().is_empty());
        assert!(body["ride"]["pricing"]["estimatedTotal"].as_f64().unwrap() > 0.0);
        assert!(body["aiOptimization"]["optimalChoice"].is_string());

        let id = body["ride"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, get_with(&format!("/rides/{id}"), &rider)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ride"]["id"], id.as_str());

        let (status, body) = send(&app, get_with(&format!("/rides?rideId={id}"), &rider)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ride"]["id"], id.as_str());

        let (status, body) = send(&app, get_with("/rides", &rider)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["rides"][0]["id"], id.as_str());
    }

    #[tokio::test]
    async fn missing_destination_is_a_bad_request() {
        let app = app(seed_drivers(), Reply::Empty);

        let (status, body) = send(
            &app,
            post_json("/rides", Some(&token("1")), json!({ "pickup": "123 Main St" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 101);
    }

    #[tokio::test]
    async fn free_form_preferences_still_book() {
        let app = app(seed_drivers(), Reply::Empty);

        let (status, body) = send(
            &app,
            post_json(
                "/rides",
                Some(&token("1")),
                json!({
                    "pickup": "123 Main St",
                    "destination": "456 Oak Ave",
                    "preferences": { "priority": "shortest", "ecoFriendly": "yes" }
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["ride"]["status"], "booked");
    }

    #[tokio::test]
    async fn malformed_bodies_are_bad_requests() {
        let app = app(seed_drivers(), Reply::Empty);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/rides")
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", token("1")))
            .body(Body::from("{\"pickup\": "))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 101);

        let (status, body) = send(
            &app,
            post_json("/rides", Some(&token("1")), json!({ "pickup": 42, "destination": "B" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 101);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/routes/optimize")
            .body(Body::from("pickup=A"))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 101);
    }

    #[tokio::test]
    async fn second_booking_without_drivers_is_not_found() {
        let single = seed_drivers().into_iter().take(1).collect();
        let app = app(single, Reply::Empty);
        let rider = token("1");

        let (status, _) = send(&app, post_json("/rides", Some(&rider), trip())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, post_json("/rides", Some(&rider), trip())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 104);
        assert_eq!(body["error"], "no drivers available");
    }

    #[tokio::test]
    async fn other_riders_rides_are_not_found() {
        let app = app(seed_drivers(), Reply::Empty);

        let (_, body) = send(&app, post_json("/rides", Some(&token("1")), trip())).await;
        let id = body["ride"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(&app, get_with(&format!("/rides/{id}"), &token("2"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, get_with("/rides", &token("2"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn route_optimization_is_public_and_falls_back() {
        let app = app(seed_drivers(), Reply::Answer("no structured data today".into()));

        let (status, body) = send(
            &app,
            post_json(
                "/routes/optimize",
                None,
                json!({ "pickup": "A", "destination": "B", "preferences": { "priority": "cheapest" } }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["pickup"], "A");
        assert_eq!(body["routes"].as_array().unwrap().len(), 3);
        assert_eq!(body["routes"][0]["name"], "Fastest Route");
        assert_eq!(body["aiInsights"]["optimalChoice"], body["routes"][0]["id"]);
        assert!(body["generatedAt"].is_string());
    }

    #[tokio::test]
    async fn route_optimization_upstream_failure_is_internal() {
        let app = app(seed_drivers(), Reply::Unavailable);

        let (status, body) = send(
            &app,
            post_json("/routes/optimize", None, json!({ "pickup": "A", "destination": "B" })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal Server Error");
    }

    #[tokio::test]
    async fn route_optimization_rejects_empty_fields() {
        let app = app(seed_drivers(), Reply::Empty);

        let (status, _) = send(
            &app,
            post_json("/routes/optimize", None, json!({ "pickup": "", "destination": "B" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn preflight_is_answered_without_auth() {
        let app = app(seed_drivers(), Reply::Empty);

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/rides")
            .header("origin", "http://localhost:5173")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = app(Vec::new(), Reply::Empty);

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
