//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::common::ApiResponse;
use super::middleware::{auth_middleware, AuthState};
use super::modules::{auth, health, metrics, payments, rentals, request_id, stations};
use crate::application::services::{PaymentService, RentalService};
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::JwtConfig;

/// Everything the REST layer needs, built once at startup
#[derive(Clone)]
pub struct ApiDependencies {
    pub db: DatabaseConnection,
    pub repos: Arc<dyn RepositoryProvider>,
    pub rentals: Arc<RentalService>,
    pub payments: Arc<PaymentService>,
    pub jwt_config: JwtConfig,
    pub metrics: PrometheusHandle,
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT from /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        auth::get_current_user,
        stations::list_stations,
        stations::list_available,
        stations::list_returnable,
        stations::inventory,
        rentals::start_rental,
        rentals::list_rentals,
        rentals::active_rental,
        rentals::get_rental,
        rentals::return_powerbank,
        rentals::reopen_lock,
        payments::create_payment,
        payments::payment_status,
        payments::payment_notification,
    ),
    components(
        schemas(
            ApiResponse<String>,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::RegisterRequest,
            auth::UserInfo,
            auth::ProfileResponse,
            stations::StationDto,
            stations::InventoryDto,
            rentals::TransactionDto,
            rentals::StartRentalRequest,
            rentals::ReturnRequest,
            rentals::ReopenResponse,
            payments::CreatePaymentRequest,
            payments::PaymentHandleDto,
            payments::PaymentStatusDto,
            payments::NotificationPayload,
            payments::NotificationAck,
            health::HealthResponse,
            health::ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and database reachability"),
        (name = "Authentication", description = "Registration, login (JWT) and profile"),
        (name = "Stations", description = "Station map listings and inventory audit"),
        (name = "Rentals", description = "Start, return and re-open rentals"),
        (name = "Payments", description = "Payment-gated rentals and the gateway webhook"),
    ),
    info(
        title = "Powerbank Rental API",
        version = "1.0.0",
        description = "Rent a powerbank at one station, return it at any station with a free slot",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

pub fn create_api_router(deps: ApiDependencies) -> Router {
    let middleware_state = AuthState {
        jwt_config: deps.jwt_config.clone(),
    };
    let require_auth = || middleware::from_fn_with_state(middleware_state.clone(), auth_middleware);

    let auth_state = auth::AuthHandlerState {
        repos: deps.repos.clone(),
        rentals: deps.rentals.clone(),
        jwt_config: deps.jwt_config.clone(),
    };
    let station_state = stations::StationState {
        rentals: deps.rentals.clone(),
    };
    let payment_state = payments::PaymentState {
        payments: deps.payments.clone(),
    };

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .with_state(auth_state.clone());

    let auth_protected_routes = Router::new()
        .route("/me", get(auth::get_current_user))
        .layer(require_auth())
        .with_state(auth_state);

    let station_routes = Router::new()
        .route("/", get(stations::list_stations))
        .route("/available", get(stations::list_available))
        .route("/returnable", get(stations::list_returnable))
        .with_state(station_state.clone());

    let station_protected_routes = Router::new()
        .route("/audit", get(stations::inventory))
        .layer(require_auth())
        .with_state(station_state);

    let rental_routes = Router::new()
        .route("/", get(rentals::list_rentals).post(rentals::start_rental))
        .route("/active", get(rentals::active_rental))
        .route("/{id}", get(rentals::get_rental))
        .route("/{id}/return", post(rentals::return_powerbank))
        .route("/{id}/reopen", post(rentals::reopen_lock))
        .layer(require_auth())
        .with_state(rentals::RentalState {
            rentals: deps.rentals.clone(),
        });

    let payment_routes = Router::new()
        .route("/", post(payments::create_payment))
        .route("/{id}/status", get(payments::payment_status))
        .layer(require_auth())
        .with_state(payment_state.clone());

    let webhook_routes = Router::new()
        .route("/notification", post(payments::payment_notification))
        .with_state(payment_state);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            db: deps.db.clone(),
            started_at: Arc::new(Instant::now()),
        });

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .with_state(metrics::MetricsState {
            handle: deps.metrics.clone(),
        });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/auth", auth_protected_routes)
        .nest("/api/v1/stations", station_routes)
        .nest("/api/v1/stations", station_protected_routes)
        .nest("/api/v1/rentals", rental_routes)
        .nest("/api/v1/payments", payment_routes)
        .nest("/api/v1/payments", webhook_routes)
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::Service;

    use super::*;
    use crate::application::ports::{GatewayError, PaymentGateway};
    use crate::application::services::{LockDispatchConfig, LockDispatcher, PaymentSettings};
    use crate::domain::payment::{GatewayStatus, PaymentRequest, PaymentSession};
    use crate::infrastructure::database::seed::{insert_station, StationSeed};
    use crate::infrastructure::database::test_database;
    use crate::infrastructure::{SeaOrmRepositoryProvider, SimulatedLockHardware};
    use crate::interfaces::http::modules::metrics::prometheus_handle;

    /// Gateway that answers every status query with `status`, or fails
    /// while `down` is set.
    struct ScriptedGateway {
        status: Mutex<GatewayStatus>,
        down: AtomicBool,
    }

    #[async_trait]
    impl PaymentGateway for ScriptedGateway {
        async fn create_payment(
            &self,
            request: &PaymentRequest,
        ) -> Result<PaymentSession, GatewayError> {
            Ok(PaymentSession {
                token: format!("tok-{}", request.order_id),
                redirect_url: format!("https://pay.test/{}", request.order_id),
            })
        }

        async fn query_status(&self, _order_id: &str) -> Result<GatewayStatus, GatewayError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(GatewayError::Transport("connection refused".into()));
            }
            Ok(self.status.lock().unwrap().clone())
        }
    }

    struct TestApp {
        router: Router,
        gateway: Arc<ScriptedGateway>,
        db: DatabaseConnection,
    }

    async fn app() -> TestApp {
        let db = test_database().await;
        insert_station(
            &db,
            &StationSeed {
                name: "Kantin".into(),
                latitude: -7.28,
                longitude: 112.79,
                capacity: 2,
                units: 1,
                address: "sim".into(),
            },
            1,
        )
        .await
        .unwrap();

        let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let lock = Arc::new(SimulatedLockHardware::new(Duration::ZERO, Duration::ZERO));
        let locks = Arc::new(LockDispatcher::new(
            lock.clone(),
            lock,
            LockDispatchConfig::default(),
        ));
        let gateway = Arc::new(ScriptedGateway {
            status: Mutex::new(GatewayStatus::Pending),
            down: AtomicBool::new(false),
        });

        let deps = ApiDependencies {
            db: db.clone(),
            repos: repos.clone(),
            rentals: Arc::new(RentalService::new(repos.clone(), locks.clone())),
            payments: Arc::new(PaymentService::new(
                repos,
                gateway.clone(),
                locks,
                PaymentSettings::default(),
            )),
            jwt_config: JwtConfig::new("router-test", 1),
            metrics: prometheus_handle(),
        };
        TestApp {
            router: create_api_router(deps),
            gateway,
            db,
        }
    }

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();

        let mut svc = router.clone().into_service();
        let resp = svc.call(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn login(router: &Router, username: &str) -> String {
        let (status, _) = send(
            router,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "secret123"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            router,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"username": username, "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_and_public_listings() {
        let app = app().await;

        let (status, body) = send(&app.router, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"]["status"], "ok");

        let (status, body) = send(&app.router, "GET", "/api/v1/stations/available", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["powerbank_left"], 1);
        assert!(body["data"][0].get("address").is_none());
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        let app = app().await;
        for (method, uri) in [
            ("GET", "/api/v1/rentals"),
            ("POST", "/api/v1/rentals"),
            ("GET", "/api/v1/stations/audit"),
            ("GET", "/api/v1/auth/me"),
        ] {
            let (status, body) = send(&app.router, method, uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body["success"], false);
        }
    }

    #[tokio::test]
    async fn rent_return_and_conflicts_over_http() {
        let app = app().await;
        let token = login(&app.router, "alice").await;

        let (status, body) = send(
            &app.router,
            "POST",
            "/api/v1/rentals",
            Some(&token),
            Some(json!({"station_id": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["status"], "Ongoing");
        let tx_id = body["data"]["id"].as_i64().unwrap();

        let (status, _) = send(
            &app.router,
            "POST",
            "/api/v1/rentals",
            Some(&token),
            Some(json!({"station_id": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(&app.router, "GET", "/api/v1/rentals/active", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], tx_id);

        let uri = format!("/api/v1/rentals/{tx_id}/return");
        let (status, body) =
            send(&app.router, "POST", &uri, Some(&token), Some(json!({"station_id": 1}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "Returned");

        let (status, _) =
            send(&app.router, "POST", &uri, Some(&token), Some(json!({"station_id": 1}))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(&app.router, "GET", "/api/v1/stations/audit", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["consistent"], true);
    }

    #[tokio::test]
    async fn foreign_rental_is_not_found() {
        let app = app().await;
        let alice = login(&app.router, "alice").await;
        let bob = login(&app.router, "bob").await;

        let (_, body) = send(
            &app.router,
            "POST",
            "/api/v1/rentals",
            Some(&alice),
            Some(json!({"station_id": 1})),
        )
        .await;
        let uri = format!("/api/v1/rentals/{}", body["data"]["id"]);

        let (status, _) = send(&app.router, "GET", &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn payment_settles_through_webhook() {
        let app = app().await;
        let token = login(&app.router, "carol").await;

        let (status, body) = send(
            &app.router,
            "POST",
            "/api/v1/payments",
            Some(&token),
            Some(json!({"station_id": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let order_id = body["data"]["order_id"].as_str().unwrap().to_string();
        let status_uri = format!("/api/v1/payments/{}/status", body["data"]["transaction_id"]);

        let (_, body) = send(&app.router, "GET", &status_uri, Some(&token), None).await;
        assert_eq!(body["data"]["status"], "pending");

        *app.gateway.status.lock().unwrap() = GatewayStatus::Settlement;
        let (status, body) = send(
            &app.router,
            "POST",
            "/api/v1/payments/notification",
            None,
            Some(json!({"order_id": order_id, "transaction_status": "settlement"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));

        let (_, body) = send(&app.router, "GET", &status_uri, Some(&token), None).await;
        assert_eq!(body["data"]["status"], "success");

        let inventory = SeaOrmRepositoryProvider::new(app.db.clone())
            .stations()
            .inventory_report()
            .await
            .unwrap();
        assert_eq!(inventory[0].powerbank_left, 0);
        assert!(inventory[0].is_consistent());
    }

    #[tokio::test]
    async fn webhook_without_order_is_rejected() {
        let app = app().await;
        let (status, _) = send(
            &app.router,
            "POST",
            "/api/v1/payments/notification",
            None,
            Some(json!({"transaction_status": "settlement"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn webhook_for_unknown_order_is_acknowledged() {
        let app = app().await;
        *app.gateway.status.lock().unwrap() = GatewayStatus::Capture;
        let (status, body) = send(
            &app.router,
            "POST",
            "/api/v1/payments/notification",
            None,
            Some(json!({"order_id": "ORDER-0-deadbeef"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn webhook_during_gateway_outage_asks_for_redelivery() {
        let app = app().await;
        let token = login(&app.router, "dave").await;
        let (_, body) = send(
            &app.router,
            "POST",
            "/api/v1/payments",
            Some(&token),
            Some(json!({"station_id": 1})),
        )
        .await;
        let order_id = body["data"]["order_id"].as_str().unwrap().to_string();

        app.gateway.down.store(true, Ordering::SeqCst);
        let (status, body) = send(
            &app.router,
            "POST",
            "/api/v1/payments/notification",
            None,
            Some(json!({"order_id": order_id})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], false);

        app.gateway.down.store(false, Ordering::SeqCst);
        *app.gateway.status.lock().unwrap() = GatewayStatus::Settlement;
        let (status, body) = send(
            &app.router,
            "POST",
            "/api/v1/payments/notification",
            None,
            Some(json!({"order_id": order_id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[test]
    fn openapi_lists_lifecycle_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/rentals/{id}/return",
            "/api/v1/payments/notification",
            "/api/v1/stations/audit",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path}");
        }
    }
}
