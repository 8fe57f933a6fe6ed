use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use domain::services::{
    AttendancePolicy, AttendanceResolver, EuclideanMatcher, FaceEncoder, FaceEncoderError,
};
use persistence::PgAttendanceStore;
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, require_user_auth, trace_id};
use crate::routes::{attendance, auth, classes, faces, health, marks, users};
use crate::services::RemoteFaceEncoder;

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("Failed to initialize JWT: {0}")]
    Jwt(#[from] JwtError),

    #[error("Failed to initialize face encoder: {0}")]
    FaceEncoder(#[from] FaceEncoderError),
}

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub resolver: AttendanceResolver,
    /// `None` when no encoder service is configured.
    pub face_encoder: Option<Arc<dyn FaceEncoder>>,
}

impl AppState {
    /// Builds the shared handles once at startup.
    pub fn from_config(config: Config, pool: PgPool) -> Result<Self, AppInitError> {
        let jwt = JwtConfig::from_rsa_pem(
            &normalize_pem_key(&config.jwt.private_key),
            &normalize_pem_key(&config.jwt.public_key),
            config.jwt.access_token_expiry_secs,
            config.jwt.leeway_secs,
        )?;

        let policy = AttendancePolicy {
            face_match_threshold: config.attendance.face_match_threshold,
            require_face: config.attendance.require_face,
        };
        let resolver = AttendanceResolver::new(
            Arc::new(PgAttendanceStore::new(pool.clone())),
            Arc::new(EuclideanMatcher),
            policy,
        );

        let face_encoder: Option<Arc<dyn FaceEncoder>> = if config.face.encoder_url.is_empty() {
            tracing::info!("No face encoder configured, image submissions are disabled");
            None
        } else {
            Some(Arc::new(RemoteFaceEncoder::new(&config.face)?))
        };

        Ok(Self {
            pool,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            resolver,
            face_encoder,
        })
    }

    /// Replaces the face encoder.
    pub fn with_face_encoder(mut self, encoder: Arc<dyn FaceEncoder>) -> Self {
        self.face_encoder = Some(encoder);
        self
    }
}

/// Converts literal `\n` sequences from env files into newlines.
fn normalize_pem_key(key: &str) -> String {
    key.trim_matches('"').trim_matches('\'').replace("\\n", "\n")
}

pub fn create_app(config: Config, pool: PgPool) -> Result<Router, AppInitError> {
    Ok(create_router(AppState::from_config(config, pool)?))
}

pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Authenticated routes; role checks happen in the handlers via `Actor`.
    let protected_routes = Router::new()
        .route("/api/v1/users/me", get(users::get_me).patch(users::update_me))
        .route("/api/v1/users", get(users::list_users))
        .route("/api/v1/users/:user_id/role", put(users::assign_role))
        .route(
            "/api/v1/classes",
            post(classes::create_class).get(classes::list_classes),
        )
        .route(
            "/api/v1/classes/:class_id",
            get(classes::get_class).patch(classes::update_class),
        )
        .route(
            "/api/v1/classes/:class_id/students",
            put(classes::enroll_students).get(classes::list_students),
        )
        .route(
            "/api/v1/classes/:class_id/subjects",
            post(marks::create_subject).get(marks::list_subjects),
        )
        .route("/api/v1/faces", post(faces::enroll_face))
        .route(
            "/api/v1/faces/me",
            get(faces::get_my_gallery).delete(faces::clear_my_gallery),
        )
        .route("/api/v1/attendance/submit", post(attendance::submit))
        .route("/api/v1/attendance/manual", post(attendance::mark_manual))
        .route("/api/v1/attendance", get(attendance::list_for_class))
        .route("/api/v1/attendance/me", get(attendance::list_mine))
        .route("/api/v1/attendance/requests", get(attendance::list_requests))
        .route(
            "/api/v1/attendance/requests/:request_id/approve",
            post(attendance::approve_request),
        )
        .route(
            "/api/v1/attendance/requests/:request_id/reject",
            post(attendance::reject_request),
        )
        .route("/api/v1/marks", put(marks::upsert_mark))
        .route("/api/v1/results/me", get(marks::my_results))
        .route("/api/v1/results/:student_id", get(marks::student_results))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/auth/signup", post(auth::signup))
        .route("/api/v1/auth/login", post(auth::login));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Global middleware (bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
