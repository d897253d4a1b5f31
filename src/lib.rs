pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::intake::IntakeService;
use crate::services::payments::PaymentService;
use crate::services::review::ReviewService;
use crate::services::storage::DocumentStore;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::health_check,
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::departments::list_departments,
        api::handlers::departments::list_teachers,
        api::handlers::applications::submit_application,
        api::handlers::applications::application_detail,
        api::handlers::applications::list_applications,
        api::handlers::applications::accept_applicant,
        api::handlers::applications::reject_applicant,
        api::handlers::applications::confirm_payment,
    ),
    components(
        schemas(
            api::handlers::health::HealthResponse,
            api::handlers::auth::AuthRequest,
            api::handlers::auth::AuthResponse,
            api::handlers::departments::DepartmentResponse,
            api::handlers::departments::TeacherResponse,
            api::handlers::applications::ApplicationSummary,
            api::notify::Notice,
            api::notify::NoticeLevel,
        )
    ),
    tags(
        (name = "applications", description = "Application intake and lookup"),
        (name = "review", description = "Staff review actions"),
        (name = "departments", description = "Department and teacher directory"),
        (name = "auth", description = "Staff authentication"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub documents: Arc<dyn DocumentStore>,
    pub intake: Arc<IntakeService>,
    pub review: Arc<ReviewService>,
    pub payments: Arc<PaymentService>,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route("/auth/login", post(api::handlers::auth::login))
        .route("/auth/logout", post(api::handlers::auth::logout))
        .route(
            "/departments",
            get(api::handlers::departments::list_departments),
        )
        .route("/teachers", get(api::handlers::departments::list_teachers))
        .route(
            "/apply",
            post(api::handlers::applications::submit_application).layer(
                axum::extract::DefaultBodyLimit::max(
                    // Three document slots plus form-field overhead
                    state.config.max_upload_size * 3 + 1024 * 1024,
                ),
            ),
        )
        .route(
            "/applications",
            get(api::handlers::applications::list_applications).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::staff_middleware,
            )),
        )
        .route(
            "/applications/:id",
            get(api::handlers::applications::application_detail),
        )
        .route(
            "/applications/:id/pay",
            post(api::handlers::applications::confirm_payment),
        )
        .route(
            "/applications/:id/accept",
            post(api::handlers::applications::accept_applicant).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::staff_middleware,
            )),
        )
        .route(
            "/applications/:id/reject",
            post(api::handlers::applications::reject_applicant).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::staff_middleware,
            )),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
