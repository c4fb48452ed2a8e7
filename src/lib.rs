pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::case_study_service::CaseStudyService;
use crate::services::image_store::ImageStore;
use axum::{
    Router,
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::case_studies::create_case_study,
        api::handlers::case_studies::list_case_studies,
        api::handlers::case_studies::get_case_study,
        api::handlers::case_studies::get_case_study_by_slug,
        api::handlers::case_studies::update_case_study,
        api::handlers::case_studies::delete_case_study,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::case_studies::CaseStudyResponse,
            api::handlers::case_studies::CaseStudyListResponse,
            api::handlers::case_studies::SingleCaseStudyResponse,
            api::handlers::case_studies::DeletedResponse,
            api::handlers::health::HealthResponse,
            entities::case_studies::Model,
            entities::case_studies::Section,
            entities::case_studies::SeoMetadata,
            entities::case_studies::CaseStudyStatus,
        )
    ),
    tags(
        (name = "case-studies", description = "Case study management endpoints"),
        (name = "system", description = "Health and diagnostics")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn ImageStore>,
    pub case_studies: Arc<CaseStudyService>,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/case-studies/create",
            post(api::handlers::case_studies::create_case_study),
        )
        .route(
            "/case-studies",
            get(api::handlers::case_studies::list_case_studies),
        )
        .route(
            "/case-studies/id/:id",
            get(api::handlers::case_studies::get_case_study),
        )
        .route(
            "/case-studies/slug/:slug",
            get(api::handlers::case_studies::get_case_study_by_slug),
        )
        .route(
            "/case-studies/:id",
            put(api::handlers::case_studies::update_case_study)
                .delete(api::handlers::case_studies::delete_case_study),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.max_upload_size + 10 * 1024 * 1024, // multipart overhead buffer
        ))
        .with_state(state)
}
