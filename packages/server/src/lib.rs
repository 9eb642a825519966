pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use axum::{Json, Router, routing::get};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable as ScalarServable};

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Admissions Portal API",
        version = "1.0.0",
        description = "Admissions applications, document uploads and blog publishing"
    ),
    paths(
        handlers::application::create_application,
        handlers::application::upload_temp_documents,
        handlers::application::get_application,
        handlers::application::list_applications,
        handlers::application::application_stats,
        handlers::application::get_application_admin,
        handlers::application::update_application_status,
        handlers::application::replace_application_documents,
        handlers::application::delete_application,
        handlers::blog::list_published_posts,
        handlers::blog::get_post_by_slug,
        handlers::blog::check_slug,
        handlers::blog::list_posts_admin,
        handlers::blog::create_post,
        handlers::blog::post_stats,
        handlers::blog::upload_post_image,
        handlers::blog::get_post_admin,
        handlers::blog::update_post,
        handlers::blog::publish_post,
        handlers::blog::unpublish_post,
        handlers::blog::delete_post,
        handlers::blog::restore_post,
        handlers::blog::permanently_delete_post,
        handlers::auth::login,
        handlers::auth::me,
        handlers::storage::get_object,
        handlers::health::health,
    ),
    tags(
        (name = "Applications", description = "Admissions form submissions and review"),
        (name = "Blog", description = "Blog posts and publishing workflow"),
        (name = "Auth", description = "Login and current user"),
        (name = "Storage", description = "Uploaded file access"),
        (name = "Health", description = "Service status"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {o}");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(config.max_age))
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let api = ApiDoc::openapi();
    let cors = cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", routes::api_routes(&state))
        .route(
            "/api-docs/openapi.json",
            get({
                let api = api.clone();
                move || async move { Json(api) }
            }),
        )
        .merge(Scalar::with_url("/scalar", api))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
