use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
};

use crate::handlers;
use crate::state::AppState;
use crate::utils::rate_limit::enforce_rate_limit;
use crate::utils::upload::UploadPolicy;

/// Routes mounted under `/api`.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/storage/{*key}", get(handlers::storage::get_object))
        .nest("/auth", auth_routes(state))
        .nest("/applications", application_routes(state))
        .nest("/blog", blog_routes(state))
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(handlers::auth::login))
        .route_layer(from_fn_with_state(state.clone(), enforce_rate_limit));

    Router::new()
        .route("/me", get(handlers::auth::me))
        .merge(limited)
}

fn application_routes(state: &AppState) -> Router<AppState> {
    let uploads = &state.config.uploads;
    let documents = UploadPolicy::documents(uploads.document_max_bytes, uploads.document_max_files);

    // Public writes share one limiter.
    let public_writes = Router::new()
        .route("/", post(handlers::application::create_application))
        .route(
            "/upload-temp",
            post(handlers::application::upload_temp_documents).layer(documents.body_limit()),
        )
        .route_layer(from_fn_with_state(state.clone(), enforce_rate_limit));

    let admin = Router::new()
        .route("/", get(handlers::application::list_applications))
        .route("/stats", get(handlers::application::application_stats))
        .route(
            "/{id}",
            get(handlers::application::get_application_admin)
                .delete(handlers::application::delete_application),
        )
        .route(
            "/{id}/status",
            patch(handlers::application::update_application_status),
        )
        .route(
            "/{id}/documents",
            patch(handlers::application::replace_application_documents),
        );

    Router::new()
        .merge(public_writes)
        .nest("/admin", admin)
        .route("/{id}", get(handlers::application::get_application))
}

fn blog_routes(state: &AppState) -> Router<AppState> {
    let images = UploadPolicy::images(state.config.uploads.image_max_bytes);

    let admin = Router::new()
        .route(
            "/posts",
            get(handlers::blog::list_posts_admin).post(handlers::blog::create_post),
        )
        .route("/stats", get(handlers::blog::post_stats))
        .route(
            "/upload-image",
            post(handlers::blog::upload_post_image).layer(images.body_limit()),
        )
        .route(
            "/posts/{id}",
            get(handlers::blog::get_post_admin)
                .patch(handlers::blog::update_post)
                .delete(handlers::blog::delete_post),
        )
        .route("/posts/{id}/publish", post(handlers::blog::publish_post))
        .route("/posts/{id}/unpublish", post(handlers::blog::unpublish_post))
        .route("/posts/{id}/restore", post(handlers::blog::restore_post))
        .route(
            "/posts/{id}/permanent",
            delete(handlers::blog::permanently_delete_post),
        );

    Router::new()
        .route("/posts", get(handlers::blog::list_published_posts))
        .route("/posts/slug/{slug}", get(handlers::blog::get_post_by_slug))
        .route("/check-slug", get(handlers::blog::check_slug))
        .nest("/admin", admin)
}
