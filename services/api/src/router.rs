use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use wishlist_core::layers::{
    cors_layer, propagate_request_id_layer, request_id_layer, trace_layer,
};

use crate::handlers::{
    health::{healthz, readyz},
    user::{
        facebook_login, get_user, get_user_by_username, google_login, login, logout, register,
        request_verification, update_user, upload_avatar, upload_background, verify_email,
    },
    wish::{
        complete_wish, create_wish, delete_wish, get_wish, list_by_user, list_own, list_reserved,
        reserve_wish, uncomplete_wish, unreserve_wish, update_wish,
    },
};
use crate::state::AppState;

/// Request bodies above this are rejected before reaching a handler. Leaves
/// room for multipart framing around a maximum-size image.
const BODY_LIMIT_BYTES: usize = 4 * 1024 * 1024;

fn api_routes() -> Router<AppState> {
    Router::new()
        // Users
        .route("/users", post(register))
        .route("/users/login", post(login))
        .route("/users/logout", post(logout))
        .route("/users/google", post(google_login))
        .route("/users/facebook", post(facebook_login))
        .route("/users/me/verify", post(request_verification))
        .route("/users/verify/{token}", get(verify_email))
        .route("/users/username/{username}", get(get_user_by_username))
        .route("/users/{id}", get(get_user).patch(update_user))
        .route("/users/{id}/avatar", post(upload_avatar))
        .route("/users/{id}/background", post(upload_background))
        // Wishes
        .route("/wishes", get(list_own).post(create_wish))
        .route("/wishes/reserved", get(list_reserved))
        .route("/wishes/user/{id}", get(list_by_user))
        .route(
            "/wishes/{id}",
            get(get_wish).patch(update_wish).delete(delete_wish),
        )
        .route(
            "/wishes/{id}/complete",
            post(complete_wish).delete(uncomplete_wish),
        )
        .route(
            "/wishes/{id}/reserve",
            post(reserve_wish).delete(unreserve_wish),
        )
}

pub fn build_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.uploads_folder);
    let uploads_prefix = state.config.uploads_prefix();

    let router = Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api", api_routes());
    // Uploads served from the root take over unmatched paths.
    let router = if uploads_prefix == "/" {
        router.fallback_service(uploads)
    } else {
        router.nest_service(&uploads_prefix, uploads)
    };

    router
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(trace_layer())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .layer(cors_layer())
        .with_state(state)
}
