//! Route table

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::config::AppState;
use crate::handlers::{
    create_challenge, create_ctf, create_flag, delete_challenge, delete_ctf, delete_flag,
    download_file, get_challenge, get_ctf, get_flag, health_check, list_challenges, list_ctfs,
    list_flags, update_flag, upload_file,
};

/// Room for multipart framing around the file itself.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let upload_limit = usize::try_from(state.config.max_upload_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        // CTFs
        .route("/ctfs", get(list_ctfs).post(create_ctf))
        .route("/ctfs/{id}", get(get_ctf).delete(delete_ctf))
        // Challenges
        .route("/challenges", get(list_challenges).post(create_challenge))
        .route(
            "/challenges/{id}",
            get(get_challenge).delete(delete_challenge),
        )
        // Flag submissions
        .route("/flags", get(list_flags).post(create_flag))
        .route(
            "/flags/{id}",
            get(get_flag).put(update_flag).delete(delete_flag),
        )
        // Attachments
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/download", get(download_file))
        // Health check
        .route("/health", get(health_check))
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
