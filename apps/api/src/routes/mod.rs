pub mod ai;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::campaigns::handlers as campaigns;
use crate::chat::handlers as chat;
use crate::dashboard::handlers as dashboard;
use crate::demos;
use crate::ingest::handlers::{self as ingest, MAX_UPLOAD_BYTES};
use crate::profiles::handlers as profiles;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Candidate ingestion
        .route("/api/v1/candidates", get(ingest::handle_list_candidates))
        .route(
            "/api/v1/candidates/upload",
            post(ingest::handle_upload)
                .get(ingest::handle_upload_status)
                .delete(ingest::handle_cancel)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/v1/candidates/upload/confirm",
            post(ingest::handle_confirm),
        )
        // Campaigns
        .route(
            "/api/v1/campaigns",
            get(campaigns::handle_list_campaigns).post(campaigns::handle_create_campaign),
        )
        .route(
            "/api/v1/campaigns/scripts",
            post(campaigns::handle_generate_script),
        )
        .route(
            "/api/v1/campaigns/:id/toggle",
            post(campaigns::handle_toggle_campaign),
        )
        .route(
            "/api/v1/campaigns/:id",
            delete(campaigns::handle_delete_campaign),
        )
        // Inference proxy and chat
        .route("/api/v1/ai/generate", post(ai::handle_generate))
        .route("/api/v1/chat/sessions", post(chat::handle_create_session))
        .route(
            "/api/v1/chat/sessions/:id/messages",
            get(chat::handle_list_messages),
        )
        .route("/api/v1/chat/messages", post(chat::handle_send_message))
        // Settings and dashboard
        .route(
            "/api/v1/profile",
            get(profiles::handle_get_profile).put(profiles::handle_update_profile),
        )
        .route(
            "/api/v1/dashboard/stats",
            get(dashboard::handle_dashboard_stats),
        )
        // Public
        .route("/api/v1/demos", post(demos::handle_schedule_demo))
        .with_state(state)
}
