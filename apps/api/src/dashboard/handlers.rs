use axum::{extract::State, Json};

use crate::auth::Session;
use crate::dashboard::stats::{campaign_totals, DashboardStats};
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/v1/dashboard/stats
pub async fn handle_dashboard_stats(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<DashboardStats>, AppError> {
    let totals = campaign_totals(&state.db, session.user_id).await?;
    Ok(Json(totals.into()))
}
