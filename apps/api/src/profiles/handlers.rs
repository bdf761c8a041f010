use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::Session;
use crate::errors::AppError;
use crate::models::notification::Notification;
use crate::models::profile::ProfileRow;
use crate::state::AppState;

/// Editable profile settings. Subscription fields are not user-editable.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub college_name: Option<String>,
    pub college_address: Option<String>,
    pub college_website: Option<String>,
    #[serde(default = "enabled")]
    pub notifications_enabled: bool,
    #[serde(default = "enabled")]
    pub email_alerts: bool,
    #[serde(default)]
    pub sms_alerts: bool,
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: ProfileRow,
    pub notification: Notification,
}

/// Settings shown to a user who has never saved a profile.
pub fn default_profile(session: &Session, now: DateTime<Utc>) -> ProfileRow {
    ProfileRow {
        id: session.user_id,
        full_name: None,
        email: session.email.clone(),
        college_name: None,
        college_address: None,
        college_website: None,
        notifications_enabled: true,
        email_alerts: true,
        sms_alerts: false,
        subscription_plan: None,
        subscription_expires_at: None,
        created_at: now,
        updated_at: now,
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<ProfileRow>, AppError> {
    let row = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE id = $1")
        .bind(session.user_id)
        .fetch_optional(&state.db)
        .await?;

    Ok(Json(match row {
        Some(mut profile) => {
            if profile.email.is_none() {
                profile.email = session.email.clone();
            }
            profile
        }
        None => default_profile(&session, Utc::now()),
    }))
}

/// PUT /api/v1/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = sqlx::query_as::<_, ProfileRow>(
        r#"
        INSERT INTO profiles
            (id, full_name, email, college_name, college_address, college_website,
             notifications_enabled, email_alerts, sms_alerts)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (id) DO UPDATE SET
            full_name = EXCLUDED.full_name,
            email = EXCLUDED.email,
            college_name = EXCLUDED.college_name,
            college_address = EXCLUDED.college_address,
            college_website = EXCLUDED.college_website,
            notifications_enabled = EXCLUDED.notifications_enabled,
            email_alerts = EXCLUDED.email_alerts,
            sms_alerts = EXCLUDED.sms_alerts,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(session.user_id)
    .bind(blank_to_none(req.full_name))
    .bind(blank_to_none(req.email).or_else(|| session.email.clone()))
    .bind(blank_to_none(req.college_name))
    .bind(blank_to_none(req.college_address))
    .bind(blank_to_none(req.college_website))
    .bind(req.notifications_enabled)
    .bind(req.email_alerts)
    .bind(req.sms_alerts)
    .fetch_one(&state.db)
    .await?;

    info!("Saved profile for user {}", session.user_id);
    Ok(Json(ProfileResponse {
        profile,
        notification: Notification::success(
            "Settings saved",
            "Your profile has been updated successfully.",
        ),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn session() -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: Some("admissions@college.edu".to_string()),
        }
    }

    #[test]
    fn test_default_profile_alert_flags() {
        let session = session();
        let profile = default_profile(&session, Utc::now());
        assert_eq!(profile.id, session.user_id);
        assert_eq!(profile.email.as_deref(), Some("admissions@college.edu"));
        assert!(profile.notifications_enabled);
        assert!(profile.email_alerts);
        assert!(!profile.sms_alerts);
    }

    #[test]
    fn test_update_request_defaults_missing_flags() {
        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"college_name":"St. Xavier's"}"#).unwrap();
        assert!(req.notifications_enabled);
        assert!(req.email_alerts);
        assert!(!req.sms_alerts);
    }

    #[test]
    fn test_blank_fields_stored_as_null() {
        assert_eq!(blank_to_none(Some("  ".to_string())), None);
        assert_eq!(
            blank_to_none(Some(" https://college.edu ".to_string())).as_deref(),
            Some("https://college.edu")
        );
    }
}
