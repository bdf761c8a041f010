//! Public demo requests from the marketing site.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::notification::Notification;
use crate::state::AppState;

const REQUIRED_FIELDS_MESSAGE: &str = "Name, email, and preferred time are required.";

#[derive(Debug, Deserialize)]
pub struct DemoRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub preferred_time: String,
    pub message: Option<String>,
}

#[derive(Debug, PartialEq)]
struct ValidDemoRequest {
    name: String,
    email: String,
    preferred_time: String,
    message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DemoResponse {
    pub id: Uuid,
    pub notification: Notification,
}

impl DemoRequest {
    fn validate(self) -> Result<ValidDemoRequest, AppError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let preferred_time = self.preferred_time.trim();
        if name.is_empty() || email.is_empty() || preferred_time.is_empty() {
            return Err(AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
        }
        Ok(ValidDemoRequest {
            name: name.to_string(),
            email: email.to_string(),
            preferred_time: preferred_time.to_string(),
            message: self
                .message
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty()),
        })
    }
}

/// POST /api/v1/demos
pub async fn handle_schedule_demo(
    State(state): State<AppState>,
    Json(req): Json<DemoRequest>,
) -> Result<(StatusCode, Json<DemoResponse>), AppError> {
    let demo = req.validate()?;

    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO schedule_demos (name, email, preferred_time, message)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(&demo.name)
    .bind(&demo.email)
    .bind(&demo.preferred_time)
    .bind(&demo.message)
    .fetch_one(&state.db)
    .await?;

    info!("Demo request {id} received");
    Ok((
        StatusCode::CREATED,
        Json(DemoResponse {
            id,
            notification: Notification::success(
                "Demo scheduled successfully!",
                "We'll contact you within 24 hours to confirm your demo.",
            ),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, preferred_time: &str) -> DemoRequest {
        DemoRequest {
            name: name.to_string(),
            email: email.to_string(),
            preferred_time: preferred_time.to_string(),
            message: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_complete_request_is_trimmed() {
        let demo = request(" Asha ", "asha@college.edu", "Tuesday 10am")
            .validate()
            .unwrap();
        assert_eq!(demo.name, "Asha");
        assert_eq!(demo.message, None);
    }

    #[test]
    fn test_each_required_field_enforced() {
        for req in [
            request("", "a@b.c", "Mon"),
            request("A", " ", "Mon"),
            request("A", "a@b.c", ""),
        ] {
            match req.validate() {
                Err(AppError::Validation(msg)) => assert_eq!(msg, REQUIRED_FIELDS_MESSAGE),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_json_fields_fail_validation() {
        let req: DemoRequest = serde_json::from_str(r#"{"name":"A"}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
