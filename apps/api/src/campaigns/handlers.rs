use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::Session;
use crate::campaigns::prompts::{script_prompt, ScriptChannel};
use crate::campaigns::queries::{self, NewCampaign};
use crate::errors::AppError;
use crate::models::campaign::{CampaignRow, CampaignStatus, CampaignType};
use crate::models::notification::Notification;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCampaignRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub campaign_type: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub template_whatsapp: Option<String>,
    pub template_voice: Option<String>,
}

impl CreateCampaignRequest {
    pub fn validate(self) -> Result<NewCampaign, AppError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Campaign name is required".to_string()));
        }
        let campaign_type = self
            .campaign_type
            .trim()
            .parse::<CampaignType>()
            .map_err(AppError::Validation)?;

        Ok(NewCampaign {
            name: name.to_string(),
            campaign_type,
            scheduled_at: self.scheduled_at,
            template_whatsapp: non_blank(self.template_whatsapp),
            template_voice: non_blank(self.template_voice),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Serialize)]
pub struct CampaignResponse {
    pub campaign: CampaignRow,
    pub notification: Notification,
}

/// GET /api/v1/campaigns
pub async fn handle_list_campaigns(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<CampaignRow>>, AppError> {
    let campaigns = queries::list_campaigns(&state.db, session.user_id).await?;
    Ok(Json(campaigns))
}

/// POST /api/v1/campaigns
pub async fn handle_create_campaign(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<CampaignResponse>), AppError> {
    let campaign = req.validate()?;
    let row = queries::create_campaign(&state.db, session.user_id, &campaign).await?;
    let notification = Notification::success(
        "Campaign created",
        format!("{} has been created successfully.", row.name),
    );
    Ok((
        StatusCode::CREATED,
        Json(CampaignResponse {
            campaign: row,
            notification,
        }),
    ))
}

/// POST /api/v1/campaigns/:id/toggle
///
/// Active campaigns pause; any other status activates.
pub async fn handle_toggle_campaign(
    State(state): State<AppState>,
    session: Session,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<CampaignResponse>, AppError> {
    let current = queries::get_campaign(&state.db, session.user_id, campaign_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Campaign {campaign_id} not found")))?;

    let status = current
        .status
        .parse::<CampaignStatus>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?
        .toggled();

    let row = queries::set_status(&state.db, session.user_id, campaign_id, status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Campaign {campaign_id} not found")))?;

    info!("Campaign {campaign_id} is now {status}");
    let verb = match status {
        CampaignStatus::Active => "activated",
        _ => "paused",
    };
    let notification =
        Notification::success("Campaign updated", format!("Campaign has been {verb}"));
    Ok(Json(CampaignResponse {
        campaign: row,
        notification,
    }))
}

/// DELETE /api/v1/campaigns/:id
pub async fn handle_delete_campaign(
    State(state): State<AppState>,
    session: Session,
    Path(campaign_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !queries::delete_campaign(&state.db, session.user_id, campaign_id).await? {
        return Err(AppError::NotFound(format!(
            "Campaign {campaign_id} not found"
        )));
    }
    info!("Deleted campaign {campaign_id}");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ScriptRequest {
    pub channel: ScriptChannel,
}

#[derive(Debug, Serialize)]
pub struct ScriptResponse {
    pub script: String,
    pub channel: ScriptChannel,
}

/// POST /api/v1/campaigns/scripts
pub async fn handle_generate_script(
    State(state): State<AppState>,
    _session: Session,
    Json(req): Json<ScriptRequest>,
) -> Result<Json<ScriptResponse>, AppError> {
    let script = state.inference.generate(script_prompt(req.channel)).await?;
    Ok(Json(ScriptResponse {
        script,
        channel: req.channel,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, campaign_type: &str) -> CreateCampaignRequest {
        CreateCampaignRequest {
            name: name.to_string(),
            campaign_type: campaign_type.to_string(),
            scheduled_at: None,
            template_whatsapp: Some("Hi {name}".to_string()),
            template_voice: Some("   ".to_string()),
        }
    }

    #[test]
    fn test_valid_request_becomes_draft_input() {
        let campaign = request("  Fall intake ", "both").validate().unwrap();
        assert_eq!(campaign.name, "Fall intake");
        assert_eq!(campaign.campaign_type, CampaignType::Both);
        assert_eq!(campaign.template_whatsapp.as_deref(), Some("Hi {name}"));
        assert_eq!(campaign.template_voice, None);
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(matches!(
            request("  ", "voice").validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(matches!(
            request("Spring", "sms").validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_scheduled_at_accepts_rfc3339() {
        let req: CreateCampaignRequest = serde_json::from_str(
            r#"{"name":"N","type":"email","scheduled_at":"2026-01-05T09:30:00Z"}"#,
        )
        .unwrap();
        let campaign = req.validate().unwrap();
        assert_eq!(
            campaign.scheduled_at.map(|t| t.to_rfc3339()),
            Some("2026-01-05T09:30:00+00:00".to_string())
        );
    }

    #[test]
    fn test_script_channel_parses_from_json() {
        let req: ScriptRequest = serde_json::from_str(r#"{"channel":"voice"}"#).unwrap();
        assert_eq!(req.channel, ScriptChannel::Voice);
        assert!(serde_json::from_str::<ScriptRequest>(r#"{"channel":"fax"}"#).is_err());
    }
}
