use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::campaign::{CampaignRow, CampaignStatus, CampaignType};

/// A validated campaign ready to insert as a draft.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCampaign {
    pub name: String,
    pub campaign_type: CampaignType,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub template_whatsapp: Option<String>,
    pub template_voice: Option<String>,
}

pub async fn create_campaign(
    pool: &PgPool,
    user_id: Uuid,
    campaign: &NewCampaign,
) -> Result<CampaignRow, sqlx::Error> {
    let row = sqlx::query_as::<_, CampaignRow>(
        r#"
        INSERT INTO campaigns
            (user_id, name, type, status, scheduled_at, template_whatsapp, template_voice)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&campaign.name)
    .bind(campaign.campaign_type.as_str())
    .bind(CampaignStatus::Draft.as_str())
    .bind(campaign.scheduled_at)
    .bind(&campaign.template_whatsapp)
    .bind(&campaign.template_voice)
    .fetch_one(pool)
    .await?;

    info!("Created campaign {} for user {user_id}", row.id);
    Ok(row)
}

pub async fn list_campaigns(pool: &PgPool, user_id: Uuid) -> Result<Vec<CampaignRow>, sqlx::Error> {
    sqlx::query_as::<_, CampaignRow>(
        "SELECT * FROM campaigns WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn get_campaign(
    pool: &PgPool,
    user_id: Uuid,
    campaign_id: Uuid,
) -> Result<Option<CampaignRow>, sqlx::Error> {
    sqlx::query_as::<_, CampaignRow>("SELECT * FROM campaigns WHERE id = $1 AND user_id = $2")
        .bind(campaign_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn set_status(
    pool: &PgPool,
    user_id: Uuid,
    campaign_id: Uuid,
    status: CampaignStatus,
) -> Result<Option<CampaignRow>, sqlx::Error> {
    sqlx::query_as::<_, CampaignRow>(
        r#"
        UPDATE campaigns SET status = $1, updated_at = NOW()
        WHERE id = $2 AND user_id = $3
        RETURNING *
        "#,
    )
    .bind(status.as_str())
    .bind(campaign_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Returns `true` if a row was deleted. Candidates cascade with the campaign.
pub async fn delete_campaign(
    pool: &PgPool,
    user_id: Uuid,
    campaign_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM campaigns WHERE id = $1 AND user_id = $2")
        .bind(campaign_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
