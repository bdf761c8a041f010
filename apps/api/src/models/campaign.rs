use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignType {
    Whatsapp,
    Voice,
    /// Voice + WhatsApp.
    Both,
    Email,
}

impl CampaignType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignType::Whatsapp => "whatsapp",
            CampaignType::Voice => "voice",
            CampaignType::Both => "both",
            CampaignType::Email => "email",
        }
    }
}

impl FromStr for CampaignType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whatsapp" => Ok(CampaignType::Whatsapp),
            "voice" => Ok(CampaignType::Voice),
            "both" => Ok(CampaignType::Both),
            "email" => Ok(CampaignType::Email),
            other => Err(format!("unknown campaign type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Completed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
        }
    }

    /// Pause an active campaign; anything else becomes active.
    pub fn toggled(self) -> Self {
        match self {
            CampaignStatus::Active => CampaignStatus::Paused,
            _ => CampaignStatus::Active,
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(CampaignStatus::Draft),
            "active" => Ok(CampaignStatus::Active),
            "paused" => Ok(CampaignStatus::Paused),
            "completed" => Ok(CampaignStatus::Completed),
            other => Err(format!("unknown campaign status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CampaignRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub campaign_type: String,
    pub status: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub template_whatsapp: Option<String>,
    pub template_voice: Option<String>,
    pub candidates_count: i64,
    pub messages_sent: i64,
    pub calls_made: i64,
    pub responses_received: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
