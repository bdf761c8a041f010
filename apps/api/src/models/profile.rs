use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub college_name: Option<String>,
    pub college_address: Option<String>,
    pub college_website: Option<String>,
    pub notifications_enabled: bool,
    pub email_alerts: bool,
    pub sms_alerts: bool,
    pub subscription_plan: Option<String>,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
