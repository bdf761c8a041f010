use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Raw counter sums over a user's campaigns.
#[derive(Debug, Clone, Default, FromRow)]
pub struct CampaignTotals {
    pub total_campaigns: i64,
    pub active_campaigns: i64,
    pub total_candidates: i64,
    pub messages_sent: i64,
    pub calls_made: i64,
    pub responses_received: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_campaigns: i64,
    pub active_campaigns: i64,
    pub total_candidates: i64,
    pub messages_sent: i64,
    pub calls_made: i64,
    pub responses_received: i64,
    /// Percentage, one decimal place.
    pub response_rate: f64,
}

impl From<CampaignTotals> for DashboardStats {
    fn from(t: CampaignTotals) -> Self {
        Self {
            response_rate: response_rate(t.responses_received, t.messages_sent, t.calls_made),
            total_campaigns: t.total_campaigns,
            active_campaigns: t.active_campaigns,
            total_candidates: t.total_candidates,
            messages_sent: t.messages_sent,
            calls_made: t.calls_made,
            responses_received: t.responses_received,
        }
    }
}

/// `responses / (messages + calls) * 100`, rounded to one decimal. Zero when
/// nothing has been sent.
pub fn response_rate(responses: i64, messages: i64, calls: i64) -> f64 {
    let outreach = messages + calls;
    if outreach <= 0 {
        return 0.0;
    }
    let rate = responses as f64 / outreach as f64 * 100.0;
    (rate * 10.0).round() / 10.0
}

pub async fn campaign_totals(pool: &PgPool, user_id: Uuid) -> Result<CampaignTotals, sqlx::Error> {
    sqlx::query_as::<_, CampaignTotals>(
        r#"
        SELECT
            COUNT(*)                                     AS total_campaigns,
            COUNT(*) FILTER (WHERE status = 'active')   AS active_campaigns,
            COALESCE(SUM(candidates_count), 0)::BIGINT           AS total_candidates,
            COALESCE(SUM(messages_sent), 0)::BIGINT              AS messages_sent,
            COALESCE(SUM(calls_made), 0)::BIGINT                 AS calls_made,
            COALESCE(SUM(responses_received), 0)::BIGINT         AS responses_received
        FROM campaigns
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}
