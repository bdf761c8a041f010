//! Candidate persistence behind a pluggable bulk-insert backend.
//!
//! `AppState` holds an `Arc<dyn CandidateStore>`; tests swap in an in-memory store.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::candidate::Candidate;

/// Seven bound columns per row keeps each statement well under the
/// PostgreSQL limit of 65535 bind parameters.
const MAX_ROWS_PER_STATEMENT: usize = 5_000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Rejected(String),
}

#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Inserts every candidate or none of them. Returns the number of rows written.
    /// `campaign_id = None` files the candidates as unassigned.
    async fn bulk_insert(
        &self,
        user_id: Uuid,
        campaign_id: Option<Uuid>,
        candidates: &[Candidate],
    ) -> Result<u64, StoreError>;
}

pub struct PgCandidateStore {
    pool: PgPool,
}

impl PgCandidateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CandidateStore for PgCandidateStore {
    async fn bulk_insert(
        &self,
        user_id: Uuid,
        campaign_id: Option<Uuid>,
        candidates: &[Candidate],
    ) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;

        if let Some(campaign_id) = campaign_id {
            let owned: Option<Uuid> =
                sqlx::query_scalar("SELECT id FROM campaigns WHERE id = $1 AND user_id = $2")
                    .bind(campaign_id)
                    .bind(user_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if owned.is_none() {
                return Err(StoreError::Rejected(format!(
                    "Campaign {campaign_id} not found"
                )));
            }
        }

        let mut inserted = 0_u64;
        for chunk in candidates.chunks(MAX_ROWS_PER_STATEMENT) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO candidates (user_id, campaign_id, name, phone, email, city, course) ",
            );
            builder.push_values(chunk, |mut row, candidate| {
                row.push_bind(user_id)
                    .push_bind(campaign_id)
                    .push_bind(candidate.name.clone())
                    .push_bind(candidate.phone.clone())
                    .push_bind(candidate.email.clone())
                    .push_bind(candidate.city.clone())
                    .push_bind(candidate.course.clone());
            });
            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        if let Some(campaign_id) = campaign_id {
            sqlx::query(
                "UPDATE campaigns SET candidates_count = candidates_count + $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(inserted as i64)
            .bind(campaign_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            "Inserted {inserted} candidates for user {user_id} (campaign: {})",
            campaign_id.map_or_else(|| "unassigned".to_string(), |id| id.to_string())
        );
        Ok(inserted)
    }
}
