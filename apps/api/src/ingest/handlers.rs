use std::sync::Arc;

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Session;
use crate::errors::AppError;
use crate::ingest::coordinator::{IngestionStatus, StagedUpload, UploadReceipt};
use crate::models::candidate::CandidateRow;
use crate::state::AppState;

/// Upper bound on a multipart upload body.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// POST /api/v1/candidates/upload
///
/// Multipart fields: `file` (required, `.csv`) and `campaign_id` (optional).
/// Parses the file and stages a preview; nothing is persisted yet.
pub async fn handle_upload(
    State(state): State<AppState>,
    session: Session,
    mut multipart: Multipart,
) -> Result<Json<StagedUpload>, AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut campaign_id: Option<Uuid> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
                file = Some((file_name, data));
            }
            Some("campaign_id") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid campaign_id: {e}")))?;
                campaign_id = parse_campaign_id(&raw)?;
            }
            _ => {}
        }
    }

    let (file_name, data) =
        file.ok_or_else(|| AppError::Validation("A CSV file is required".to_string()))?;

    let staged = state
        .ingestion
        .stage(&session, &file_name, &data, campaign_id)
        .await?;
    Ok(Json(staged))
}

/// GET /api/v1/candidates/upload
pub async fn handle_upload_status(
    State(state): State<AppState>,
    session: Session,
) -> Json<IngestionStatus> {
    Json(state.ingestion.status(&session).await)
}

/// POST /api/v1/candidates/upload/confirm
pub async fn handle_confirm(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<UploadReceipt>, AppError> {
    let receipt = state
        .ingestion
        .confirm(&session, Arc::clone(&state.candidate_store))
        .await?;
    Ok(Json(receipt))
}

/// DELETE /api/v1/candidates/upload
pub async fn handle_cancel(
    State(state): State<AppState>,
    session: Session,
) -> Result<StatusCode, AppError> {
    state.ingestion.cancel(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct CandidateListQuery {
    pub campaign_id: Option<Uuid>,
}

/// GET /api/v1/candidates
///
/// Lists the user's persisted candidates, optionally for one campaign.
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<CandidateListQuery>,
) -> Result<Json<Vec<CandidateRow>>, AppError> {
    let rows = sqlx::query_as::<_, CandidateRow>(
        r#"
        SELECT * FROM candidates
        WHERE user_id = $1 AND ($2::uuid IS NULL OR campaign_id = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(session.user_id)
    .bind(params.campaign_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

fn parse_campaign_id(raw: &str) -> Result<Option<Uuid>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Uuid::parse_str(raw)
        .map(Some)
        .map_err(|_| AppError::Validation(format!("campaign_id '{raw}' is not a valid UUID")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::FromRequest,
        http::{header, Request},
        response::IntoResponse,
    };

    use crate::ingest::coordinator::Phase;

    const BOUNDARY: &str = "leadsboundary";

    enum Part<'a> {
        File(&'a str, &'a [u8]),
        Text(&'a str, &'a str),
    }

    async fn multipart(parts: &[Part<'_>]) -> Multipart {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::File(file_name, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
                             Content-Type: text/csv\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                }
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                            .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::post("/api/v1/candidates/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    fn session() -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: None,
        }
    }

    async fn upload_status(state: &AppState, session: &Session, parts: &[Part<'_>]) -> StatusCode {
        handle_upload(State(state.clone()), session.clone(), multipart(parts).await)
            .await
            .into_response()
            .status()
    }

    #[tokio::test]
    async fn test_upload_stages_preview_for_campaign() {
        let state = AppState::offline();
        let session = session();
        let campaign = Uuid::new_v4();

        let campaign_field = campaign.to_string();
        let Json(staged) = handle_upload(
            State(state.clone()),
            session.clone(),
            multipart(&[
                Part::File("leads.csv", b"Name,Phone\nJohn Doe, 9876543210\n,1234567890"),
                Part::Text("campaign_id", &campaign_field),
            ])
            .await,
        )
        .await
        .unwrap();

        assert_eq!(staged.preview.total, 1);
        assert_eq!(staged.preview.campaign_id, Some(campaign));
        assert_eq!(staged.preview.rejected.len(), 1);
        assert_eq!(state.ingestion.status(&session).await.phase, Phase::Parsed);
    }

    #[tokio::test]
    async fn test_upload_rejections_map_to_status_codes() {
        let state = AppState::offline();
        let session = session();

        // No file field.
        assert_eq!(
            upload_status(&state, &session, &[Part::Text("campaign_id", "")]).await,
            StatusCode::BAD_REQUEST
        );
        // Wrong extension.
        assert_eq!(
            upload_status(&state, &session, &[Part::File("leads.xlsx", b"name,phone\nA,1")]).await,
            StatusCode::BAD_REQUEST
        );
        // Placeholder campaign id.
        assert_eq!(
            upload_status(
                &state,
                &session,
                &[
                    Part::File("leads.csv", b"name,phone\nA,1"),
                    Part::Text("campaign_id", "temp"),
                ],
            )
            .await,
            StatusCode::BAD_REQUEST
        );
        // Not text.
        assert_eq!(
            upload_status(&state, &session, &[Part::File("leads.csv", &[0xff, 0xfe, 0x00])]).await,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(state.ingestion.status(&session).await.phase, Phase::Idle);
    }

    #[test]
    fn test_blank_campaign_id_means_unassigned() {
        assert_eq!(parse_campaign_id("").unwrap(), None);
        assert_eq!(parse_campaign_id("   ").unwrap(), None);
    }

    #[test]
    fn test_campaign_id_parses_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_campaign_id(&format!(" {id} ")).unwrap(), Some(id));
    }

    #[test]
    fn test_campaign_id_rejects_placeholder() {
        assert!(matches!(
            parse_campaign_id("temp"),
            Err(AppError::Validation(_))
        ));
    }
}
