//! Ingestion coordinator. Drives one user's upload from file selection to
//! persisted candidates.
//!
//! State machine:
//!
//! ```text
//! idle ─select─▶ file_selected ─parse─▶ parsed ─confirm─▶ uploading ─ok─▶ done
//!   ▲                  │                  ▲                   │
//!   └──parse failure───┘                  └────insert failed──┘
//! ```
//!
//! `uploading` doubles as the in-flight flag: a second confirm is refused
//! instead of relying on the client to disable its button. The registry lock
//! is only held for transitions, never across the store call.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::Session;
use crate::ingest::row_parser::{header_cells, header_mapping, parse_rows};
use crate::ingest::store::{CandidateStore, StoreError};
use crate::ingest::validator::{validate_row, ColumnPolicy, RowRejection};
use crate::models::candidate::Candidate;
use crate::models::notification::Notification;

/// Rows shown in the preview; the rest are summarised as a count.
pub const PREVIEW_ROWS: usize = 10;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Only .csv files are supported (got '{0}')")]
    NotCsv(String),

    #[error("Error parsing file: {0}. Please check your file format and try again")]
    Unreadable(String),

    #[error("No upload in progress")]
    NothingStaged,

    #[error("Cannot {action} while {phase}")]
    InvalidTransition { phase: Phase, action: &'static str },

    #[error("An upload is already in progress")]
    UploadInFlight,

    #[error("No valid candidates to upload")]
    NoCandidates,

    #[error("{0}")]
    Store(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    FileSelected,
    Parsed,
    Uploading,
    Done,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Phase::Idle => "idle",
            Phase::FileSelected => "a file is selected",
            Phase::Parsed => "a preview is staged",
            Phase::Uploading => "uploading",
            Phase::Done => "done",
        };
        f.write_str(label)
    }
}

/// Result of parsing a file: every row either became a candidate or was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReport {
    pub candidates: Vec<Candidate>,
    pub rejections: Vec<RowRejection>,
}

/// Parses CSV text into candidates. Pure function of `text` and `policy`.
pub fn parse_candidates(text: &str, policy: ColumnPolicy) -> ParseReport {
    let header_width = header_cells(text).len();
    let mapping = header_mapping(text);

    let mut candidates = Vec::new();
    let mut rejections = Vec::new();
    for row in parse_rows(text, &mapping) {
        match validate_row(row, header_width, policy) {
            Ok(candidate) => candidates.push(candidate),
            Err(rejection) => rejections.push(rejection),
        }
    }

    ParseReport {
        candidates,
        rejections,
    }
}

#[derive(Debug, Clone)]
struct Staged {
    file_name: String,
    campaign_id: Option<Uuid>,
    report: ParseReport,
}

impl Staged {
    fn preview(&self) -> Preview {
        let total = self.report.candidates.len();
        Preview {
            file_name: self.file_name.clone(),
            campaign_id: self.campaign_id,
            total,
            rows: self
                .report
                .candidates
                .iter()
                .take(PREVIEW_ROWS)
                .cloned()
                .collect(),
            remaining: total.saturating_sub(PREVIEW_ROWS),
            rejected: self.report.rejections.clone(),
            upload_enabled: total > 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub file_name: String,
    pub campaign_id: Option<Uuid>,
    /// Candidates that passed validation.
    pub total: usize,
    pub rows: Vec<Candidate>,
    pub remaining: usize,
    pub rejected: Vec<RowRejection>,
    pub upload_enabled: bool,
}

#[derive(Debug, Clone)]
enum IngestionState {
    Idle,
    FileSelected { file_name: String },
    Parsed(Staged),
    Uploading(Staged),
    Done { inserted: u64 },
}

impl IngestionState {
    fn phase(&self) -> Phase {
        match self {
            IngestionState::Idle => Phase::Idle,
            IngestionState::FileSelected { .. } => Phase::FileSelected,
            IngestionState::Parsed(_) => Phase::Parsed,
            IngestionState::Uploading(_) => Phase::Uploading,
            IngestionState::Done { .. } => Phase::Done,
        }
    }
}

/// The batch handed to the store once an upload begins.
#[derive(Debug, Clone)]
pub struct UploadBatch {
    pub campaign_id: Option<Uuid>,
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadReceipt {
    pub inserted: u64,
    pub campaign_id: Option<Uuid>,
    pub notification: Notification,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestionStatus {
    pub phase: Phase,
    pub preview: Option<Preview>,
    pub last_inserted: Option<u64>,
    pub last_notification: Option<Notification>,
}

/// One user's ingestion state machine. Transitions are synchronous; the
/// async store call happens between `begin_upload` and `finish_upload`.
#[derive(Debug, Clone)]
pub struct IngestionCoordinator {
    state: IngestionState,
    policy: ColumnPolicy,
    last_notification: Option<Notification>,
}

impl IngestionCoordinator {
    pub fn new(policy: ColumnPolicy) -> Self {
        Self {
            state: IngestionState::Idle,
            policy,
            last_notification: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn status(&self) -> IngestionStatus {
        let preview = match &self.state {
            IngestionState::Parsed(staged) | IngestionState::Uploading(staged) => {
                Some(staged.preview())
            }
            _ => None,
        };
        let last_inserted = match self.state {
            IngestionState::Done { inserted } => Some(inserted),
            _ => None,
        };
        IngestionStatus {
            phase: self.phase(),
            preview,
            last_inserted,
            last_notification: self.last_notification.clone(),
        }
    }

    /// `idle → file_selected`. Selecting a new file replaces any staged preview.
    pub fn select_file(&mut self, file_name: &str) -> Result<(), IngestError> {
        if self.phase() == Phase::Uploading {
            return Err(IngestError::InvalidTransition {
                phase: Phase::Uploading,
                action: "select a new file",
            });
        }
        if !file_name.to_ascii_lowercase().ends_with(".csv") {
            return Err(IngestError::NotCsv(file_name.to_string()));
        }
        self.state = IngestionState::FileSelected {
            file_name: file_name.to_string(),
        };
        Ok(())
    }

    /// `file_selected → parsed`, or back to `idle` if the bytes are not text.
    pub fn parse(
        &mut self,
        bytes: &[u8],
        campaign_id: Option<Uuid>,
    ) -> Result<(Preview, Notification), IngestError> {
        let file_name = match &self.state {
            IngestionState::FileSelected { file_name } => file_name.clone(),
            _ => {
                return Err(IngestError::InvalidTransition {
                    phase: self.phase(),
                    action: "parse",
                })
            }
        };

        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                let err = IngestError::Unreadable(e.to_string());
                self.state = IngestionState::Idle;
                self.last_notification = Some(Notification::failure(
                    "Error parsing file",
                    "Please check your file format and try again",
                ));
                return Err(err);
            }
        };

        let report = parse_candidates(text, self.policy);
        let staged = Staged {
            file_name,
            campaign_id,
            report,
        };
        let preview = staged.preview();
        let notification = Notification::success(
            "File parsed successfully",
            format!("Found {} valid candidates", preview.total),
        );

        self.state = IngestionState::Parsed(staged);
        self.last_notification = Some(notification.clone());
        Ok((preview, notification))
    }

    /// `parsed → uploading`. Fails while another upload is in flight.
    pub fn begin_upload(&mut self) -> Result<UploadBatch, IngestError> {
        let staged = match &self.state {
            IngestionState::Parsed(staged) => staged.clone(),
            IngestionState::Uploading(_) => return Err(IngestError::UploadInFlight),
            _ => return Err(IngestError::NothingStaged),
        };
        if staged.report.candidates.is_empty() {
            return Err(IngestError::NoCandidates);
        }

        let batch = UploadBatch {
            campaign_id: staged.campaign_id,
            candidates: staged.report.candidates.clone(),
        };
        self.state = IngestionState::Uploading(staged);
        Ok(batch)
    }

    /// `uploading → done` on success; `uploading → parsed` on failure, keeping
    /// the preview so the user can retry.
    pub fn finish_upload(
        &mut self,
        result: Result<u64, StoreError>,
    ) -> Result<UploadReceipt, IngestError> {
        let staged = match std::mem::replace(&mut self.state, IngestionState::Idle) {
            IngestionState::Uploading(staged) => staged,
            other => {
                let phase = other.phase();
                self.state = other;
                return Err(IngestError::InvalidTransition {
                    phase,
                    action: "finish an upload",
                });
            }
        };

        match result {
            Ok(inserted) => {
                let notification = Notification::success(
                    "Candidates uploaded successfully",
                    format!("{inserted} candidates have been added"),
                );
                self.state = IngestionState::Done { inserted };
                self.last_notification = Some(notification.clone());
                Ok(UploadReceipt {
                    inserted,
                    campaign_id: staged.campaign_id,
                    notification,
                })
            }
            Err(e) => {
                let message = e.to_string();
                self.state = IngestionState::Parsed(staged);
                self.last_notification = Some(Notification::failure("Upload failed", &message));
                Err(IngestError::Store(message))
            }
        }
    }

    /// Discards any staged preview. Not allowed mid-upload.
    pub fn cancel(&mut self) -> Result<(), IngestError> {
        if self.phase() == Phase::Uploading {
            return Err(IngestError::InvalidTransition {
                phase: Phase::Uploading,
                action: "cancel",
            });
        }
        self.state = IngestionState::Idle;
        self.last_notification = None;
        Ok(())
    }
}

/// Per-user coordinators, shared across request handlers.
#[derive(Clone)]
pub struct IngestionRegistry {
    coordinators: Arc<Mutex<HashMap<Uuid, IngestionCoordinator>>>,
    policy: ColumnPolicy,
}

#[derive(Debug, Clone, Serialize)]
pub struct StagedUpload {
    pub preview: Preview,
    pub notification: Notification,
}

impl IngestionRegistry {
    pub fn new(policy: ColumnPolicy) -> Self {
        Self {
            coordinators: Arc::new(Mutex::new(HashMap::new())),
            policy,
        }
    }

    /// Selects and parses a file in one step, staging its preview.
    pub async fn stage(
        &self,
        session: &Session,
        file_name: &str,
        bytes: &[u8],
        campaign_id: Option<Uuid>,
    ) -> Result<StagedUpload, IngestError> {
        let mut coordinators = self.coordinators.lock().await;
        let coordinator = coordinators
            .entry(session.user_id)
            .or_insert_with(|| IngestionCoordinator::new(self.policy));

        coordinator.select_file(file_name)?;
        let (preview, notification) = coordinator.parse(bytes, campaign_id)?;

        info!(
            "Staged {} candidates ({} rejected) from '{}' for user {}",
            preview.total,
            preview.rejected.len(),
            file_name,
            session.user_id
        );
        Ok(StagedUpload {
            preview,
            notification,
        })
    }

    pub async fn status(&self, session: &Session) -> IngestionStatus {
        let coordinators = self.coordinators.lock().await;
        coordinators
            .get(&session.user_id)
            .map(IngestionCoordinator::status)
            .unwrap_or_else(|| IngestionCoordinator::new(self.policy).status())
    }

    /// Persists the staged candidates. All-or-nothing; no automatic retry.
    ///
    /// The insert runs on its own task, which always records the outcome.
    /// A caller that stops waiting leaves the upload to finish on its own.
    pub async fn confirm(
        &self,
        session: &Session,
        store: Arc<dyn CandidateStore>,
    ) -> Result<UploadReceipt, IngestError> {
        let user_id = session.user_id;
        let batch = {
            let mut coordinators = self.coordinators.lock().await;
            let coordinator = coordinators
                .get_mut(&user_id)
                .ok_or(IngestError::NothingStaged)?;
            coordinator.begin_upload()?
        };

        let registry = self.clone();
        let upload = tokio::spawn(async move {
            let result = store
                .bulk_insert(user_id, batch.campaign_id, &batch.candidates)
                .await;
            registry.finish(user_id, result).await
        });

        match upload.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Upload task for user {user_id} did not complete: {e}");
                self.finish(user_id, Err(StoreError::Rejected(e.to_string())))
                    .await
            }
        }
    }

    async fn finish(
        &self,
        user_id: Uuid,
        result: Result<u64, StoreError>,
    ) -> Result<UploadReceipt, IngestError> {
        if let Err(e) = &result {
            warn!("Bulk insert failed for user {user_id}: {e}");
        }
        let mut coordinators = self.coordinators.lock().await;
        let coordinator = coordinators
            .get_mut(&user_id)
            .ok_or(IngestError::NothingStaged)?;
        coordinator.finish_upload(result)
    }

    /// Discards the user's coordinator along with any staged preview.
    pub async fn cancel(&self, session: &Session) -> Result<(), IngestError> {
        let mut coordinators = self.coordinators.lock().await;
        if let Some(coordinator) = coordinators.get_mut(&session.user_id) {
            coordinator.cancel()?;
            coordinators.remove(&session.user_id);
        }
        Ok(())
    }
}
