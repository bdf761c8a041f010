use serde::Serialize;

use crate::ingest::row_parser::{ParsedRow, RawCandidate};
use crate::models::candidate::Candidate;

/// How rows whose cell count differs from the header's are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColumnPolicy {
    /// Reject the row. Catches commas inside values, which the parser cannot escape.
    #[default]
    Strict,
    /// Pad short rows with empty cells and ignore extra cells.
    Lenient,
}

impl ColumnPolicy {
    pub fn from_strict_flag(strict: bool) -> Self {
        if strict {
            ColumnPolicy::Strict
        } else {
            ColumnPolicy::Lenient
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectionReason {
    MissingName,
    MissingPhone,
    MissingNameAndPhone,
    ColumnCountMismatch { expected: usize, found: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRejection {
    pub line_number: usize,
    #[serde(flatten)]
    pub reason: RejectionReason,
}

/// `None` iff both required fields are present and non-blank.
fn missing_required(record: &RawCandidate) -> Option<RejectionReason> {
    let has_name = non_blank(record.name.as_deref()).is_some();
    let has_phone = non_blank(record.phone.as_deref()).is_some();
    match (has_name, has_phone) {
        (true, true) => None,
        (false, true) => Some(RejectionReason::MissingName),
        (true, false) => Some(RejectionReason::MissingPhone),
        (false, false) => Some(RejectionReason::MissingNameAndPhone),
    }
}

/// Validates one parsed row, turning it into an insertable candidate.
pub fn validate_row(
    row: ParsedRow,
    header_width: usize,
    policy: ColumnPolicy,
) -> Result<Candidate, RowRejection> {
    let line_number = row.line_number;
    let reject = |reason| RowRejection {
        line_number,
        reason,
    };

    if policy == ColumnPolicy::Strict && row.cell_count != header_width {
        return Err(reject(RejectionReason::ColumnCountMismatch {
            expected: header_width,
            found: row.cell_count,
        }));
    }

    if let Some(reason) = missing_required(&row.record) {
        return Err(reject(reason));
    }

    let RawCandidate {
        name,
        phone,
        email,
        city,
        course,
    } = row.record;

    Ok(Candidate {
        name: name.map(|v| v.trim().to_string()).unwrap_or_default(),
        phone: phone.map(|v| v.trim().to_string()).unwrap_or_default(),
        email: owned_non_blank(email),
        city: owned_non_blank(city),
        course: owned_non_blank(course),
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn owned_non_blank(value: Option<String>) -> Option<String> {
    non_blank(value.as_deref()).map(str::to_string)
}
