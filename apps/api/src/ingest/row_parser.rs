//! Naive comma-split row parser.
//!
//! There is no quoting or escaping: a comma inside a value shifts every
//! following cell one column to the right. Rows are aligned to the header by
//! position only.

use crate::ingest::field_mapper::{map_headers, CandidateField};

pub const DELIMITER: char = ',';

/// A row as parsed, before validation. A field is `Some` whenever a column is
/// mapped to it, even if the cell was empty or missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCandidate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub course: Option<String>,
}

impl RawCandidate {
    fn set(&mut self, field: CandidateField, value: String) {
        let slot = match field {
            CandidateField::Name => &mut self.name,
            CandidateField::Phone => &mut self.phone,
            CandidateField::Email => &mut self.email,
            CandidateField::City => &mut self.city,
            CandidateField::Course => &mut self.course,
        };
        *slot = Some(value);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// 1-based line number in the source text (the header is line 1).
    pub line_number: usize,
    pub cell_count: usize,
    pub record: RawCandidate,
}

/// Splits the header line (line 0) into raw cells.
pub fn header_cells(text: &str) -> Vec<&str> {
    text.split('\n')
        .next()
        .unwrap_or_default()
        .split(DELIMITER)
        .collect()
}

/// Classifies the header line of `text`.
pub fn header_mapping(text: &str) -> Vec<Option<CandidateField>> {
    map_headers(header_cells(text))
}

/// Lazily parses every non-blank line after the header.
pub fn parse_rows<'a>(
    text: &'a str,
    mapping: &'a [Option<CandidateField>],
) -> impl Iterator<Item = ParsedRow> + 'a {
    text.split('\n')
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(move |(index, line)| build_row(index + 1, line, mapping))
}

fn build_row(line_number: usize, line: &str, mapping: &[Option<CandidateField>]) -> ParsedRow {
    let cells: Vec<&str> = line.split(DELIMITER).collect();
    let mut record = RawCandidate::default();

    // Later columns overwrite earlier ones mapped to the same field.
    for (index, tag) in mapping.iter().enumerate() {
        if let Some(field) = tag {
            let value = cells.get(index).map(|c| c.trim()).unwrap_or_default();
            record.set(*field, value.to_string());
        }
    }

    ParsedRow {
        line_number,
        cell_count: cells.len(),
        record,
    }
}
