//! Header classification: which candidate field each CSV column feeds.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateField {
    Name,
    Phone,
    Email,
    City,
    Course,
}

/// Classifies one header cell by substring, in fixed priority order.
///
/// The cell is trimmed and lower-cased first, so `" Student Name "` maps to
/// `Name`. A header such as `"parent phone name"` maps to `Name` because the
/// name check runs first.
pub fn classify_header(cell: &str) -> Option<CandidateField> {
    let header = cell.trim().to_lowercase();

    if header.contains("name") {
        Some(CandidateField::Name)
    } else if header.contains("phone") || header.contains("mobile") {
        Some(CandidateField::Phone)
    } else if header.contains("email") {
        Some(CandidateField::Email)
    } else if header.contains("city") {
        Some(CandidateField::City)
    } else if header.contains("course") {
        Some(CandidateField::Course)
    } else {
        None
    }
}

/// Maps every header cell to its field tag, preserving column order.
/// Unmapped and duplicate-mapped columns are not errors.
pub fn map_headers<'a, I>(cells: I) -> Vec<Option<CandidateField>>
where
    I: IntoIterator<Item = &'a str>,
{
    cells.into_iter().map(classify_header).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_headers() {
        let mapping = map_headers(["Name", "Phone", "Email", "City", "Course"]);
        assert_eq!(
            mapping,
            vec![
                Some(CandidateField::Name),
                Some(CandidateField::Phone),
                Some(CandidateField::Email),
                Some(CandidateField::City),
                Some(CandidateField::Course),
            ]
        );
    }

    #[test]
    fn test_mobile_maps_to_phone() {
        assert_eq!(classify_header("Mobile No"), Some(CandidateField::Phone));
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        assert_eq!(classify_header("  FULL NAME\r"), Some(CandidateField::Name));
        assert_eq!(classify_header("\tPhone Number "), Some(CandidateField::Phone));
    }

    #[test]
    fn test_position_independent() {
        let mapping = map_headers(["City", "Contact Phone", "Remarks", "Student Name"]);
        assert_eq!(mapping[0], Some(CandidateField::City));
        assert_eq!(mapping[1], Some(CandidateField::Phone));
        assert_eq!(mapping[2], None);
        assert_eq!(mapping[3], Some(CandidateField::Name));
    }

    #[test]
    fn test_name_wins_over_later_keywords() {
        assert_eq!(classify_header("email name"), Some(CandidateField::Name));
        assert_eq!(classify_header("phone email"), Some(CandidateField::Phone));
        assert_eq!(classify_header("city course"), Some(CandidateField::City));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mapping = map_headers(["phone", "alt phone"]);
        assert_eq!(
            mapping,
            vec![Some(CandidateField::Phone), Some(CandidateField::Phone)]
        );
    }

    #[test]
    fn test_unknown_header_is_unmapped() {
        assert_eq!(classify_header("Score"), None);
        assert_eq!(classify_header(""), None);
    }
}
