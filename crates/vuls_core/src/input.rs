use crate::{PageInputError, PageNumber};

/// Validates the text typed into the jump-to-page prompt.
pub fn parse_page_input(raw: &str) -> Result<PageNumber, PageInputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PageInputError::Empty);
    }

    // Parse signed first so "-5" is reported as non-positive, not non-numeric.
    let value: i64 = trimmed.parse().map_err(|_| {
        if trimmed.starts_with('-') && trimmed[1..].chars().all(|c| c.is_ascii_digit()) {
            PageInputError::NotPositive
        } else {
            PageInputError::NotANumber
        }
    })?;
    if value < 1 {
        return Err(PageInputError::NotPositive);
    }
    PageNumber::try_from(value).map_err(|_| PageInputError::NotANumber)
}
