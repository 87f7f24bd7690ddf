//! Validation helpers shared by catalogue entities.

use super::CatalogueValidationError;

pub(super) const TITLE_MAX: usize = 120;
pub(super) const TEXT_MAX: usize = 5_000;
pub(super) const TAG_MAX: usize = 40;

/// Trim `value` and require it to be non-empty and at most `max` characters.
pub(super) fn required_text(
    value: &str,
    field: &'static str,
    max: usize,
) -> Result<String, CatalogueValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogueValidationError::EmptyField { field });
    }
    if trimmed.chars().count() > max {
        return Err(CatalogueValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Trim every entry, drop blanks and repeats, and bound each entry's length.
pub(super) fn text_list(
    values: Vec<String>,
    field: &'static str,
    max: usize,
) -> Result<Vec<String>, CatalogueValidationError> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() || out.iter().any(|existing| existing == trimmed) {
            continue;
        }
        if trimmed.chars().count() > max {
            return Err(CatalogueValidationError::TooLong { field, max });
        }
        out.push(trimmed.to_owned());
    }
    Ok(out)
}

pub(super) fn http_url(
    value: &str,
    field: &'static str,
) -> Result<String, CatalogueValidationError> {
    let trimmed = value.trim();
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.chars().any(char::is_whitespace) => {
            Ok(trimmed.to_owned())
        }
        _ => Err(CatalogueValidationError::InvalidUrl { field }),
    }
}
