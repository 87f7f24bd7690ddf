//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every request body is parsed into a typed payload first; these helpers
//! turn the remaining semantic failures into `invalid_request` errors with
//! `{field, code, value?}` details.

use std::str::FromStr;

use actix_web::web;
use serde_json::json;

use crate::domain::{Error, IdValidationError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) const fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": ErrorCode::MissingField.as_str(),
    }))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

pub(crate) fn invalid_uuid_index_error(field: FieldName, index: usize, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must contain valid UUIDs")).with_details(json!({
        "field": field,
        "index": index,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

/// Wrap a domain validation message with the offending field.
pub(crate) fn invalid_field_error(field: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": ErrorCode::InvalidValue.as_str(),
    }))
}

/// JSON extractor settings: malformed bodies answer with the error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("invalid request body: {err}"))
            .with_details(json!({ "code": ErrorCode::InvalidValue.as_str() }))
            .into()
    })
}

/// Parse a typed identifier, mapping blanks to `missing_field`.
pub(crate) fn parse_id<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = IdValidationError>,
{
    value.parse().map_err(|err| match err {
        IdValidationError::Empty => missing_field_error(field),
        IdValidationError::Invalid => invalid_uuid_error(field, value),
    })
}

/// Parse a list of typed identifiers, reporting the first bad index.
pub(crate) fn parse_id_list<T>(values: &[String], field: FieldName) -> Result<Vec<T>, Error>
where
    T: FromStr<Err = IdValidationError>,
{
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            value
                .parse()
                .map_err(|_| invalid_uuid_index_error(field, index, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::CourseId;

    const COURSE: FieldName = FieldName::new("courseId");

    #[rstest]
    fn blank_ids_are_missing_fields() {
        let error = parse_id::<CourseId>("", COURSE).expect_err("blank");
        assert_eq!(
            error.details(),
            Some(&json!({"field": "courseId", "code": "missing_field"}))
        );
    }

    #[rstest]
    fn malformed_ids_echo_the_value() {
        let error = parse_id::<CourseId>("nope", COURSE).expect_err("malformed");
        assert_eq!(error.message(), "courseId must be a valid UUID");
        assert_eq!(
            error.details(),
            Some(&json!({"field": "courseId", "value": "nope", "code": "invalid_uuid"}))
        );
    }

    #[rstest]
    fn id_lists_report_the_failing_index() {
        let values = vec![CourseId::random().to_string(), "bad".to_owned()];
        let error = parse_id_list::<CourseId>(&values, FieldName::new("courses"))
            .expect_err("bad entry");
        assert_eq!(error.details().and_then(|d| d.get("index")), Some(&json!(1)));
    }
}
