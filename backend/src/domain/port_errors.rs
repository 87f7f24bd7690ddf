//! Translation of driven-port errors into domain [`Error`]s.
//!
//! Connection failures become `service_unavailable`; query failures become
//! `internal_error` so their text is redacted at the HTTP boundary.

use serde_json::json;

use super::Error;
use super::ports::{
    CategoryRepositoryError, CourseRepositoryError, EnrollmentLedgerError, PaymentGatewayError,
    ProgressRepositoryError, RatingRepositoryError, UserPersistenceError,
};

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::conflict("an account with this email already exists")
        }
    }
}

pub(crate) fn map_category_error(error: CategoryRepositoryError) -> Error {
    match error {
        CategoryRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("category repository unavailable: {message}"))
        }
        CategoryRepositoryError::Query { message } => {
            Error::internal(format!("category repository error: {message}"))
        }
        CategoryRepositoryError::DuplicateName { name } => {
            Error::conflict(format!("category {name} already exists"))
        }
    }
}

pub(crate) fn map_course_error(error: CourseRepositoryError) -> Error {
    match error {
        CourseRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("course repository unavailable: {message}"))
        }
        CourseRepositoryError::Query { message } => {
            Error::internal(format!("course repository error: {message}"))
        }
    }
}

pub(crate) fn map_progress_error(error: ProgressRepositoryError) -> Error {
    match error {
        ProgressRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("progress repository unavailable: {message}"))
        }
        ProgressRepositoryError::Query { message } => {
            Error::internal(format!("progress repository error: {message}"))
        }
    }
}

pub(crate) fn map_rating_error(error: RatingRepositoryError) -> Error {
    match error {
        RatingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("rating repository unavailable: {message}"))
        }
        RatingRepositoryError::Query { message } => {
            Error::internal(format!("rating repository error: {message}"))
        }
        RatingRepositoryError::Duplicate => Error::conflict("Course is already reviewed by the user"),
    }
}

/// Short reason recorded against a course whose enrollment write failed.
pub(crate) fn ledger_failure_reason(error: &EnrollmentLedgerError) -> &'static str {
    match error {
        EnrollmentLedgerError::Connection { .. } => "enrollment store unavailable",
        EnrollmentLedgerError::Query { .. } => "enrollment write failed",
    }
}

/// Every gateway failure is an upstream failure; details tell the caller
/// whether retrying makes sense.
pub(crate) fn map_gateway_error(error: &PaymentGatewayError) -> Error {
    Error::upstream_failure("payment gateway could not create the order")
        .with_details(gateway_details(error))
}

/// Map a failed order lookup during verification.
///
/// A definitive client-side rejection means the claimed order is not ours
/// to honour; anything else is an upstream failure the client may retry.
pub(crate) fn map_gateway_lookup_error(error: &PaymentGatewayError) -> Error {
    match error.provider_status() {
        Some(status) if (400..500).contains(&status) && !error.is_retryable() => {
            Error::payment_rejected("Payment verification failed")
        }
        _ => Error::upstream_failure("payment gateway could not confirm the order")
            .with_details(gateway_details(error)),
    }
}

fn gateway_details(error: &PaymentGatewayError) -> serde_json::Value {
    let mut details = json!({ "retryable": error.is_retryable() });
    if let Some(status) = error.provider_status() {
        details["providerStatus"] = json!(status);
    }
    if let Some(description) = error.provider_description() {
        details["providerDescription"] = json!(description);
    }
    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(UserPersistenceError::connection("down"), ErrorCode::ServiceUnavailable)]
    #[case(UserPersistenceError::query("boom"), ErrorCode::InternalError)]
    #[case(UserPersistenceError::duplicate_email("a@b.co"), ErrorCode::Conflict)]
    fn user_errors_map_to_codes(#[case] error: UserPersistenceError, #[case] code: ErrorCode) {
        assert_eq!(map_user_error(error).code(), code);
    }

    #[rstest]
    fn gateway_errors_carry_retry_details() {
        let error = map_gateway_error(&PaymentGatewayError::rejected(503_u16, "maintenance"));
        assert_eq!(error.code(), ErrorCode::UpstreamFailure);
        assert_eq!(
            error.details(),
            Some(&json!({
                "providerStatus": 503,
                "providerDescription": "maintenance",
                "retryable": true,
            }))
        );
    }

    #[rstest]
    #[case(PaymentGatewayError::rejected(404_u16, "The id provided does not exist"), ErrorCode::PaymentRejected)]
    #[case(PaymentGatewayError::rejected(429_u16, "slow down"), ErrorCode::UpstreamFailure)]
    #[case(PaymentGatewayError::rejected(502_u16, "bad gateway"), ErrorCode::UpstreamFailure)]
    #[case(PaymentGatewayError::timeout("10s"), ErrorCode::UpstreamFailure)]
    fn order_lookup_failures_split_on_finality(
        #[case] error: PaymentGatewayError,
        #[case] code: ErrorCode,
    ) {
        let mapped = map_gateway_lookup_error(&error);
        assert_eq!(mapped.code(), code);
        assert_eq!(mapped.details().is_none(), code == ErrorCode::PaymentRejected);
    }

    #[rstest]
    fn gateway_rejections_pass_the_provider_description_through() {
        let error = map_gateway_error(&PaymentGatewayError::rejected(
            400_u16,
            "The amount must be atleast INR 1.00",
        ));
        let details = error.details().expect("details");
        assert_eq!(details["providerDescription"], "The amount must be atleast INR 1.00");
        assert_eq!(details["retryable"], false);
    }

    #[rstest]
    fn blank_provider_descriptions_are_omitted() {
        let error = map_gateway_error(&PaymentGatewayError::rejected(502_u16, "  "));
        let details = error.details().expect("details");
        assert!(details.get("providerDescription").is_none());
    }

    #[rstest]
    fn gateway_timeouts_have_no_provider_status() {
        let error = map_gateway_error(&PaymentGatewayError::timeout("10s"));
        assert_eq!(
            error.details(),
            Some(&json!({ "retryable": true }))
        );
    }
}
