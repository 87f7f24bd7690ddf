//! Shared Diesel error mapping for every repository adapter.
//!
//! Each port error exposes `connection` and `query` constructors. The
//! [`StoreError`] trait lets one mapping serve them all.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{
    CategoryRepositoryError, CourseRepositoryError, EnrollmentLedgerError,
    ProgressRepositoryError, RatingRepositoryError, UserPersistenceError,
};

use super::pool::PoolError;

/// Port errors with connection and query variants.
pub(crate) trait StoreError {
    fn connection_failure(message: String) -> Self;
    fn query_failure(message: String) -> Self;
}

macro_rules! impl_store_error {
    ($($error:ty),* $(,)?) => {
        $(
            impl StoreError for $error {
                fn connection_failure(message: String) -> Self {
                    Self::connection(message)
                }

                fn query_failure(message: String) -> Self {
                    Self::query(message)
                }
            }
        )*
    };
}

impl_store_error!(
    CategoryRepositoryError,
    CourseRepositoryError,
    EnrollmentLedgerError,
    ProgressRepositoryError,
    RatingRepositoryError,
    UserPersistenceError,
);

/// Map pool checkout failures to a connection error.
pub(crate) fn map_pool_error<E: StoreError>(error: PoolError) -> E {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    E::connection_failure(message)
}

/// Map Diesel failures; raw database text stays in debug logs only.
pub(crate) fn map_diesel_error<E: StoreError>(error: DieselError) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => E::query_failure("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => E::query_failure("database query error".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            E::connection_failure("database connection error".to_owned())
        }
        _ => E::query_failure("database error".to_owned()),
    }
}

/// Whether `error` is a unique constraint violation.
pub(crate) fn is_unique_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

/// Whether `error` is a foreign key violation.
pub(crate) fn is_foreign_key_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)
    )
}

/// Wrap a row conversion failure.
pub(crate) fn invalid_row<E: StoreError>(message: String) -> E {
    E::query_failure(message)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let error: CourseRepositoryError = map_pool_error(PoolError::checkout("refused"));
        assert!(matches!(error, CourseRepositoryError::Connection { .. }));
        assert!(error.to_string().contains("refused"));
    }

    #[rstest]
    #[case(DieselError::NotFound, "record not found")]
    #[case(DieselError::RollbackTransaction, "database error")]
    fn diesel_errors_map_to_redacted_query_errors(
        #[case] error: DieselError,
        #[case] message: &str,
    ) {
        let mapped: RatingRepositoryError = map_diesel_error(error);
        assert_eq!(mapped, RatingRepositoryError::query(message));
    }

    #[rstest]
    fn unique_violation_is_detected() {
        assert!(!is_unique_violation(&DieselError::NotFound));
    }

    #[rstest]
    fn foreign_key_violation_is_not_a_generic_failure() {
        assert!(!is_foreign_key_violation(&DieselError::RollbackTransaction));
    }
}
