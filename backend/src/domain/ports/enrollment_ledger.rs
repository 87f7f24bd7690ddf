//! Port for the atomic enrollment write.
//!
//! One call covers one (course, user) pair and applies three changes as a
//! unit: add the user to the course's enrolled set, create the empty progress
//! record, and append the course to the user's course list. Either all three
//! are durable or none is.

use async_trait::async_trait;

use crate::domain::{CourseId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by enrollment ledger adapters.
    pub enum EnrollmentLedgerError {
        /// Ledger connection could not be established.
        Connection { message: String } => "enrollment ledger connection failed: {message}",
        /// The transaction failed and was rolled back.
        Query { message: String } => "enrollment ledger query failed: {message}",
    }
}

/// Result of one enrollment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollOutcome {
    /// All three records were written.
    Enrolled { course_title: String },
    /// The pair already existed; nothing was written.
    AlreadyEnrolled,
    /// The course does not exist; nothing was written.
    CourseNotFound,
    /// The user does not exist; nothing was written.
    UserNotFound,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentLedger: Send + Sync {
    /// Enroll `user` in `course`.
    ///
    /// Uniqueness of the pair is enforced by the store, so concurrent calls
    /// for the same pair yield exactly one [`EnrollOutcome::Enrolled`].
    async fn enroll(
        &self,
        course: &CourseId,
        user: &UserId,
    ) -> Result<EnrollOutcome, EnrollmentLedgerError>;
}
