//! Port for course progress records.
use async_trait::async_trait;

use crate::domain::{CourseId, CourseProgress, SubsectionId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by progress repository adapters.
    pub enum ProgressRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "progress repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "progress repository query failed: {message}",
    }
}

/// Result of recording a completed subsection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Recorded,
    AlreadyCompleted,
    /// No progress record exists for the pair.
    MissingProgress,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    async fn find(
        &self,
        course: &CourseId,
        user: &UserId,
    ) -> Result<Option<CourseProgress>, ProgressRepositoryError>;

    /// Every progress record held by `user`.
    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<CourseProgress>, ProgressRepositoryError>;

    async fn record_completion(
        &self,
        course: &CourseId,
        user: &UserId,
        subsection: &SubsectionId,
    ) -> Result<CompletionOutcome, ProgressRepositoryError>;
}
