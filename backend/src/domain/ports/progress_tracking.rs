//! Driving ports for lecture completion tracking.

use async_trait::async_trait;

use crate::domain::{CourseId, Error, SubsectionId, UserId};

/// Completion state of one course for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub course: CourseId,
    pub completed: Vec<SubsectionId>,
    pub total_subsections: usize,
    pub percentage: u8,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressCommand: Send + Sync {
    /// Mark a subsection of `course` as watched.
    async fn mark_complete(
        &self,
        user: &UserId,
        course: &CourseId,
        subsection: &SubsectionId,
    ) -> Result<ProgressView, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressQuery: Send + Sync {
    async fn progress(&self, user: &UserId, course: &CourseId) -> Result<ProgressView, Error>;
}
