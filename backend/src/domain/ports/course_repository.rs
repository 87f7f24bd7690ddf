//! Port for course and outline persistence.
//!
//! Loaded [`Course`] values carry their enrolled-student set so checkout can
//! detect existing enrollments without a second query.

use async_trait::async_trait;

use crate::domain::{
    Course, CourseFilter, CourseId, CourseOutline, CourseStatus, Section, SectionId, Subsection,
    SubsectionId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by course repository adapters.
    pub enum CourseRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "course repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "course repository query failed: {message}",
    }
}

/// Outcome of [`CourseRepository::delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseRemoval {
    /// The course, its outline and its ratings are gone.
    Removed,
    NotFound,
    /// Students hold enrollments, so the course was kept.
    HasStudents,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create(&self, course: &Course) -> Result<(), CourseRepositoryError>;

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CourseRepositoryError>;

    /// Fetch every course in `ids` that exists. Missing ids are skipped, so
    /// callers compare lengths to detect unknown courses.
    async fn find_many(&self, ids: &[CourseId]) -> Result<Vec<Course>, CourseRepositoryError>;

    /// Courses matching `filter`, newest first.
    async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>, CourseRepositoryError>;

    /// Update the publication status. Returns `false` when the course is absent.
    async fn set_status(
        &self,
        id: &CourseId,
        status: CourseStatus,
    ) -> Result<bool, CourseRepositoryError>;

    /// Overwrite the editable fields of a stored course. Returns `false`
    /// when the course is absent.
    async fn update(&self, course: &Course) -> Result<bool, CourseRepositoryError>;

    /// Delete a course with its outline and ratings unless a student is
    /// enrolled. The check and the delete are atomic with respect to
    /// concurrent enrollments.
    async fn delete(&self, id: &CourseId) -> Result<CourseRemoval, CourseRepositoryError>;

    async fn add_section(&self, section: &Section) -> Result<(), CourseRepositoryError>;

    /// Rename a section. Returns `false` when the section is absent.
    async fn update_section(&self, section: &Section) -> Result<bool, CourseRepositoryError>;

    /// Delete a section and its subsections, including any completion marks
    /// recorded against them.
    async fn delete_section(&self, id: &SectionId) -> Result<bool, CourseRepositoryError>;

    async fn add_subsection(&self, subsection: &Subsection) -> Result<(), CourseRepositoryError>;

    async fn find_section(&self, id: &SectionId) -> Result<Option<Section>, CourseRepositoryError>;

    async fn find_subsection(
        &self,
        id: &SubsectionId,
    ) -> Result<Option<Subsection>, CourseRepositoryError>;

    async fn update_subsection(&self, subsection: &Subsection)
    -> Result<bool, CourseRepositoryError>;

    /// Delete a subsection and any completion marks recorded against it.
    async fn delete_subsection(&self, id: &SubsectionId) -> Result<bool, CourseRepositoryError>;

    /// Sections and subsections of a course in insertion order.
    async fn outline(&self, id: &CourseId) -> Result<CourseOutline, CourseRepositoryError>;

    /// The course owning `subsection`, if the subsection exists.
    async fn course_for_subsection(
        &self,
        subsection: &SubsectionId,
    ) -> Result<Option<CourseId>, CourseRepositoryError>;
}
