//! Driving port for catalogue authoring: categories, courses and outlines.

use async_trait::async_trait;

use crate::domain::{
    Category, Course, CourseChanges, CourseId, CourseStatus, Error, NewCourseParts, Section,
    SectionId, Subsection, SubsectionChanges, SubsectionId, UserId,
};

/// Request to append a subsection to a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddSubsectionRequest {
    pub section: SectionId,
    pub title: String,
    pub description: String,
    pub duration_secs: u32,
    pub video_url: String,
}

/// Authoring operations. Role checks happen in inbound adapters; ownership
/// checks happen here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueCommand: Send + Sync {
    async fn create_category(&self, name: &str, description: &str) -> Result<Category, Error>;

    /// Create a draft course owned by `parts.instructor`.
    async fn create_course(&self, parts: NewCourseParts) -> Result<Course, Error>;

    /// Publish or unpublish a course the instructor owns.
    async fn set_course_status(
        &self,
        instructor: &UserId,
        course: &CourseId,
        status: CourseStatus,
    ) -> Result<Course, Error>;

    /// Edit an owned course. Enrolled students keep their access.
    async fn edit_course(
        &self,
        instructor: &UserId,
        course: &CourseId,
        changes: CourseChanges,
    ) -> Result<Course, Error>;

    /// Delete an owned course that no student is enrolled in.
    async fn delete_course(&self, instructor: &UserId, course: &CourseId) -> Result<(), Error>;

    async fn add_section(
        &self,
        instructor: &UserId,
        course: &CourseId,
        name: &str,
    ) -> Result<Section, Error>;

    async fn add_subsection(
        &self,
        instructor: &UserId,
        request: AddSubsectionRequest,
    ) -> Result<Subsection, Error>;

    async fn rename_section(
        &self,
        instructor: &UserId,
        section: &SectionId,
        name: &str,
    ) -> Result<Section, Error>;

    /// Delete a section of an owned course with all its subsections.
    async fn delete_section(&self, instructor: &UserId, section: &SectionId) -> Result<(), Error>;

    async fn edit_subsection(
        &self,
        instructor: &UserId,
        subsection: &SubsectionId,
        changes: SubsectionChanges,
    ) -> Result<Subsection, Error>;

    async fn delete_subsection(
        &self,
        instructor: &UserId,
        subsection: &SubsectionId,
    ) -> Result<(), Error>;
}
