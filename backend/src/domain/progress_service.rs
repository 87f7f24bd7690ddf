//! Lecture completion tracking.

use std::sync::Arc;

use async_trait::async_trait;

use super::port_errors::{map_course_error, map_progress_error};
use super::ports::{
    CompletionOutcome, CourseRepository, ProgressCommand, ProgressQuery, ProgressRepository,
    ProgressView,
};
use super::{CourseId, Error, SubsectionId, UserId};

const MISSING_PROGRESS: &str = "Course progress does not exist";

#[derive(Clone)]
pub struct ProgressService {
    courses: Arc<dyn CourseRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    pub fn new(courses: Arc<dyn CourseRepository>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { courses, progress }
    }

    async fn view(&self, user: &UserId, course: &CourseId) -> Result<Option<ProgressView>, Error> {
        let Some(record) = self
            .progress
            .find(course, user)
            .await
            .map_err(map_progress_error)?
        else {
            return Ok(None);
        };
        let outline = self.courses.outline(course).await.map_err(map_course_error)?;
        let total = outline.total_subsections();
        Ok(Some(ProgressView {
            course: *course,
            percentage: record.percentage(total),
            completed: record.completed.into_iter().collect(),
            total_subsections: total,
        }))
    }
}

#[async_trait]
impl ProgressCommand for ProgressService {
    async fn mark_complete(
        &self,
        user: &UserId,
        course: &CourseId,
        subsection: &SubsectionId,
    ) -> Result<ProgressView, Error> {
        let owner = self
            .courses
            .course_for_subsection(subsection)
            .await
            .map_err(map_course_error)?;
        if owner != Some(*course) {
            return Err(Error::not_found("Subsection not found in this course"));
        }
        match self
            .progress
            .record_completion(course, user, subsection)
            .await
            .map_err(map_progress_error)?
        {
            CompletionOutcome::Recorded => {}
            CompletionOutcome::AlreadyCompleted => {
                return Err(Error::conflict("Video already marked as completed"));
            }
            CompletionOutcome::MissingProgress => {
                return Err(Error::invalid_request(MISSING_PROGRESS));
            }
        }
        self.view(user, course)
            .await?
            .ok_or_else(|| Error::invalid_request(MISSING_PROGRESS))
    }
}

#[async_trait]
impl ProgressQuery for ProgressService {
    async fn progress(&self, user: &UserId, course: &CourseId) -> Result<ProgressView, Error> {
        self.view(user, course)
            .await?
            .ok_or_else(|| Error::not_found(MISSING_PROGRESS))
    }
}
