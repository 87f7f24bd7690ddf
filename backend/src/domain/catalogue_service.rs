//! Catalogue authoring and browsing.
//!
//! Role checks belong to the inbound adapter. This service enforces that an
//! instructor only edits courses they own and hides drafts from everyone but
//! their author.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::port_errors::{map_category_error, map_course_error, map_rating_error};
use super::ports::{
    AddSubsectionRequest, CatalogueCommand, CatalogueQuery, CategoryPage, CategoryRepository,
    CourseDetails, CourseRemoval, CourseRepository, InstructorCourse, RatingRepository,
};
use super::{
    CatalogueValidationError, Category, CategoryDraft, CategoryId, Course, CourseChanges,
    CourseFilter, CourseId, CourseStatus, Error, NewCourse, NewCourseParts, NewSection,
    NewSubsection, NewSubsectionParts, Section, SectionId, Subsection, SubsectionChanges,
    SubsectionId, UserId, average_rating,
};

fn invalid(err: CatalogueValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

/// Catalogue use-cases over the course, category and rating stores.
#[derive(Clone)]
pub struct CatalogueService {
    categories: Arc<dyn CategoryRepository>,
    courses: Arc<dyn CourseRepository>,
    ratings: Arc<dyn RatingRepository>,
    clock: Arc<dyn Clock>,
}

impl CatalogueService {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        courses: Arc<dyn CourseRepository>,
        ratings: Arc<dyn RatingRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            categories,
            courses,
            ratings,
            clock,
        }
    }

    async fn find_course(&self, id: &CourseId) -> Result<Course, Error> {
        self.courses
            .find_by_id(id)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| Error::not_found("Course not found"))
    }

    async fn owned_course(&self, instructor: &UserId, id: &CourseId) -> Result<Course, Error> {
        let course = self.find_course(id).await?;
        if !course.is_owned_by(instructor) {
            return Err(Error::forbidden("You are not the instructor of this course"));
        }
        Ok(course)
    }

    async fn owned_section(&self, instructor: &UserId, id: &SectionId) -> Result<Section, Error> {
        let section = self
            .courses
            .find_section(id)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| Error::not_found("Section not found"))?;
        self.owned_course(instructor, &section.course_id).await?;
        Ok(section)
    }

    async fn owned_subsection(
        &self,
        instructor: &UserId,
        id: &SubsectionId,
    ) -> Result<Subsection, Error> {
        let subsection = self
            .courses
            .find_subsection(id)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| Error::not_found("Subsection not found"))?;
        self.owned_section(instructor, &subsection.section_id).await?;
        Ok(subsection)
    }

    async fn find_category(&self, id: &CategoryId) -> Result<Category, Error> {
        self.categories
            .find_by_id(id)
            .await
            .map_err(map_category_error)?
            .ok_or_else(|| Error::not_found("Category not found"))
    }
}

#[async_trait]
impl CatalogueCommand for CatalogueService {
    async fn create_category(&self, name: &str, description: &str) -> Result<Category, Error> {
        let category = Category::new(CategoryDraft {
            id: CategoryId::random(),
            name: name.to_owned(),
            description: description.to_owned(),
        })
        .map_err(invalid)?;
        self.categories
            .create(&category)
            .await
            .map_err(map_category_error)?;
        info!(category_id = %category.id(), "category created");
        Ok(category)
    }

    async fn create_course(&self, parts: NewCourseParts) -> Result<Course, Error> {
        let new_course = NewCourse::try_from_parts(parts, self.clock.utc()).map_err(invalid)?;
        self.find_category(&new_course.category()).await?;
        let course = new_course.into_course();
        self.courses.create(&course).await.map_err(map_course_error)?;
        info!(course_id = %course.id(), instructor_id = %course.instructor(), "course created");
        Ok(course)
    }

    async fn set_course_status(
        &self,
        instructor: &UserId,
        course: &CourseId,
        status: CourseStatus,
    ) -> Result<Course, Error> {
        let mut owned = self.owned_course(instructor, course).await?;
        let updated = self
            .courses
            .set_status(course, status)
            .await
            .map_err(map_course_error)?;
        if !updated {
            return Err(Error::not_found("Course not found"));
        }
        owned.set_status(status);
        info!(course_id = %course, %status, "course status changed");
        Ok(owned)
    }

    async fn edit_course(
        &self,
        instructor: &UserId,
        course: &CourseId,
        changes: CourseChanges,
    ) -> Result<Course, Error> {
        if changes.is_empty() {
            return Err(Error::invalid_request("Provide at least one field to update"));
        }
        let owned = self.owned_course(instructor, course).await?;
        if let Some(category) = changes.category {
            self.find_category(&category).await?;
        }
        let edited = owned.apply(changes).map_err(invalid)?;
        let updated = self
            .courses
            .update(&edited)
            .await
            .map_err(map_course_error)?;
        if !updated {
            return Err(Error::not_found("Course not found"));
        }
        info!(course_id = %course, "course edited");
        Ok(edited)
    }

    async fn delete_course(&self, instructor: &UserId, course: &CourseId) -> Result<(), Error> {
        self.owned_course(instructor, course).await?;
        match self.courses.delete(course).await.map_err(map_course_error)? {
            CourseRemoval::Removed => {
                info!(course_id = %course, "course deleted");
                Ok(())
            }
            CourseRemoval::NotFound => Err(Error::not_found("Course not found")),
            CourseRemoval::HasStudents => Err(Error::conflict(
                "Course has enrolled students and cannot be deleted",
            )),
        }
    }

    async fn add_section(
        &self,
        instructor: &UserId,
        course: &CourseId,
        name: &str,
    ) -> Result<Section, Error> {
        self.owned_course(instructor, course).await?;
        let section = NewSection::try_new(*course, name)
            .map_err(invalid)?
            .into_section();
        self.courses
            .add_section(&section)
            .await
            .map_err(map_course_error)?;
        Ok(section)
    }

    async fn add_subsection(
        &self,
        instructor: &UserId,
        request: AddSubsectionRequest,
    ) -> Result<Subsection, Error> {
        let section = self.owned_section(instructor, &request.section).await?;
        let subsection = NewSubsection::try_from_parts(NewSubsectionParts {
            section_id: section.id,
            title: &request.title,
            description: &request.description,
            duration_secs: request.duration_secs,
            video_url: &request.video_url,
        })
        .map_err(invalid)?
        .into_subsection();
        self.courses
            .add_subsection(&subsection)
            .await
            .map_err(map_course_error)?;
        Ok(subsection)
    }

    async fn rename_section(
        &self,
        instructor: &UserId,
        section: &SectionId,
        name: &str,
    ) -> Result<Section, Error> {
        let renamed = self
            .owned_section(instructor, section)
            .await?
            .renamed(name)
            .map_err(invalid)?;
        let updated = self
            .courses
            .update_section(&renamed)
            .await
            .map_err(map_course_error)?;
        if !updated {
            return Err(Error::not_found("Section not found"));
        }
        Ok(renamed)
    }

    async fn delete_section(&self, instructor: &UserId, section: &SectionId) -> Result<(), Error> {
        self.owned_section(instructor, section).await?;
        let deleted = self
            .courses
            .delete_section(section)
            .await
            .map_err(map_course_error)?;
        if !deleted {
            return Err(Error::not_found("Section not found"));
        }
        info!(section_id = %section, "section deleted");
        Ok(())
    }

    async fn edit_subsection(
        &self,
        instructor: &UserId,
        subsection: &SubsectionId,
        changes: SubsectionChanges,
    ) -> Result<Subsection, Error> {
        if changes.is_empty() {
            return Err(Error::invalid_request("Provide at least one field to update"));
        }
        let edited = self
            .owned_subsection(instructor, subsection)
            .await?
            .apply(changes)
            .map_err(invalid)?;
        let updated = self
            .courses
            .update_subsection(&edited)
            .await
            .map_err(map_course_error)?;
        if !updated {
            return Err(Error::not_found("Subsection not found"));
        }
        Ok(edited)
    }

    async fn delete_subsection(
        &self,
        instructor: &UserId,
        subsection: &SubsectionId,
    ) -> Result<(), Error> {
        self.owned_subsection(instructor, subsection).await?;
        let deleted = self
            .courses
            .delete_subsection(subsection)
            .await
            .map_err(map_course_error)?;
        if !deleted {
            return Err(Error::not_found("Subsection not found"));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogueQuery for CatalogueService {
    async fn list_categories(&self) -> Result<Vec<Category>, Error> {
        self.categories.list().await.map_err(map_category_error)
    }

    async fn category_page(&self, category: &CategoryId) -> Result<CategoryPage, Error> {
        let category = self.find_category(category).await?;
        let filter = CourseFilter {
            category: Some(category.id()),
            ..CourseFilter::published()
        };
        let courses = self.courses.list(&filter).await.map_err(map_course_error)?;
        Ok(CategoryPage { category, courses })
    }

    async fn list_courses(&self) -> Result<Vec<Course>, Error> {
        self.courses
            .list(&CourseFilter::published())
            .await
            .map_err(map_course_error)
    }

    async fn course_details(
        &self,
        course: &CourseId,
        viewer: Option<UserId>,
    ) -> Result<CourseDetails, Error> {
        let found = self.find_course(course).await?;
        let visible = found.is_published() || viewer.is_some_and(|v| found.is_owned_by(&v));
        if !visible {
            return Err(Error::not_found("Course not found"));
        }
        let outline = self.courses.outline(course).await.map_err(map_course_error)?;
        let reviews = self
            .ratings
            .list_for_course(course)
            .await
            .map_err(map_rating_error)?;
        let scores: Vec<_> = reviews.iter().map(|r| r.score).collect();
        Ok(CourseDetails {
            course: found,
            outline,
            average_rating: average_rating(&scores),
            rating_count: reviews.len(),
        })
    }

    async fn instructor_courses(
        &self,
        instructor: &UserId,
    ) -> Result<Vec<InstructorCourse>, Error> {
        let filter = CourseFilter {
            instructor: Some(*instructor),
            ..CourseFilter::default()
        };
        let courses = self.courses.list(&filter).await.map_err(map_course_error)?;
        courses
            .into_iter()
            .map(|course| {
                let income = course
                    .income()
                    .ok_or_else(|| Error::internal("course income overflow"))?;
                Ok(InstructorCourse { course, income })
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "catalogue_service_tests.rs"]
mod tests;
