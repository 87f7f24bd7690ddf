//! Driving port for catalogue reads.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{Category, CategoryId, Course, CourseId, CourseOutline, Error, Money, UserId};

/// A category with its published courses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPage {
    pub category: Category,
    pub courses: Vec<Course>,
}

/// Everything shown on a course page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDetails {
    pub course: Course,
    pub outline: CourseOutline,
    pub average_rating: Decimal,
    pub rating_count: usize,
}

/// One row of the instructor dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructorCourse {
    pub course: Course,
    pub income: Money,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueQuery: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, Error>;

    async fn category_page(&self, category: &CategoryId) -> Result<CategoryPage, Error>;

    /// Published courses, newest first.
    async fn list_courses(&self) -> Result<Vec<Course>, Error>;

    /// Course page. Drafts are visible only to their instructor.
    async fn course_details(
        &self,
        course: &CourseId,
        viewer: Option<UserId>,
    ) -> Result<CourseDetails, Error>;

    /// Courses authored by `instructor` with their income.
    async fn instructor_courses(&self, instructor: &UserId)
    -> Result<Vec<InstructorCourse>, Error>;
}
