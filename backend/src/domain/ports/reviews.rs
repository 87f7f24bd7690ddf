//! Driving ports for course ratings.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{CourseId, Error, Review, ReviewSummary, UserId};

/// Ratings of one course with their average.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRatings {
    pub average: Decimal,
    pub reviews: Vec<Review>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewsCommand: Send + Sync {
    /// Rate a course the user is enrolled in; one rating per user.
    async fn rate_course(
        &self,
        user: &UserId,
        course: &CourseId,
        score: u8,
        text: &str,
    ) -> Result<Review, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewsQuery: Send + Sync {
    async fn course_ratings(&self, course: &CourseId) -> Result<CourseRatings, Error>;

    /// Every review, highest score first.
    async fn all_reviews(&self) -> Result<Vec<ReviewSummary>, Error>;
}
