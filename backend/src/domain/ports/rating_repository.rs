//! Port for ratings and reviews.
use async_trait::async_trait;

use crate::domain::{CourseId, Review, ReviewSummary};

use super::define_port_error;

define_port_error! {
    /// Errors raised by rating repository adapters.
    pub enum RatingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "rating repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "rating repository query failed: {message}",
        /// The user already rated this course.
        Duplicate => "course already reviewed by this user",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Store a review; one per (user, course).
    async fn create(&self, review: &Review) -> Result<(), RatingRepositoryError>;

    async fn list_for_course(&self, course: &CourseId) -> Result<Vec<Review>, RatingRepositoryError>;

    /// Every review with reviewer and course context, in storage order.
    async fn list_all(&self) -> Result<Vec<ReviewSummary>, RatingRepositoryError>;
}
