//! Course ratings and reviews.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::port_errors::{map_course_error, map_rating_error};
use super::ports::{CourseRatings, CourseRepository, RatingRepository, ReviewsCommand, ReviewsQuery};
use super::{Course, CourseId, Error, Review, ReviewSummary, UserId, average_rating, sort_by_score_desc};

/// Ratings use-cases. Only enrolled students may rate, once per course.
#[derive(Clone)]
pub struct ReviewService {
    courses: Arc<dyn CourseRepository>,
    ratings: Arc<dyn RatingRepository>,
    clock: Arc<dyn Clock>,
}

impl ReviewService {
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        ratings: Arc<dyn RatingRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
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
}

#[async_trait]
impl ReviewsCommand for ReviewService {
    async fn rate_course(
        &self,
        user: &UserId,
        course: &CourseId,
        score: u8,
        text: &str,
    ) -> Result<Review, Error> {
        let review = Review::try_new(*user, *course, score, text, self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let found = self.find_course(course).await?;
        if !found.has_student(user) {
            return Err(Error::forbidden("Student is not enrolled in the course"));
        }
        self.ratings.create(&review).await.map_err(map_rating_error)?;
        info!(course_id = %course, user_id = %user, score = score, "course rated");
        Ok(review)
    }
}

#[async_trait]
impl ReviewsQuery for ReviewService {
    async fn course_ratings(&self, course: &CourseId) -> Result<CourseRatings, Error> {
        self.find_course(course).await?;
        let reviews = self
            .ratings
            .list_for_course(course)
            .await
            .map_err(map_rating_error)?;
        let scores: Vec<_> = reviews.iter().map(|r| r.score).collect();
        Ok(CourseRatings {
            average: average_rating(&scores),
            reviews,
        })
    }

    async fn all_reviews(&self) -> Result<Vec<ReviewSummary>, Error> {
        let mut reviews = self.ratings.list_all().await.map_err(map_rating_error)?;
        sort_by_score_desc(&mut reviews);
        Ok(reviews)
    }
}
