//! Course ratings and reviews.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use super::ids::{CourseId, ReviewId, UserId};

/// Highest accepted review score.
pub const SCORE_MAX: u8 = 5;
const REVIEW_TEXT_MAX: usize = 2_000;

/// Validation errors for review input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewValidationError {
    #[error("rating must be between 1 and 5")]
    ScoreOutOfRange,
    #[error("review must not be empty")]
    EmptyReview,
    #[error("review must be at most 2000 characters")]
    ReviewTooLong,
}

/// A star rating between 1 and [`SCORE_MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RatingScore(u8);

impl RatingScore {
    pub fn new(value: u8) -> Result<Self, ReviewValidationError> {
        if (1..=SCORE_MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ReviewValidationError::ScoreOutOfRange)
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

/// A stored rating with its review text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: ReviewId,
    pub user: UserId,
    pub course: CourseId,
    pub score: RatingScore,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Validate a new review from raw input.
    pub fn try_new(
        user: UserId,
        course: CourseId,
        score: u8,
        text: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ReviewValidationError> {
        let score = RatingScore::new(score)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ReviewValidationError::EmptyReview);
        }
        if trimmed.chars().count() > REVIEW_TEXT_MAX {
            return Err(ReviewValidationError::ReviewTooLong);
        }
        Ok(Self {
            id: ReviewId::random(),
            user,
            course,
            score,
            text: trimmed.to_owned(),
            created_at,
        })
    }
}

/// A review joined with display context for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSummary {
    pub review: Review,
    pub reviewer_name: String,
    pub course_title: String,
}

/// Mean score rounded half-up to two decimals; zero for no ratings.
///
/// # Examples
/// ```
/// use eduquest::domain::{RatingScore, average_rating};
///
/// let scores = [5, 4, 4].map(|s| RatingScore::new(s).expect("in range"));
/// assert_eq!(average_rating(&scores).to_string(), "4.33");
/// ```
pub fn average_rating(scores: &[RatingScore]) -> Decimal {
    if scores.is_empty() {
        return Decimal::ZERO;
    }
    let total: u64 = scores.iter().map(|s| u64::from(s.value())).sum();
    let count = Decimal::from(scores.len() as u64);
    (Decimal::from(total) / count).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Order summaries by score, highest first. Ties keep newest first.
pub fn sort_by_score_desc(reviews: &mut [ReviewSummary]) {
    reviews.sort_by(|a, b| {
        b.review
            .score
            .cmp(&a.review.score)
            .then_with(|| b.review.created_at.cmp(&a.review.created_at))
    });
}
