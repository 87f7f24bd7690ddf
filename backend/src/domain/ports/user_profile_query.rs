//! Driving port for user profile queries.
//!
//! Inbound adapters use this port to load the signed-in user's profile and
//! course progress without importing persistence details.

use async_trait::async_trait;

use crate::domain::{CourseId, Error, User, UserId};

/// One enrolled course on the profile page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrolledCourse {
    pub course: CourseId,
    pub title: String,
    pub percentage: u8,
}

/// Profile plus enrolled courses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user: User,
    pub courses: Vec<EnrolledCourse>,
}

/// Domain use-case port for reading the current user's profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Return the profile for the authenticated user.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<UserProfile, Error>;
}
