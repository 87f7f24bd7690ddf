//! Profile read model, the user plus their enrolled courses and progress,
//! and the account holder's own edits and closure.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::port_errors::{map_course_error, map_progress_error, map_user_error};
use super::ports::{
    AccountRemoval, CourseRepository, EnrolledCourse, ProfileChanges, ProfileRecord,
    ProgressRepository, UserAccountCommand, UserProfile, UserProfileQuery, UserRepository,
};
use super::{EmailAddress, Error, PersonName, User, UserId, UserValidationError};

fn invalid(err: UserValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepository>,
    courses: Arc<dyn CourseRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl ProfileService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        courses: Arc<dyn CourseRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            users,
            courses,
            progress,
        }
    }

    async fn find_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }
}

/// Merge `changes` over the stored profile, validating only supplied fields.
fn merged_profile(user: &User, changes: ProfileChanges) -> Result<ProfileRecord, Error> {
    Ok(ProfileRecord {
        first_name: match changes.first_name {
            Some(raw) => PersonName::new(raw, "firstName").map_err(invalid)?,
            None => user.first_name().clone(),
        },
        last_name: match changes.last_name {
            Some(raw) => PersonName::new(raw, "lastName").map_err(invalid)?,
            None => user.last_name().clone(),
        },
        email: match changes.email {
            Some(raw) => EmailAddress::new(raw).map_err(invalid)?,
            None => user.email().clone(),
        },
    })
}

#[async_trait]
impl UserAccountCommand for ProfileService {
    async fn update_profile(
        &self,
        user_id: &UserId,
        changes: ProfileChanges,
    ) -> Result<User, Error> {
        if changes == ProfileChanges::default() {
            return Err(Error::invalid_request("Provide at least one field to update"));
        }
        let user = self.find_user(user_id).await?;
        let profile = merged_profile(&user, changes)?;
        let updated = self
            .users
            .update_profile(user_id, &profile)
            .await
            .map_err(map_user_error)?;
        if !updated {
            return Err(Error::not_found("User not found"));
        }
        self.find_user(user_id).await
    }

    async fn delete_account(&self, user_id: &UserId) -> Result<(), Error> {
        match self.users.delete(user_id).await.map_err(map_user_error)? {
            AccountRemoval::Removed => {
                info!(user_id = %user_id, "account deleted");
                Ok(())
            }
            AccountRemoval::NotFound => Err(Error::not_found("User not found")),
            AccountRemoval::OwnsCourses => Err(Error::conflict(
                "Delete your courses before deleting the account",
            )),
        }
    }
}

#[async_trait]
impl UserProfileQuery for ProfileService {
    async fn fetch_profile(&self, user_id: &UserId) -> Result<UserProfile, Error> {
        let user = self.find_user(user_id).await?;
        let enrolled = self
            .courses
            .find_many(user.enrolled_courses())
            .await
            .map_err(map_course_error)?;
        let records: HashMap<_, _> = self
            .progress
            .list_for_user(user_id)
            .await
            .map_err(map_progress_error)?
            .into_iter()
            .map(|record| (record.course, record))
            .collect();

        let mut courses = Vec::with_capacity(enrolled.len());
        for course in enrolled {
            let percentage = match records.get(&course.id()) {
                Some(record) => {
                    let outline = self
                        .courses
                        .outline(&course.id())
                        .await
                        .map_err(map_course_error)?;
                    record.percentage(outline.total_subsections())
                }
                None => 0,
            };
            courses.push(EnrolledCourse {
                course: course.id(),
                title: course.title().to_owned(),
                percentage,
            });
        }
        Ok(UserProfile { user, courses })
    }
}
