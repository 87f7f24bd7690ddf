//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions back into domain types report
//! invalid stored data as a plain message so each repository can wrap it in
//! its own query error.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Category, CategoryDraft, CategoryId, Course, CourseDraft, CourseId, EmailAddress, Money,
    PasswordHash, PersonName, RatingScore, Review, ReviewId, Section, SectionId, Subsection,
    SubsectionId, User, UserDraft, UserId, UserRole,
};

use super::schema::{categories, courses, ratings, sections, subsections, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
}

impl UserRow {
    /// Rebuild the domain user with its enrolled course ids.
    pub fn into_user(self, courses: Vec<CourseId>) -> Result<(User, PasswordHash), String> {
        let first_name = PersonName::new(&self.first_name, "firstName")
            .map_err(|err| format!("stored first name is invalid: {err}"))?;
        let last_name = PersonName::new(&self.last_name, "lastName")
            .map_err(|err| format!("stored last name is invalid: {err}"))?;
        let email = EmailAddress::new(&self.email)
            .map_err(|err| format!("stored email is invalid: {err}"))?;
        let role: UserRole = self
            .role
            .parse()
            .map_err(|_| format!("stored role is invalid: {}", self.role))?;
        let user = User::new(UserDraft {
            id: UserId::from_uuid(self.id),
            first_name,
            last_name,
            email,
            role,
            enrolled_courses: courses,
        });
        Ok((user, PasswordHash::from_phc(self.password_hash)))
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub password_hash: &'a str,
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

impl From<&Category> for CategoryRow {
    fn from(category: &Category) -> Self {
        Self {
            id: *category.id().as_uuid(),
            name: category.name().to_owned(),
            description: category.description().to_owned(),
        }
    }
}

impl TryFrom<CategoryRow> for Category {
    type Error = String;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        Category::new(CategoryDraft {
            id: CategoryId::from_uuid(row.id),
            name: row.name,
            description: row.description,
        })
        .map_err(|err| format!("stored category is invalid: {err}"))
    }
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseRow {
    pub id: Uuid,
    pub instructor_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub description: String,
    pub what_you_will_learn: String,
    pub price_minor: i64,
    pub tags: Vec<String>,
    pub instructions: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl CourseRow {
    pub fn into_course(self, students: BTreeSet<UserId>) -> Result<Course, String> {
        let status = self
            .status
            .parse()
            .map_err(|_| format!("stored course status is invalid: {}", self.status))?;
        Course::new(CourseDraft {
            id: CourseId::from_uuid(self.id),
            instructor: UserId::from_uuid(self.instructor_id),
            category: CategoryId::from_uuid(self.category_id),
            title: self.title,
            description: self.description,
            what_you_will_learn: self.what_you_will_learn,
            price: Money::from_minor(self.price_minor),
            tags: self.tags,
            instructions: self.instructions,
            status,
            students_enrolled: students,
            created_at: self.created_at,
        })
        .map_err(|err| format!("stored course is invalid: {err}"))
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = courses)]
pub(crate) struct NewCourseRow<'a> {
    pub id: Uuid,
    pub instructor_id: Uuid,
    pub category_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub what_you_will_learn: &'a str,
    pub price_minor: i64,
    pub tags: &'a [String],
    pub instructions: &'a [String],
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a Course> for NewCourseRow<'a> {
    fn from(course: &'a Course) -> Self {
        Self {
            id: *course.id().as_uuid(),
            instructor_id: *course.instructor().as_uuid(),
            category_id: *course.category().as_uuid(),
            title: course.title(),
            description: course.description(),
            what_you_will_learn: course.what_you_will_learn(),
            price_minor: course.price().minor_units(),
            tags: course.tags(),
            instructions: course.instructions(),
            status: course.status().as_str(),
            created_at: course.created_at(),
        }
    }
}

/// Editable course columns. Status, owner and creation time are absent.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = courses)]
pub(crate) struct CourseChangeset<'a> {
    pub category_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub what_you_will_learn: &'a str,
    pub price_minor: i64,
    pub tags: &'a [String],
    pub instructions: &'a [String],
}

impl<'a> From<&'a Course> for CourseChangeset<'a> {
    fn from(course: &'a Course) -> Self {
        Self {
            category_id: *course.category().as_uuid(),
            title: course.title(),
            description: course.description(),
            what_you_will_learn: course.what_you_will_learn(),
            price_minor: course.price().minor_units(),
            tags: course.tags(),
            instructions: course.instructions(),
        }
    }
}

// ---------------------------------------------------------------------------
// Outline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = sections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SectionRow {
    pub id: Uuid,
    pub course_id: Uuid,
    pub name: String,
}

impl From<&Section> for SectionRow {
    fn from(section: &Section) -> Self {
        Self {
            id: *section.id.as_uuid(),
            course_id: *section.course_id.as_uuid(),
            name: section.name.clone(),
        }
    }
}

impl From<SectionRow> for Section {
    fn from(row: SectionRow) -> Self {
        Self {
            id: SectionId::from_uuid(row.id),
            course_id: CourseId::from_uuid(row.course_id),
            name: row.name,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = subsections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SubsectionRow {
    pub id: Uuid,
    pub section_id: Uuid,
    pub title: String,
    pub description: String,
    pub duration_secs: i32,
    pub video_url: String,
}

impl TryFrom<&Subsection> for SubsectionRow {
    type Error = String;

    fn try_from(subsection: &Subsection) -> Result<Self, Self::Error> {
        Ok(Self {
            id: *subsection.id.as_uuid(),
            section_id: *subsection.section_id.as_uuid(),
            title: subsection.title.clone(),
            description: subsection.description.clone(),
            duration_secs: i32::try_from(subsection.duration_secs)
                .map_err(|_| "subsection duration is out of range".to_owned())?,
            video_url: subsection.video_url.clone(),
        })
    }
}

impl TryFrom<SubsectionRow> for Subsection {
    type Error = String;

    fn try_from(row: SubsectionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SubsectionId::from_uuid(row.id),
            section_id: SectionId::from_uuid(row.section_id),
            title: row.title,
            description: row.description,
            duration_secs: u32::try_from(row.duration_secs)
                .map_err(|_| "stored subsection duration is negative".to_owned())?,
            video_url: row.video_url,
        })
    }
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = ratings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RatingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub score: i16,
    pub review: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Review> for RatingRow {
    fn from(review: &Review) -> Self {
        Self {
            id: *review.id.as_uuid(),
            user_id: *review.user.as_uuid(),
            course_id: *review.course.as_uuid(),
            score: i16::from(review.score.value()),
            review: review.text.clone(),
            created_at: review.created_at,
        }
    }
}

impl TryFrom<RatingRow> for Review {
    type Error = String;

    fn try_from(row: RatingRow) -> Result<Self, Self::Error> {
        let score = u8::try_from(row.score)
            .ok()
            .and_then(|value| RatingScore::new(value).ok())
            .ok_or_else(|| format!("stored rating score is invalid: {}", row.score))?;
        Ok(Self {
            id: ReviewId::from_uuid(row.id),
            user: UserId::from_uuid(row.user_id),
            course: CourseId::from_uuid(row.course_id),
            score,
            text: row.review,
            created_at: row.created_at,
        })
    }
}
