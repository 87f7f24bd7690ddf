//! Course entity, authoring input and list filters.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::CatalogueValidationError;
use super::validation::{TAG_MAX, TEXT_MAX, TITLE_MAX, required_text, text_list};
use crate::domain::ids::{CategoryId, CourseId, UserId};
use crate::domain::money::Money;

/// Publication state of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CourseStatus {
    Draft,
    Published,
}

impl CourseStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Published => "Published",
        }
    }
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseStatus {
    type Err = CatalogueValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(Self::Draft),
            "Published" => Ok(Self::Published),
            _ => Err(CatalogueValidationError::UnknownStatus),
        }
    }
}

/// Input payload for [`Course::new`], typically a stored row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraft {
    pub id: CourseId,
    pub instructor: UserId,
    pub category: CategoryId,
    pub title: String,
    pub description: String,
    pub what_you_will_learn: String,
    pub price: Money,
    pub tags: Vec<String>,
    pub instructions: Vec<String>,
    pub status: CourseStatus,
    pub students_enrolled: BTreeSet<UserId>,
    pub created_at: DateTime<Utc>,
}

/// A course offered on the marketplace.
///
/// ## Invariants
/// - `students_enrolled` has set semantics; a user appears at most once.
/// - `price` is not re-validated on load. Checkout rejects non-positive
///   prices itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    instructor: UserId,
    category: CategoryId,
    title: String,
    description: String,
    what_you_will_learn: String,
    price: Money,
    tags: Vec<String>,
    instructions: Vec<String>,
    status: CourseStatus,
    students_enrolled: BTreeSet<UserId>,
    created_at: DateTime<Utc>,
}

impl Course {
    /// Validate and construct a course.
    pub fn new(draft: CourseDraft) -> Result<Self, CatalogueValidationError> {
        Self::try_from(draft)
    }

    pub fn id(&self) -> CourseId {
        self.id
    }

    /// Instructor who authored the course and may edit it.
    pub fn instructor(&self) -> UserId {
        self.instructor
    }

    pub fn category(&self) -> CategoryId {
        self.category
    }

    /// Trimmed course title, at most 120 characters.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn what_you_will_learn(&self) -> &str {
        self.what_you_will_learn.as_str()
    }

    /// Current price. Checkout always reads this value, never a cached one.
    pub fn price(&self) -> Money {
        self.price
    }

    /// Distinct, trimmed tags in authoring order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    pub fn status(&self) -> CourseStatus {
        self.status
    }

    /// Students holding an enrollment.
    pub fn students_enrolled(&self) -> &BTreeSet<UserId> {
        &self.students_enrolled
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether students can see and buy the course.
    pub fn is_published(&self) -> bool {
        self.status == CourseStatus::Published
    }

    /// Whether `user` authored the course.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.instructor == *user
    }

    /// Whether `user` already holds an enrollment.
    pub fn has_student(&self, user: &UserId) -> bool {
        self.students_enrolled.contains(user)
    }

    pub fn enrolled_count(&self) -> usize {
        self.students_enrolled.len()
    }

    /// Gross income: price times enrolled students. `None` on overflow.
    pub fn income(&self) -> Option<Money> {
        u64::try_from(self.students_enrolled.len())
            .ok()
            .and_then(|count| self.price.checked_mul(count))
    }

    pub(crate) fn set_status(&mut self, status: CourseStatus) {
        self.status = status;
    }

    /// Add `user` to the enrolled set; `false` when already present.
    pub(crate) fn add_student(&mut self, user: UserId) -> bool {
        self.students_enrolled.insert(user)
    }

    /// Apply an instructor's edits, re-validating every touched field.
    ///
    /// Identity, owner, status, students and creation time never change.
    pub fn apply(&self, changes: CourseChanges) -> Result<Self, CatalogueValidationError> {
        let price = match changes.price {
            Some(major) => positive_price(major)?,
            None => self.price,
        };
        Self::new(CourseDraft {
            id: self.id,
            instructor: self.instructor,
            category: changes.category.unwrap_or(self.category),
            title: changes.title.unwrap_or_else(|| self.title.clone()),
            description: changes
                .description
                .unwrap_or_else(|| self.description.clone()),
            what_you_will_learn: changes
                .what_you_will_learn
                .unwrap_or_else(|| self.what_you_will_learn.clone()),
            price,
            tags: changes.tags.unwrap_or_else(|| self.tags.clone()),
            instructions: changes
                .instructions
                .unwrap_or_else(|| self.instructions.clone()),
            status: self.status,
            students_enrolled: self.students_enrolled.clone(),
            created_at: self.created_at,
        })
    }
}

/// Instructor edits to an existing course. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseChanges {
    pub category: Option<CategoryId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub what_you_will_learn: Option<String>,
    /// New price in major units.
    pub price: Option<Decimal>,
    pub tags: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
}

impl CourseChanges {
    /// True when the request would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn positive_price(major: Decimal) -> Result<Money, CatalogueValidationError> {
    let price = Money::from_major(major)?;
    if !price.is_positive() {
        return Err(CatalogueValidationError::NonPositivePrice);
    }
    Ok(price)
}

impl TryFrom<CourseDraft> for Course {
    type Error = CatalogueValidationError;

    fn try_from(draft: CourseDraft) -> Result<Self, Self::Error> {
        Ok(Self {
            id: draft.id,
            instructor: draft.instructor,
            category: draft.category,
            title: required_text(&draft.title, "courseName", TITLE_MAX)?,
            description: required_text(&draft.description, "courseDescription", TEXT_MAX)?,
            what_you_will_learn: required_text(
                &draft.what_you_will_learn,
                "whatYouWillLearn",
                TEXT_MAX,
            )?,
            price: draft.price,
            tags: text_list(draft.tags, "tag", TAG_MAX)?,
            instructions: text_list(draft.instructions, "instructions", TEXT_MAX)?,
            status: draft.status,
            students_enrolled: draft.students_enrolled,
            created_at: draft.created_at,
        })
    }
}

/// Raw authoring fields for [`NewCourse::try_from_parts`].
#[derive(Debug, Clone)]
pub struct NewCourseParts {
    pub instructor: UserId,
    pub category: CategoryId,
    pub title: String,
    pub description: String,
    pub what_you_will_learn: String,
    pub price: Decimal,
    pub tags: Vec<String>,
    pub instructions: Vec<String>,
}

/// Validated input for creating a draft course.
///
/// ## Invariants
/// - `price` is strictly positive with at most two decimal places.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    course: Course,
}

impl NewCourse {
    /// Validate authoring input; the course starts as a draft with no students.
    pub fn try_from_parts(
        parts: NewCourseParts,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CatalogueValidationError> {
        let price = positive_price(parts.price)?;
        let course = Course::new(CourseDraft {
            id: CourseId::random(),
            instructor: parts.instructor,
            category: parts.category,
            title: parts.title,
            description: parts.description,
            what_you_will_learn: parts.what_you_will_learn,
            price,
            tags: parts.tags,
            instructions: parts.instructions,
            status: CourseStatus::Draft,
            students_enrolled: BTreeSet::new(),
            created_at,
        })?;
        Ok(Self { course })
    }

    /// Category the draft will be filed under; it must exist.
    pub fn category(&self) -> CategoryId {
        self.course.category
    }

    /// The course as it will be stored.
    pub fn into_course(self) -> Course {
        self.course
    }
}

/// Criteria for listing courses. `None` fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub status: Option<CourseStatus>,
    pub category: Option<CategoryId>,
    pub instructor: Option<UserId>,
}

impl CourseFilter {
    /// Published courses only.
    pub fn published() -> Self {
        Self {
            status: Some(CourseStatus::Published),
            ..Self::default()
        }
    }

    /// Whether `course` passes every set criterion.
    pub fn matches(&self, course: &Course) -> bool {
        self.status.is_none_or(|status| course.status == status)
            && self.category.is_none_or(|category| course.category == category)
            && self
                .instructor
                .is_none_or(|instructor| course.instructor == instructor)
    }
}
