//! Course catalogue domain types.
//!
//! Categories, courses and their section/subsection outline. Entities are
//! built from `*Draft` payloads so persistence adapters and services share
//! one validation path.

use std::fmt;

use super::money::MoneyValidationError;

mod category;
mod course;
mod outline;
mod validation;


pub use category::{Category, CategoryDraft};
pub use course::{
    Course, CourseChanges, CourseDraft, CourseFilter, CourseStatus, NewCourse, NewCourseParts,
};
pub use outline::{
    CourseOutline, NewSection, NewSubsection, NewSubsectionParts, Section, SectionOutline,
    Subsection, SubsectionChanges,
};

/// Validation errors returned by catalogue constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueValidationError {
    EmptyField { field: &'static str },
    TooLong { field: &'static str, max: usize },
    NonPositivePrice,
    Price(MoneyValidationError),
    InvalidUrl { field: &'static str },
    UnknownStatus,
}

impl fmt::Display for CatalogueValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyField { field } => write!(f, "{field} must not be empty"),
            Self::TooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            Self::NonPositivePrice => write!(f, "price must be greater than zero"),
            Self::Price(error) => error.fmt(f),
            Self::InvalidUrl { field } => write!(f, "{field} must be an http(s) URL"),
            Self::UnknownStatus => write!(f, "status must be Draft or Published"),
        }
    }
}

impl std::error::Error for CatalogueValidationError {}

impl From<MoneyValidationError> for CatalogueValidationError {
    fn from(value: MoneyValidationError) -> Self {
        Self::Price(value)
    }
}
