//! User data model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{CourseId, UserId};

/// Maximum length accepted for e-mail addresses.
pub const EMAIL_MAX: usize = 254;
/// Maximum length accepted for first and last names.
pub const PERSON_NAME_MAX: usize = 64;

/// Validation errors returned by user constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// E-mail was blank.
    #[error("email must not be empty")]
    EmptyEmail,
    /// E-mail was not `local@domain.tld` shaped or too long.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// A name field was blank.
    #[error("{field} must not be empty")]
    EmptyName { field: &'static str },
    /// A name field exceeded [`PERSON_NAME_MAX`].
    #[error("{field} must be at most {max} characters")]
    NameTooLong { field: &'static str, max: usize },
    /// Role string did not match a known role.
    #[error("account type must be Student, Instructor, or Admin")]
    UnknownRole,
}

/// Normalised (trimmed, lower-cased) e-mail address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an e-mail address.
    ///
    /// # Examples
    /// ```
    /// use eduquest::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new("  Ada@Example.COM ").expect("valid");
    /// assert_eq!(email.as_ref(), "ada@example.com");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if trimmed.len() > EMAIL_MAX || trimmed.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        let domain_ok = domain
            .split_once('.')
            .is_some_and(|(head, tail)| !head.is_empty() && !tail.is_empty());
        if local.is_empty() || domain.contains('@') || !domain_ok || domain.ends_with('.') {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A trimmed, non-empty personal name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    /// Validate a name, naming the offending `field` in errors.
    pub fn new(raw: impl AsRef<str>, field: &'static str) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName { field });
        }
        if trimmed.chars().count() > PERSON_NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                field,
                max: PERSON_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account role controlling which endpoints a user may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum UserRole {
    /// Buys courses, tracks progress, writes reviews.
    Student,
    /// Authors and publishes courses.
    Instructor,
    /// Manages categories.
    Admin,
}

impl UserRole {
    /// Stable string form used in storage and sessions.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Instructor => "Instructor",
            Self::Admin => "Admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Student" => Ok(Self::Student),
            "Instructor" => Ok(Self::Instructor),
            "Admin" => Ok(Self::Admin),
            _ => Err(UserValidationError::UnknownRole),
        }
    }
}

/// Input bundle for [`User::new`].
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub id: UserId,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub role: UserRole,
    pub enrolled_courses: Vec<CourseId>,
}

/// Application user.
///
/// ## Invariants
/// - `enrolled_courses` holds each course at most once, in enrollment order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    first_name: PersonName,
    last_name: PersonName,
    email: EmailAddress,
    role: UserRole,
    enrolled_courses: Vec<CourseId>,
}

impl User {
    /// Build a user, de-duplicating the enrolled course list.
    pub fn new(draft: UserDraft) -> Self {
        let UserDraft {
            id,
            first_name,
            last_name,
            email,
            role,
            enrolled_courses,
        } = draft;
        let mut unique = Vec::with_capacity(enrolled_courses.len());
        for course in enrolled_courses {
            if !unique.contains(&course) {
                unique.push(course);
            }
        }
        Self {
            id,
            first_name,
            last_name,
            email,
            role,
            enrolled_courses: unique,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn first_name(&self) -> &PersonName {
        &self.first_name
    }

    pub fn last_name(&self) -> &PersonName {
        &self.last_name
    }

    /// First and last name joined by a space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn enrolled_courses(&self) -> &[CourseId] {
        &self.enrolled_courses
    }

    /// Whether the user holds an enrollment for `course`.
    pub fn is_enrolled_in(&self, course: &CourseId) -> bool {
        self.enrolled_courses.contains(course)
    }
}
