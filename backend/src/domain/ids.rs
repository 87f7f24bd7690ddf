//! UUID-backed identifiers for domain entities.
//!
//! Each entity gets its own newtype so a course id can never be passed where
//! a user id is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors raised when parsing identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdValidationError {
    /// Identifier string was empty.
    #[error("identifier must not be empty")]
    Empty,
    /// Identifier string was not a canonical UUID.
    #[error("identifier must be a valid UUID")]
    Invalid,
}

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Validate and construct an identifier from a UUID string.
            pub fn new(id: impl AsRef<str>) -> Result<Self, IdValidationError> {
                let raw = id.as_ref();
                if raw.is_empty() {
                    return Err(IdValidationError::Empty);
                }
                if raw.trim() != raw {
                    return Err(IdValidationError::Invalid);
                }
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| IdValidationError::Invalid)
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

define_entity_id!(
    /// Stable user identifier.
    UserId
);
define_entity_id!(
    /// Stable course identifier.
    CourseId
);
define_entity_id!(
    /// Stable category identifier.
    CategoryId
);
define_entity_id!(
    /// Stable course section identifier.
    SectionId
);
define_entity_id!(
    /// Stable subsection (lecture video) identifier.
    SubsectionId
);
define_entity_id!(
    /// Stable rating-and-review identifier.
    ReviewId
);
