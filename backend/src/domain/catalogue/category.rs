//! Course category entity.

use super::CatalogueValidationError;
use super::validation::{TEXT_MAX, TITLE_MAX, required_text};
use crate::domain::ids::CategoryId;

/// Input payload for [`Category::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
}

/// Category grouping courses for browsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    id: CategoryId,
    name: String,
    description: String,
}

impl Category {
    /// Validate and construct a category.
    pub fn new(draft: CategoryDraft) -> Result<Self, CatalogueValidationError> {
        Ok(Self {
            id: draft.id,
            name: required_text(&draft.name, "name", TITLE_MAX)?,
            description: required_text(&draft.description, "description", TEXT_MAX)?,
        })
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
    pub fn description(&self) -> &str {
        self.description.as_str()
    }
}
