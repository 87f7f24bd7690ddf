//! Course outline: sections and their subsections (lecture videos).

use super::CatalogueValidationError;
use super::validation::{TEXT_MAX, TITLE_MAX, http_url, required_text};
use crate::domain::ids::{CourseId, SectionId, SubsectionId};

/// A named group of subsections within a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: SectionId,
    pub course_id: CourseId,
    pub name: String,
}

impl Section {
    /// The same section under a new, validated name.
    pub fn renamed(&self, name: &str) -> Result<Self, CatalogueValidationError> {
        Ok(Self {
            name: required_text(name, "sectionName", TITLE_MAX)?,
            ..self.clone()
        })
    }
}

/// A single lecture video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subsection {
    pub id: SubsectionId,
    pub section_id: SectionId,
    pub title: String,
    pub description: String,
    pub duration_secs: u32,
    pub video_url: String,
}

impl Subsection {
    /// Apply edits; untouched fields keep their stored values.
    pub fn apply(&self, changes: SubsectionChanges) -> Result<Self, CatalogueValidationError> {
        Ok(Self {
            id: self.id,
            section_id: self.section_id,
            title: match changes.title {
                Some(title) => required_text(&title, "title", TITLE_MAX)?,
                None => self.title.clone(),
            },
            description: match changes.description {
                Some(description) => required_text(&description, "description", TEXT_MAX)?,
                None => self.description.clone(),
            },
            duration_secs: changes.duration_secs.unwrap_or(self.duration_secs),
            video_url: match changes.video_url {
                Some(url) => http_url(&url, "videoUrl")?,
                None => self.video_url.clone(),
            },
        })
    }
}

/// Edits to a subsection. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubsectionChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_secs: Option<u32>,
    pub video_url: Option<String>,
}

impl SubsectionChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A section with its subsections in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionOutline {
    pub section: Section,
    pub subsections: Vec<Subsection>,
}

/// Ordered sections of one course.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseOutline {
    pub sections: Vec<SectionOutline>,
}

impl CourseOutline {
    pub fn total_subsections(&self) -> usize {
        self.sections.iter().map(|s| s.subsections.len()).sum()
    }

    /// Sum of subsection durations in seconds.
    pub fn total_duration_secs(&self) -> u64 {
        self.sections
            .iter()
            .flat_map(|s| s.subsections.iter())
            .map(|sub| u64::from(sub.duration_secs))
            .sum()
    }

    pub fn contains_subsection(&self, id: &SubsectionId) -> bool {
        self.sections
            .iter()
            .flat_map(|s| s.subsections.iter())
            .any(|sub| sub.id == *id)
    }
}

/// Validated input for adding a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSection {
    section: Section,
}

impl NewSection {
    pub fn try_new(course_id: CourseId, name: &str) -> Result<Self, CatalogueValidationError> {
        Ok(Self {
            section: Section {
                id: SectionId::random(),
                course_id,
                name: required_text(name, "sectionName", TITLE_MAX)?,
            },
        })
    }

    pub fn course_id(&self) -> CourseId {
        self.section.course_id
    }

    pub fn into_section(self) -> Section {
        self.section
    }
}

/// Raw fields for [`NewSubsection::try_from_parts`].
#[derive(Debug, Clone, Copy)]
pub struct NewSubsectionParts<'a> {
    pub section_id: SectionId,
    pub title: &'a str,
    pub description: &'a str,
    pub duration_secs: u32,
    pub video_url: &'a str,
}

/// Validated input for adding a subsection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubsection {
    subsection: Subsection,
}

impl NewSubsection {
    pub fn try_from_parts(parts: NewSubsectionParts<'_>) -> Result<Self, CatalogueValidationError> {
        Ok(Self {
            subsection: Subsection {
                id: SubsectionId::random(),
                section_id: parts.section_id,
                title: required_text(parts.title, "title", TITLE_MAX)?,
                description: required_text(parts.description, "description", TEXT_MAX)?,
                duration_secs: parts.duration_secs,
                video_url: http_url(parts.video_url, "videoUrl")?,
            },
        })
    }

    pub fn section_id(&self) -> SectionId {
        self.subsection.section_id
    }

    pub fn into_subsection(self) -> Subsection {
        self.subsection
    }
}
