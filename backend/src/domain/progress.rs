//! Per-user, per-course completion tracking.

use std::collections::BTreeSet;

use super::ids::{CourseId, SubsectionId, UserId};

/// Completed subsections of one course for one user.
///
/// ## Invariants
/// - Exactly one record exists per enrolled (course, user) pair; the ledger
///   creates it at enrollment time with an empty set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseProgress {
    pub course: CourseId,
    pub user: UserId,
    pub completed: BTreeSet<SubsectionId>,
}

impl CourseProgress {
    /// A fresh record with nothing completed.
    pub fn empty(course: CourseId, user: UserId) -> Self {
        Self {
            course,
            user,
            completed: BTreeSet::new(),
        }
    }

    /// Whole-number completion percentage against `total_subsections`.
    ///
    /// Returns 0 for a course without subsections and never exceeds 100.
    ///
    /// # Examples
    /// ```
    /// use eduquest::domain::{CourseId, CourseProgress, SubsectionId, UserId};
    ///
    /// let mut progress = CourseProgress::empty(CourseId::random(), UserId::random());
    /// progress.completed.insert(SubsectionId::random());
    /// assert_eq!(progress.percentage(3), 33);
    /// ```
    pub fn percentage(&self, total_subsections: usize) -> u8 {
        if total_subsections == 0 {
            return 0;
        }
        let done = self.completed.len().min(total_subsections);
        let percent = done.saturating_mul(100) / total_subsections;
        u8::try_from(percent).unwrap_or(100)
    }
}
