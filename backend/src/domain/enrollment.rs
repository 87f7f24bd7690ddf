//! Per-course enrollment results.

use serde::Serialize;
use utoipa::ToSchema;

use super::ids::CourseId;

/// Terminal state of one course's enrollment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Enrolled set, progress record and user course list were written.
    Enrolled,
    /// The user already held this enrollment; nothing was written.
    AlreadyEnrolled,
    /// The course no longer exists.
    CourseNotFound,
    /// Storage failed for this course.
    Failed,
}

impl EnrollmentStatus {
    /// Whether the user has access to the course after this attempt.
    pub const fn is_satisfied(self) -> bool {
        matches!(self, Self::Enrolled | Self::AlreadyEnrolled)
    }
}

/// Result for one requested course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseEnrollment {
    #[schema(value_type = String, format = Uuid)]
    pub course_id: CourseId,
    pub status: EnrollmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Ordered per-course results for one verified payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct EnrollmentReport {
    pub courses: Vec<CourseEnrollment>,
}

impl EnrollmentReport {
    /// Record the outcome for `course_id`, keeping request order.
    pub fn push(&mut self, course_id: CourseId, status: EnrollmentStatus, reason: Option<String>) {
        self.courses.push(CourseEnrollment {
            course_id,
            status,
            reason,
        });
    }

    /// True when every requested course ended enrolled or already enrolled.
    pub fn is_complete(&self) -> bool {
        self.courses.iter().all(|c| c.status.is_satisfied())
    }

    /// Number of courses newly enrolled by this run.
    pub fn newly_enrolled(&self) -> usize {
        self.courses
            .iter()
            .filter(|c| c.status == EnrollmentStatus::Enrolled)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn already_enrolled_counts_as_complete() {
        let mut report = EnrollmentReport::default();
        report.push(CourseId::random(), EnrollmentStatus::Enrolled, None);
        report.push(CourseId::random(), EnrollmentStatus::AlreadyEnrolled, None);
        assert!(report.is_complete());
        assert_eq!(report.newly_enrolled(), 1);
    }

    #[rstest]
    #[case(EnrollmentStatus::CourseNotFound)]
    #[case(EnrollmentStatus::Failed)]
    fn unsatisfied_courses_make_report_incomplete(#[case] status: EnrollmentStatus) {
        let mut report = EnrollmentReport::default();
        report.push(CourseId::random(), EnrollmentStatus::Enrolled, None);
        report.push(CourseId::random(), status, Some("boom".to_owned()));
        assert!(!report.is_complete());
    }

    #[rstest]
    fn serialises_snake_case_statuses() {
        let course_id = CourseId::random();
        let mut report = EnrollmentReport::default();
        report.push(course_id, EnrollmentStatus::CourseNotFound, None);
        let value = serde_json::to_value(&report).expect("serialise");
        assert_eq!(
            value,
            json!({ "courses": [{ "courseId": course_id.to_string(), "status": "course_not_found" }] })
        );
    }
}
