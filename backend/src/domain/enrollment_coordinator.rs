//! Grants course access once a payment is trusted.
//!
//! Courses are processed one at a time. A failure on one course is recorded
//! in the report and the loop carries on with the rest. Each course's three
//! ledger writes are a single atomic [`EnrollmentLedger::enroll`] call.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::port_errors::ledger_failure_reason;
use super::ports::{EnrollOutcome, EnrollmentLedger, NotificationQueue};
use super::{CourseId, CourseSelection, EnrollmentReport, EnrollmentStatus, NotificationJob, UserId};

/// Runs per-course enrollment and queues confirmation e-mails.
#[derive(Clone)]
pub struct EnrollmentCoordinator {
    ledger: Arc<dyn EnrollmentLedger>,
    notifications: Arc<dyn NotificationQueue>,
}

impl EnrollmentCoordinator {
    pub fn new(
        ledger: Arc<dyn EnrollmentLedger>,
        notifications: Arc<dyn NotificationQueue>,
    ) -> Self {
        Self {
            ledger,
            notifications,
        }
    }

    /// Enroll `user` in every course of `courses`, in order.
    ///
    /// Never fails as a whole; inspect [`EnrollmentReport::is_complete`].
    pub async fn enroll_all(&self, user: &UserId, courses: &CourseSelection) -> EnrollmentReport {
        let mut report = EnrollmentReport::default();
        for course in courses.as_slice() {
            let (status, reason) = self.enroll_one(user, course).await;
            report.push(*course, status, reason);
        }
        report
    }

    async fn enroll_one(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> (EnrollmentStatus, Option<String>) {
        match self.ledger.enroll(course, user).await {
            Ok(EnrollOutcome::Enrolled { course_title }) => {
                info!(course_id = %course, user_id = %user, "user enrolled");
                self.notify(NotificationJob::EnrollmentConfirmation {
                    user: *user,
                    course: *course,
                    course_title,
                })
                .await;
                (EnrollmentStatus::Enrolled, None)
            }
            Ok(EnrollOutcome::AlreadyEnrolled) => {
                info!(course_id = %course, user_id = %user, "user already enrolled");
                (EnrollmentStatus::AlreadyEnrolled, None)
            }
            Ok(EnrollOutcome::CourseNotFound) => {
                warn!(course_id = %course, user_id = %user, "course vanished before enrollment");
                (
                    EnrollmentStatus::CourseNotFound,
                    Some("Course not found".to_owned()),
                )
            }
            Ok(EnrollOutcome::UserNotFound) => {
                warn!(course_id = %course, user_id = %user, "user vanished before enrollment");
                (EnrollmentStatus::Failed, Some("User not found".to_owned()))
            }
            Err(err) => {
                error!(course_id = %course, user_id = %user, error = %err, "enrollment write failed");
                (
                    EnrollmentStatus::Failed,
                    Some(ledger_failure_reason(&err).to_owned()),
                )
            }
        }
    }

    /// Best-effort hand-off; queue failures are logged only.
    async fn notify(&self, job: NotificationJob) {
        let user = job.user();
        let kind = job.kind();
        if let Err(err) = self.notifications.enqueue(job).await {
            warn!(user_id = %user, job = kind, error = %err, "notification not queued");
        }
    }
}

#[cfg(test)]
#[path = "enrollment_coordinator_tests.rs"]
mod tests;
