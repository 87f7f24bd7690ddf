//! PostgreSQL-backed `EnrollmentLedger`.
//!
//! The enrolled-set row, the empty progress record and the user's course
//! list entry are one `course_enrollments` insert plus one `course_progress`
//! insert inside a single transaction. The composite primary key on
//! `course_enrollments` decides races between concurrent purchases: the
//! loser's `ON CONFLICT DO NOTHING` affects zero rows and reports
//! [`EnrollOutcome::AlreadyEnrolled`].

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{EnrollOutcome, EnrollmentLedger, EnrollmentLedgerError};
use crate::domain::{CourseId, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::pool::DbPool;
use super::schema::{course_enrollments, course_progress, courses, users};

#[derive(Clone)]
pub struct DieselEnrollmentLedger {
    pool: DbPool,
}

impl DieselEnrollmentLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnrollmentLedger for DieselEnrollmentLedger {
    async fn enroll(
        &self,
        course: &CourseId,
        user: &UserId,
    ) -> Result<EnrollOutcome, EnrollmentLedgerError> {
        let course_id = *course.as_uuid();
        let user_id = *user.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome = conn
            .transaction(|conn| {
                async move {
                    let title: Option<String> = courses::table
                        .filter(courses::id.eq(course_id))
                        .select(courses::title)
                        .for_share()
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(course_title) = title else {
                        return Ok(EnrollOutcome::CourseNotFound);
                    };

                    let user_exists: bool =
                        diesel::select(exists(users::table.filter(users::id.eq(user_id))))
                            .get_result(conn)
                            .await?;
                    if !user_exists {
                        return Ok(EnrollOutcome::UserNotFound);
                    }

                    let inserted = diesel::insert_into(course_enrollments::table)
                        .values((
                            course_enrollments::course_id.eq(course_id),
                            course_enrollments::user_id.eq(user_id),
                        ))
                        .on_conflict((course_enrollments::course_id, course_enrollments::user_id))
                        .do_nothing()
                        .execute(conn)
                        .await?;
                    if inserted == 0 {
                        return Ok(EnrollOutcome::AlreadyEnrolled);
                    }

                    diesel::insert_into(course_progress::table)
                        .values((
                            course_progress::course_id.eq(course_id),
                            course_progress::user_id.eq(user_id),
                        ))
                        .on_conflict((course_progress::course_id, course_progress::user_id))
                        .do_nothing()
                        .execute(conn)
                        .await?;

                    Ok(EnrollOutcome::Enrolled { course_title })
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        debug!(%course, %user, ?outcome, "enrollment transaction finished");
        Ok(outcome)
    }
}
