//! PostgreSQL-backed `ProgressRepository`.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{CompletionOutcome, ProgressRepository, ProgressRepositoryError};
use crate::domain::{CourseId, CourseProgress, SubsectionId, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::pool::DbPool;
use super::schema::{completed_subsections, course_progress};

#[derive(Clone)]
pub struct DieselProgressRepository {
    pool: DbPool,
}

impl DieselProgressRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgressRepository for DieselProgressRepository {
    async fn find(
        &self,
        course: &CourseId,
        user: &UserId,
    ) -> Result<Option<CourseProgress>, ProgressRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let present: bool = diesel::select(exists(
            course_progress::table
                .filter(course_progress::course_id.eq(course.as_uuid()))
                .filter(course_progress::user_id.eq(user.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if !present {
            return Ok(None);
        }

        let completed: Vec<Uuid> = completed_subsections::table
            .filter(completed_subsections::course_id.eq(course.as_uuid()))
            .filter(completed_subsections::user_id.eq(user.as_uuid()))
            .select(completed_subsections::subsection_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Some(CourseProgress {
            course: *course,
            user: *user,
            completed: completed.into_iter().map(SubsectionId::from_uuid).collect(),
        }))
    }

    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<CourseProgress>, ProgressRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let courses: Vec<Uuid> = course_progress::table
            .filter(course_progress::user_id.eq(user.as_uuid()))
            .order_by(course_progress::created_at.asc())
            .select(course_progress::course_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let pairs: Vec<(Uuid, Uuid)> = completed_subsections::table
            .filter(completed_subsections::user_id.eq(user.as_uuid()))
            .select((
                completed_subsections::course_id,
                completed_subsections::subsection_id,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut completed: HashMap<Uuid, BTreeSet<SubsectionId>> = HashMap::new();
        for (course_id, subsection_id) in pairs {
            completed
                .entry(course_id)
                .or_default()
                .insert(SubsectionId::from_uuid(subsection_id));
        }

        Ok(courses
            .into_iter()
            .map(|course_id| CourseProgress {
                course: CourseId::from_uuid(course_id),
                user: *user,
                completed: completed.remove(&course_id).unwrap_or_default(),
            })
            .collect())
    }

    async fn record_completion(
        &self,
        course: &CourseId,
        user: &UserId,
        subsection: &SubsectionId,
    ) -> Result<CompletionOutcome, ProgressRepositoryError> {
        let course_id = *course.as_uuid();
        let user_id = *user.as_uuid();
        let subsection_id = *subsection.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let present: bool = diesel::select(exists(
                    course_progress::table
                        .filter(course_progress::course_id.eq(course_id))
                        .filter(course_progress::user_id.eq(user_id)),
                ))
                .get_result(conn)
                .await?;
                if !present {
                    return Ok(CompletionOutcome::MissingProgress);
                }

                let inserted = diesel::insert_into(completed_subsections::table)
                    .values((
                        completed_subsections::course_id.eq(course_id),
                        completed_subsections::user_id.eq(user_id),
                        completed_subsections::subsection_id.eq(subsection_id),
                    ))
                    .on_conflict((
                        completed_subsections::course_id,
                        completed_subsections::user_id,
                        completed_subsections::subsection_id,
                    ))
                    .do_nothing()
                    .execute(conn)
                    .await?;
                Ok(if inserted == 0 {
                    CompletionOutcome::AlreadyCompleted
                } else {
                    CompletionOutcome::Recorded
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
