//! PostgreSQL-backed `UserRepository`.
//!
//! Account deletion relies on `ON DELETE CASCADE` for enrollments, progress
//! and ratings. `courses.instructor_id` has no cascade, so an author's row
//! cannot be removed while their courses exist.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{
    AccountRemoval, NewUserRecord, ProfileRecord, UserCredentials, UserPersistenceError,
    UserRepository,
};
use crate::domain::{CourseId, EmailAddress, User, UserDraft, UserId};

use super::diesel_error_mapping::{
    invalid_row, is_foreign_key_violation, is_unique_violation, map_diesel_error, map_pool_error,
};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::{course_enrollments, courses, users};

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

async fn enrolled_courses(
    conn: &mut AsyncPgConnection,
    user: uuid::Uuid,
) -> Result<Vec<CourseId>, diesel::result::Error> {
    let ids: Vec<uuid::Uuid> = course_enrollments::table
        .filter(course_enrollments::user_id.eq(user))
        .order_by(course_enrollments::enrolled_at.asc())
        .select(course_enrollments::course_id)
        .load(conn)
        .await?;
    Ok(ids.into_iter().map(CourseId::from_uuid).collect())
}

async fn load_credentials(
    conn: &mut AsyncPgConnection,
    row: Option<UserRow>,
) -> Result<Option<UserCredentials>, UserPersistenceError> {
    let Some(row) = row else {
        return Ok(None);
    };
    let courses = enrolled_courses(conn, row.id)
        .await
        .map_err(map_diesel_error)?;
    let (user, password_hash) = row.into_user(courses).map_err(invalid_row)?;
    Ok(Some(UserCredentials {
        user,
        password_hash,
    }))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, record: &NewUserRecord) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *record.id.as_uuid(),
            first_name: record.first_name.as_ref(),
            last_name: record.last_name.as_ref(),
            email: record.email.as_ref(),
            role: record.role.as_str(),
            password_hash: record.password_hash.as_str(),
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserPersistenceError::duplicate_email(record.email.as_ref())
                } else {
                    map_diesel_error(err)
                }
            })?;
        Ok(User::new(UserDraft {
            id: record.id,
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            role: record.role,
            enrolled_courses: Vec::new(),
        }))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(load_credentials(&mut conn, row)
            .await?
            .map(|credentials| credentials.user))
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        load_credentials(&mut conn, row).await
    }

    async fn update_profile(
        &self,
        id: &UserId,
        profile: &ProfileRecord,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set((
                users::first_name.eq(profile.first_name.as_ref()),
                users::last_name.eq(profile.last_name.as_ref()),
                users::email.eq(profile.email.as_ref()),
            ))
            .execute(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserPersistenceError::duplicate_email(profile.email.as_ref())
                } else {
                    map_diesel_error(err)
                }
            })?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &UserId) -> Result<AccountRemoval, UserPersistenceError> {
        let user_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let outcome = conn
            .transaction(|conn| {
                async move {
                    let authored: i64 = courses::table
                        .filter(courses::instructor_id.eq(user_id))
                        .count()
                        .get_result(conn)
                        .await?;
                    if authored > 0 {
                        return Ok(AccountRemoval::OwnsCourses);
                    }
                    let deleted = diesel::delete(users::table.filter(users::id.eq(user_id)))
                        .execute(conn)
                        .await?;
                    Ok(if deleted > 0 {
                        AccountRemoval::Removed
                    } else {
                        AccountRemoval::NotFound
                    })
                }
                .scope_boxed()
            })
            .await;
        match outcome {
            Ok(removal) => Ok(removal),
            // A course created after the count still blocks the delete.
            Err(err) if is_foreign_key_violation(&err) => Ok(AccountRemoval::OwnsCourses),
            Err(err) => Err(map_diesel_error(err)),
        }
    }
}
