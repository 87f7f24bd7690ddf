//! PostgreSQL-backed `CourseRepository`.
//!
//! Course rows are loaded first and the enrolled-student sets are fetched
//! with a single follow-up query keyed by the loaded ids.
//!
//! Deleting a course locks its row `FOR UPDATE` before counting enrollments.
//! The enrollment ledger reads the same row `FOR SHARE`, so a purchase and a
//! deletion of one course never interleave. Outline, completion marks and
//! ratings go with the course through `ON DELETE CASCADE`.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{CourseRemoval, CourseRepository, CourseRepositoryError};
use crate::domain::{
    Course, CourseFilter, CourseId, CourseOutline, CourseStatus, Section, SectionId,
    SectionOutline, Subsection, SubsectionId, UserId,
};

use super::diesel_error_mapping::{invalid_row, map_diesel_error, map_pool_error};
use super::models::{CourseChangeset, CourseRow, NewCourseRow, SectionRow, SubsectionRow};
use super::pool::DbPool;
use super::schema::{course_enrollments, courses, sections, subsections};

#[derive(Clone)]
pub struct DieselCourseRepository {
    pool: DbPool,
}

impl DieselCourseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

async fn attach_students(
    conn: &mut AsyncPgConnection,
    rows: Vec<CourseRow>,
) -> Result<Vec<Course>, CourseRepositoryError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let pairs: Vec<(Uuid, Uuid)> = course_enrollments::table
        .filter(course_enrollments::course_id.eq_any(&ids))
        .select((course_enrollments::course_id, course_enrollments::user_id))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    let mut students: HashMap<Uuid, BTreeSet<UserId>> = HashMap::new();
    for (course_id, user_id) in pairs {
        students
            .entry(course_id)
            .or_default()
            .insert(UserId::from_uuid(user_id));
    }

    rows.into_iter()
        .map(|row| {
            let enrolled = students.remove(&row.id).unwrap_or_default();
            row.into_course(enrolled).map_err(invalid_row)
        })
        .collect()
}

#[async_trait]
impl CourseRepository for DieselCourseRepository {
    async fn create(&self, course: &Course) -> Result<(), CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(courses::table)
            .values(NewCourseRow::from(course))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = courses::table
            .filter(courses::id.eq(id.as_uuid()))
            .select(CourseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(attach_students(&mut conn, vec![row]).await?.pop())
    }

    async fn find_many(&self, ids: &[CourseId]) -> Result<Vec<Course>, CourseRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let wanted: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<CourseRow> = courses::table
            .filter(courses::id.eq_any(&wanted))
            .select(CourseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let mut found = attach_students(&mut conn, rows).await?;
        // Preserve the caller's order.
        found.sort_by_key(|course| wanted.iter().position(|id| id == course.id().as_uuid()));
        Ok(found)
    }

    async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = courses::table
            .select(CourseRow::as_select())
            .order_by(courses::created_at.desc())
            .into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(courses::status.eq(status.as_str()));
        }
        if let Some(category) = filter.category {
            query = query.filter(courses::category_id.eq(*category.as_uuid()));
        }
        if let Some(instructor) = filter.instructor {
            query = query.filter(courses::instructor_id.eq(*instructor.as_uuid()));
        }
        let rows = query.load(&mut conn).await.map_err(map_diesel_error)?;
        attach_students(&mut conn, rows).await
    }

    async fn set_status(
        &self,
        id: &CourseId,
        status: CourseStatus,
    ) -> Result<bool, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(courses::table.filter(courses::id.eq(id.as_uuid())))
            .set(courses::status.eq(status.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn update(&self, course: &Course) -> Result<bool, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(courses::table.filter(courses::id.eq(course.id().as_uuid())))
            .set(CourseChangeset::from(course))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &CourseId) -> Result<CourseRemoval, CourseRepositoryError> {
        let course_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                let locked: Option<Uuid> = courses::table
                    .filter(courses::id.eq(course_id))
                    .select(courses::id)
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                if locked.is_none() {
                    return Ok(CourseRemoval::NotFound);
                }
                let enrolled: i64 = course_enrollments::table
                    .filter(course_enrollments::course_id.eq(course_id))
                    .count()
                    .get_result(conn)
                    .await?;
                if enrolled > 0 {
                    return Ok(CourseRemoval::HasStudents);
                }
                diesel::delete(courses::table.filter(courses::id.eq(course_id)))
                    .execute(conn)
                    .await?;
                Ok(CourseRemoval::Removed)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn add_section(&self, section: &Section) -> Result<(), CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(sections::table)
            .values(SectionRow::from(section))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn add_subsection(&self, subsection: &Subsection) -> Result<(), CourseRepositoryError> {
        let row = SubsectionRow::try_from(subsection).map_err(invalid_row)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(subsections::table)
            .values(row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_section(&self, section: &Section) -> Result<bool, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(sections::table.filter(sections::id.eq(section.id.as_uuid())))
            .set(sections::name.eq(&section.name))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete_section(&self, id: &SectionId) -> Result<bool, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(sections::table.filter(sections::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn find_section(&self, id: &SectionId) -> Result<Option<Section>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = sections::table
            .filter(sections::id.eq(id.as_uuid()))
            .select(SectionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Section::from))
    }

    async fn find_subsection(
        &self,
        id: &SubsectionId,
    ) -> Result<Option<Subsection>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = subsections::table
            .filter(subsections::id.eq(id.as_uuid()))
            .select(SubsectionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Subsection::try_from).transpose().map_err(invalid_row)
    }

    async fn update_subsection(
        &self,
        subsection: &Subsection,
    ) -> Result<bool, CourseRepositoryError> {
        let row = SubsectionRow::try_from(subsection).map_err(invalid_row)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(subsections::table.filter(subsections::id.eq(row.id)))
            .set((
                subsections::title.eq(&row.title),
                subsections::description.eq(&row.description),
                subsections::duration_secs.eq(row.duration_secs),
                subsections::video_url.eq(&row.video_url),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete_subsection(&self, id: &SubsectionId) -> Result<bool, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(subsections::table.filter(subsections::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn outline(&self, id: &CourseId) -> Result<CourseOutline, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let section_rows: Vec<SectionRow> = sections::table
            .filter(sections::course_id.eq(id.as_uuid()))
            .order_by(sections::position.asc())
            .select(SectionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if section_rows.is_empty() {
            return Ok(CourseOutline::default());
        }

        let section_ids: Vec<Uuid> = section_rows.iter().map(|row| row.id).collect();
        let subsection_rows: Vec<SubsectionRow> = subsections::table
            .filter(subsections::section_id.eq_any(&section_ids))
            .order_by(subsections::position.asc())
            .select(SubsectionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut grouped: HashMap<Uuid, Vec<Subsection>> = HashMap::new();
        for row in subsection_rows {
            let section_id = row.section_id;
            let subsection = Subsection::try_from(row).map_err(invalid_row)?;
            grouped.entry(section_id).or_default().push(subsection);
        }

        let sections = section_rows
            .into_iter()
            .map(|row| {
                let subsections = grouped.remove(&row.id).unwrap_or_default();
                SectionOutline {
                    section: Section::from(row),
                    subsections,
                }
            })
            .collect();
        Ok(CourseOutline { sections })
    }

    async fn course_for_subsection(
        &self,
        subsection: &SubsectionId,
    ) -> Result<Option<CourseId>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let course: Option<Uuid> = subsections::table
            .inner_join(sections::table)
            .filter(subsections::id.eq(subsection.as_uuid()))
            .select(sections::course_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(course.map(CourseId::from_uuid))
    }
}
