//! PostgreSQL-backed `RatingRepository`.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{RatingRepository, RatingRepositoryError};
use crate::domain::{CourseId, Review, ReviewSummary};

use super::diesel_error_mapping::{invalid_row, is_unique_violation, map_diesel_error, map_pool_error};
use super::models::RatingRow;
use super::pool::DbPool;
use super::schema::{courses, ratings, users};

#[derive(Clone)]
pub struct DieselRatingRepository {
    pool: DbPool,
}

impl DieselRatingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn into_reviews(rows: Vec<RatingRow>) -> Result<Vec<Review>, RatingRepositoryError> {
    rows.into_iter()
        .map(|row| Review::try_from(row).map_err(invalid_row))
        .collect()
}

#[async_trait]
impl RatingRepository for DieselRatingRepository {
    async fn create(&self, review: &Review) -> Result<(), RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(ratings::table)
            .values(RatingRow::from(review))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err) {
                    RatingRepositoryError::Duplicate
                } else {
                    map_diesel_error(err)
                }
            })
    }

    async fn list_for_course(&self, course: &CourseId) -> Result<Vec<Review>, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RatingRow> = ratings::table
            .filter(ratings::course_id.eq(course.as_uuid()))
            .order_by(ratings::created_at.asc())
            .select(RatingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_reviews(rows)
    }

    async fn list_all(&self) -> Result<Vec<ReviewSummary>, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RatingRow> = ratings::table
            .order_by(ratings::created_at.asc())
            .select(RatingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<Uuid> = rows.iter().map(|row| row.user_id).collect();
        let course_ids: Vec<Uuid> = rows.iter().map(|row| row.course_id).collect();
        let names: HashMap<Uuid, String> = users::table
            .filter(users::id.eq_any(&user_ids))
            .select((users::id, users::first_name, users::last_name))
            .load::<(Uuid, String, String)>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|(id, first, last)| (id, format!("{first} {last}")))
            .collect();
        let titles: HashMap<Uuid, String> = courses::table
            .filter(courses::id.eq_any(&course_ids))
            .select((courses::id, courses::title))
            .load::<(Uuid, String)>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .collect();

        into_reviews(rows)?
            .into_iter()
            .map(|review| -> Result<ReviewSummary, RatingRepositoryError> {
                let reviewer_name = names
                    .get(review.user.as_uuid())
                    .cloned()
                    .ok_or_else(|| invalid_row(format!("rating {} has no reviewer", review.id)))?;
                let course_title = titles
                    .get(review.course.as_uuid())
                    .cloned()
                    .ok_or_else(|| invalid_row(format!("rating {} has no course", review.id)))?;
                Ok(ReviewSummary {
                    review,
                    reviewer_name,
                    course_title,
                })
            })
            .collect()
    }
}
