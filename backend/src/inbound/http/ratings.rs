//! Rating endpoints.
//!
//! ```text
//! GET  /api/v1/courses/{id}/ratings
//! POST /api/v1/courses/{id}/ratings {"rating":5,"review":"Great pacing"}
//! GET  /api/v1/ratings
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{CourseId, Error, UserRole};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{ReviewDto, ReviewSummaryDto};
use crate::inbound::http::response::Envelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

const COURSE_ID: FieldName = FieldName::new("courseId");

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct RateCourseBody {
    #[schema(minimum = 1, maximum = 5)]
    pub rating: u8,
    pub review: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/ratings",
    params(("id" = String, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Average and reviews", body = [ReviewDto]),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 404, description = "Unknown course", body = Error)
    ),
    tags = ["ratings"],
    operation_id = "courseRatings",
    security([])
)]
#[get("/courses/{id}/ratings")]
pub async fn course_ratings(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: CourseId = parse_id(&path, COURSE_ID)?;
    let ratings = state.reviews_query.course_ratings(&id).await?;
    let reviews: Vec<ReviewDto> = ratings.reviews.iter().map(ReviewDto::from).collect();
    Ok(Envelope::ok(
        "Ratings fetched successfully",
        json!({ "averageRating": ratings.average, "ratings": reviews }),
    ))
}

/// Rate a course the calling student is enrolled in.
#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/ratings",
    params(("id" = String, Path, description = "Course identifier")),
    request_body = RateCourseBody,
    responses(
        (status = 201, description = "Rating stored", body = ReviewDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not enrolled or not a student", body = Error),
        (status = 404, description = "Unknown course", body = Error),
        (status = 409, description = "Already rated", body = Error)
    ),
    tags = ["ratings"],
    operation_id = "rateCourse"
)]
#[post("/courses/{id}/ratings")]
pub async fn rate_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<RateCourseBody>,
) -> ApiResult<HttpResponse> {
    let student = session.require_role(UserRole::Student)?;
    let id: CourseId = parse_id(&path, COURSE_ID)?;
    let review = state
        .reviews
        .rate_course(&student.id, &id, payload.rating, &payload.review)
        .await?;
    Ok(Envelope::created(
        "Rating and review created successfully",
        json!({ "rating": ReviewDto::from(&review) }),
    ))
}

/// Every review, best scores first.
#[utoipa::path(
    get,
    path = "/api/v1/ratings",
    responses(
        (status = 200, description = "All reviews", body = [ReviewSummaryDto]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["ratings"],
    operation_id = "allRatings",
    security([])
)]
#[get("/ratings")]
pub async fn all_ratings(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let reviews = state.reviews_query.all_reviews().await?;
    let reviews: Vec<ReviewSummaryDto> = reviews.iter().map(ReviewSummaryDto::from).collect();
    Ok(Envelope::ok(
        "All reviews fetched successfully",
        json!({ "ratings": reviews }),
    ))
}
