//! Course progress endpoints.
//!
//! ```text
//! GET  /api/v1/courses/{id}/progress
//! POST /api/v1/courses/{id}/progress {"subsectionId":"..."}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{CourseId, Error, SubsectionId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::ProgressDto;
use crate::inbound::http::response::Envelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

const COURSE_ID: FieldName = FieldName::new("courseId");
const SUBSECTION_ID: FieldName = FieldName::new("subsectionId");

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkCompleteBody {
    #[schema(format = Uuid)]
    pub subsection_id: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/progress",
    params(("id" = String, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Progress", body = ProgressDto),
        (status = 400, description = "Not enrolled", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown course", body = Error)
    ),
    tags = ["progress"],
    operation_id = "courseProgress"
)]
#[get("/courses/{id}/progress")]
pub async fn course_progress(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = session.require_user()?;
    let course: CourseId = parse_id(&path, COURSE_ID)?;
    let view = state.progress_query.progress(&user.id, &course).await?;
    Ok(Envelope::ok(
        "Course progress fetched successfully",
        json!({ "progress": ProgressDto::from(&view) }),
    ))
}

/// Mark one lecture video as watched.
#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/progress",
    params(("id" = String, Path, description = "Course identifier")),
    request_body = MarkCompleteBody,
    responses(
        (status = 200, description = "Updated progress", body = ProgressDto),
        (status = 400, description = "Invalid request or not enrolled", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown subsection", body = Error),
        (status = 409, description = "Already completed", body = Error)
    ),
    tags = ["progress"],
    operation_id = "markSubsectionComplete"
)]
#[post("/courses/{id}/progress")]
pub async fn mark_complete(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<MarkCompleteBody>,
) -> ApiResult<HttpResponse> {
    let user = session.require_user()?;
    let course: CourseId = parse_id(&path, COURSE_ID)?;
    let subsection: SubsectionId = parse_id(&payload.subsection_id, SUBSECTION_ID)?;
    let view = state
        .progress
        .mark_complete(&user.id, &course, &subsection)
        .await?;
    Ok(Envelope::ok(
        "Course progress updated successfully",
        json!({ "progress": ProgressDto::from(&view) }),
    ))
}
