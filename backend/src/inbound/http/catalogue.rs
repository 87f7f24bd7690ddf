//! Catalogue endpoints: categories, courses and their outlines.
//!
//! ```text
//! GET  /api/v1/categories
//! POST /api/v1/categories {"name":"Systems","description":"..."}
//! GET  /api/v1/courses/{id}
//! POST /api/v1/courses/{id}/sections {"name":"Ownership"}
//! PATCH /api/v1/courses/{id} {"price":"299.00"}
//! DELETE /api/v1/subsections/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::ports::AddSubsectionRequest;
use crate::domain::{
    CategoryId, CourseChanges, CourseId, CourseStatus, Error, NewCourseParts, SectionId,
    SubsectionChanges, SubsectionId, UserRole,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{
    self, CategoryDto, CourseDto, InstructorCourseDto, SectionDto, SectionOutlineDto,
    SubsectionDto,
};
use crate::inbound::http::response::{Envelope, message_only};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

const CATEGORY_ID: FieldName = FieldName::new("categoryId");
const COURSE_ID: FieldName = FieldName::new("courseId");
const SECTION_ID: FieldName = FieldName::new("sectionId");
const SUBSECTION_ID: FieldName = FieldName::new("subsectionId");

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryBody {
    pub name: String,
    pub description: String,
}

/// Draft course fields. `price` is in major units.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseBody {
    pub title: String,
    pub description: String,
    pub what_you_will_learn: String,
    #[schema(value_type = String, example = "499.00")]
    pub price: Decimal,
    #[schema(format = Uuid)]
    pub category_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CourseStatusBody {
    pub status: CourseStatus,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateSectionBody {
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubsectionBody {
    pub title: String,
    pub description: String,
    pub duration_secs: u32,
    pub video_url: String,
}

/// Partial course edit. Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditCourseBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub what_you_will_learn: Option<String>,
    #[schema(value_type = Option<String>, example = "299.00")]
    pub price: Option<Decimal>,
    #[schema(format = Uuid)]
    pub category_id: Option<String>,
    pub tags: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditSubsectionBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_secs: Option<u32>,
    pub video_url: Option<String>,
}

/// Course page: the course, its outline and rating summary.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetailsDto {
    pub course: CourseDto,
    pub outline: Vec<SectionOutlineDto>,
    #[schema(value_type = String, example = "4.50")]
    pub average_rating: Decimal,
    pub rating_count: usize,
    pub total_duration_secs: u64,
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "All categories", body = [CategoryDto]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "listCategories",
    security([])
)]
#[get("/categories")]
pub async fn list_categories(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let categories = state.catalogue_query.list_categories().await?;
    let categories: Vec<CategoryDto> = categories.iter().map(CategoryDto::from).collect();
    Ok(Envelope::ok(
        "Categories fetched successfully",
        json!({ "categories": categories }),
    ))
}

/// Create a category. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CreateCategoryBody,
    responses(
        (status = 201, description = "Category created", body = CategoryDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not an admin", body = Error),
        (status = 409, description = "Name already taken", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "createCategory"
)]
#[post("/categories")]
pub async fn create_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateCategoryBody>,
) -> ApiResult<HttpResponse> {
    session.require_role(UserRole::Admin)?;
    let category = state
        .catalogue
        .create_category(&payload.name, &payload.description)
        .await?;
    Ok(Envelope::created(
        "Category created successfully",
        json!({ "category": CategoryDto::from(&category) }),
    ))
}

/// A category with its published courses.
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(("id" = String, Path, description = "Category identifier")),
    responses(
        (status = 200, description = "Category page", body = CategoryDto),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 404, description = "Unknown category", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "categoryPage",
    security([])
)]
#[get("/categories/{id}")]
pub async fn category_page(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: CategoryId = parse_id(&path, CATEGORY_ID)?;
    let page = state.catalogue_query.category_page(&id).await?;
    Ok(Envelope::ok(
        "Category page fetched successfully",
        json!({
            "category": CategoryDto::from(&page.category),
            "courses": dto::courses(&page.courses),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses",
    responses(
        (status = 200, description = "Published courses", body = [CourseDto]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "listCourses",
    security([])
)]
#[get("/courses")]
pub async fn list_courses(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let courses = state.catalogue_query.list_courses().await?;
    Ok(Envelope::ok(
        "Courses fetched successfully",
        json!({ "courses": dto::courses(&courses) }),
    ))
}

/// Create a draft course owned by the calling instructor.
#[utoipa::path(
    post,
    path = "/api/v1/courses",
    request_body = CreateCourseBody,
    responses(
        (status = 201, description = "Draft created", body = CourseDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not an instructor", body = Error),
        (status = 404, description = "Unknown category", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "createCourse"
)]
#[post("/courses")]
pub async fn create_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateCourseBody>,
) -> ApiResult<HttpResponse> {
    let instructor = session.require_role(UserRole::Instructor)?;
    let body = payload.into_inner();
    let category = parse_id(&body.category_id, CATEGORY_ID)?;
    let course = state
        .catalogue
        .create_course(NewCourseParts {
            instructor: instructor.id,
            category,
            title: body.title,
            description: body.description,
            what_you_will_learn: body.what_you_will_learn,
            price: body.price,
            tags: body.tags,
            instructions: body.instructions,
        })
        .await?;
    Ok(Envelope::created(
        "Course created successfully",
        json!({ "course": CourseDto::from(&course) }),
    ))
}

/// Course details. Drafts are only visible to their instructor.
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    params(("id" = String, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Course details", body = CourseDetailsDto),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 404, description = "Unknown course", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "courseDetails",
    security([])
)]
#[get("/courses/{id}")]
pub async fn course_details(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: CourseId = parse_id(&path, COURSE_ID)?;
    let viewer = session.user()?.map(|user| user.id);
    let details = state.catalogue_query.course_details(&id, viewer).await?;
    let payload = CourseDetailsDto {
        course: CourseDto::from(&details.course),
        outline: details
            .outline
            .sections
            .iter()
            .map(SectionOutlineDto::from)
            .collect(),
        average_rating: details.average_rating,
        rating_count: details.rating_count,
        total_duration_secs: details.outline.total_duration_secs(),
    };
    Ok(Envelope::ok("Course details fetched successfully", payload))
}

/// Publish or unpublish an owned course.
#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/status",
    params(("id" = String, Path, description = "Course identifier")),
    request_body = CourseStatusBody,
    responses(
        (status = 200, description = "Status updated", body = CourseDto),
        (status = 403, description = "Not the owning instructor", body = Error),
        (status = 404, description = "Unknown course", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "setCourseStatus"
)]
#[post("/courses/{id}/status")]
pub async fn set_course_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CourseStatusBody>,
) -> ApiResult<HttpResponse> {
    let instructor = session.require_role(UserRole::Instructor)?;
    let id: CourseId = parse_id(&path, COURSE_ID)?;
    let course = state
        .catalogue
        .set_course_status(&instructor.id, &id, payload.status)
        .await?;
    Ok(Envelope::ok(
        "Course status updated successfully",
        json!({ "course": CourseDto::from(&course) }),
    ))
}

/// Edit an owned course. Status and students are untouched.
#[utoipa::path(
    patch,
    path = "/api/v1/courses/{id}",
    params(("id" = String, Path, description = "Course identifier")),
    request_body = EditCourseBody,
    responses(
        (status = 200, description = "Course updated", body = CourseDto),
        (status = 400, description = "Invalid or empty edit", body = Error),
        (status = 403, description = "Not the owning instructor", body = Error),
        (status = 404, description = "Unknown course or category", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "editCourse"
)]
#[patch("/courses/{id}")]
pub async fn edit_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<EditCourseBody>,
) -> ApiResult<HttpResponse> {
    let instructor = session.require_role(UserRole::Instructor)?;
    let id: CourseId = parse_id(&path, COURSE_ID)?;
    let body = payload.into_inner();
    let category = body
        .category_id
        .as_deref()
        .map(|raw| parse_id(raw, CATEGORY_ID))
        .transpose()?;
    let changes = CourseChanges {
        category,
        title: body.title,
        description: body.description,
        what_you_will_learn: body.what_you_will_learn,
        price: body.price,
        tags: body.tags,
        instructions: body.instructions,
    };
    let course = state
        .catalogue
        .edit_course(&instructor.id, &id, changes)
        .await?;
    Ok(Envelope::ok(
        "Course updated successfully",
        json!({ "course": CourseDto::from(&course) }),
    ))
}

/// Delete an owned course that nobody has bought.
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}",
    params(("id" = String, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Course deleted"),
        (status = 403, description = "Not the owning instructor", body = Error),
        (status = 404, description = "Unknown course", body = Error),
        (status = 409, description = "Course has enrolled students", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "deleteCourse"
)]
#[delete("/courses/{id}")]
pub async fn delete_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let instructor = session.require_role(UserRole::Instructor)?;
    let id: CourseId = parse_id(&path, COURSE_ID)?;
    state.catalogue.delete_course(&instructor.id, &id).await?;
    Ok(message_only("Course deleted successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/sections",
    params(("id" = String, Path, description = "Course identifier")),
    request_body = CreateSectionBody,
    responses(
        (status = 201, description = "Section created", body = SectionDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Not the owning instructor", body = Error),
        (status = 404, description = "Unknown course", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "addSection"
)]
#[post("/courses/{id}/sections")]
pub async fn add_section(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CreateSectionBody>,
) -> ApiResult<HttpResponse> {
    let instructor = session.require_role(UserRole::Instructor)?;
    let id: CourseId = parse_id(&path, COURSE_ID)?;
    let section = state
        .catalogue
        .add_section(&instructor.id, &id, &payload.name)
        .await?;
    Ok(Envelope::created(
        "Section created successfully",
        json!({ "section": SectionDto::from(&section) }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/sections/{id}/subsections",
    params(("id" = String, Path, description = "Section identifier")),
    request_body = CreateSubsectionBody,
    responses(
        (status = 201, description = "Subsection created", body = SubsectionDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Not the owning instructor", body = Error),
        (status = 404, description = "Unknown section", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "addSubsection"
)]
#[post("/sections/{id}/subsections")]
pub async fn add_subsection(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CreateSubsectionBody>,
) -> ApiResult<HttpResponse> {
    let instructor = session.require_role(UserRole::Instructor)?;
    let section: SectionId = parse_id(&path, SECTION_ID)?;
    let body = payload.into_inner();
    let subsection = state
        .catalogue
        .add_subsection(
            &instructor.id,
            AddSubsectionRequest {
                section,
                title: body.title,
                description: body.description,
                duration_secs: body.duration_secs,
                video_url: body.video_url,
            },
        )
        .await?;
    Ok(Envelope::created(
        "Subsection created successfully",
        json!({ "subsection": SubsectionDto::from(&subsection) }),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/v1/sections/{id}",
    params(("id" = String, Path, description = "Section identifier")),
    request_body = CreateSectionBody,
    responses(
        (status = 200, description = "Section renamed", body = SectionDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Not the owning instructor", body = Error),
        (status = 404, description = "Unknown section", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "updateSection"
)]
#[patch("/sections/{id}")]
pub async fn update_section(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CreateSectionBody>,
) -> ApiResult<HttpResponse> {
    let instructor = session.require_role(UserRole::Instructor)?;
    let id: SectionId = parse_id(&path, SECTION_ID)?;
    let section = state
        .catalogue
        .rename_section(&instructor.id, &id, &payload.name)
        .await?;
    Ok(Envelope::ok(
        "Section updated successfully",
        json!({ "section": SectionDto::from(&section) }),
    ))
}

/// Delete a section and its subsections. Completion marks on them go too.
#[utoipa::path(
    delete,
    path = "/api/v1/sections/{id}",
    params(("id" = String, Path, description = "Section identifier")),
    responses(
        (status = 200, description = "Section deleted"),
        (status = 403, description = "Not the owning instructor", body = Error),
        (status = 404, description = "Unknown section", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "deleteSection"
)]
#[delete("/sections/{id}")]
pub async fn delete_section(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let instructor = session.require_role(UserRole::Instructor)?;
    let id: SectionId = parse_id(&path, SECTION_ID)?;
    state.catalogue.delete_section(&instructor.id, &id).await?;
    Ok(message_only("Section deleted successfully"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/subsections/{id}",
    params(("id" = String, Path, description = "Subsection identifier")),
    request_body = EditSubsectionBody,
    responses(
        (status = 200, description = "Subsection updated", body = SubsectionDto),
        (status = 400, description = "Invalid or empty edit", body = Error),
        (status = 403, description = "Not the owning instructor", body = Error),
        (status = 404, description = "Unknown subsection", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "updateSubsection"
)]
#[patch("/subsections/{id}")]
pub async fn update_subsection(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<EditSubsectionBody>,
) -> ApiResult<HttpResponse> {
    let instructor = session.require_role(UserRole::Instructor)?;
    let id: SubsectionId = parse_id(&path, SUBSECTION_ID)?;
    let body = payload.into_inner();
    let changes = SubsectionChanges {
        title: body.title,
        description: body.description,
        duration_secs: body.duration_secs,
        video_url: body.video_url,
    };
    let subsection = state
        .catalogue
        .edit_subsection(&instructor.id, &id, changes)
        .await?;
    Ok(Envelope::ok(
        "Subsection updated successfully",
        json!({ "subsection": SubsectionDto::from(&subsection) }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/subsections/{id}",
    params(("id" = String, Path, description = "Subsection identifier")),
    responses(
        (status = 200, description = "Subsection deleted"),
        (status = 403, description = "Not the owning instructor", body = Error),
        (status = 404, description = "Unknown subsection", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "deleteSubsection"
)]
#[delete("/subsections/{id}")]
pub async fn delete_subsection(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let instructor = session.require_role(UserRole::Instructor)?;
    let id: SubsectionId = parse_id(&path, SUBSECTION_ID)?;
    state.catalogue.delete_subsection(&instructor.id, &id).await?;
    Ok(message_only("Subsection deleted successfully"))
}

/// The calling instructor's courses with enrollment income.
#[utoipa::path(
    get,
    path = "/api/v1/instructor/courses",
    responses(
        (status = 200, description = "Instructor dashboard", body = [InstructorCourseDto]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not an instructor", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "instructorCourses"
)]
#[get("/instructor/courses")]
pub async fn instructor_courses(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let instructor = session.require_role(UserRole::Instructor)?;
    let courses = state
        .catalogue_query
        .instructor_courses(&instructor.id)
        .await?;
    let courses: Vec<InstructorCourseDto> =
        courses.iter().map(InstructorCourseDto::from).collect();
    Ok(Envelope::ok(
        "Instructor courses fetched successfully",
        json!({ "courses": courses }),
    ))
}

#[cfg(test)]
mod tests;
