//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer, the
//! response and request schemas they reference, and the session cookie
//! security scheme. The document backs Swagger UI (debug builds) and is
//! exported via `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    CourseEnrollment, CourseStatus, EnrollmentStatus, Error, ErrorCode, UserRole,
};
use crate::inbound::http::auth::{LoginBody, SignupBody};
use crate::inbound::http::catalogue::{
    CourseDetailsDto, CourseStatusBody, CreateCategoryBody, CreateCourseBody, CreateSectionBody,
    CreateSubsectionBody, EditCourseBody, EditSubsectionBody,
};
use crate::inbound::http::dto::{
    CategoryDto, CourseDto, EnrolledCourseDto, GatewayOrderDto, InstructorCourseDto, ProgressDto,
    ReviewDto, ReviewSummaryDto, SectionDto, SectionOutlineDto, SessionUserDto, SubsectionDto,
    UserDto,
};
use crate::inbound::http::payments::{
    CaptureBody, CaptureResponse, ReceiptBody, VerifyBody, VerifyResponse,
};
use crate::inbound::http::progress::MarkCompleteBody;
use crate::inbound::http::ratings::RateCourseBody;
use crate::inbound::http::users::UpdateProfileBody;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "EduQuest backend API",
        description = "Course marketplace: accounts, catalogue, ratings, progress and checkout."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::signup,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::delete_account,
        crate::inbound::http::catalogue::list_categories,
        crate::inbound::http::catalogue::create_category,
        crate::inbound::http::catalogue::category_page,
        crate::inbound::http::catalogue::list_courses,
        crate::inbound::http::catalogue::create_course,
        crate::inbound::http::catalogue::course_details,
        crate::inbound::http::catalogue::edit_course,
        crate::inbound::http::catalogue::delete_course,
        crate::inbound::http::catalogue::set_course_status,
        crate::inbound::http::catalogue::add_section,
        crate::inbound::http::catalogue::update_section,
        crate::inbound::http::catalogue::delete_section,
        crate::inbound::http::catalogue::add_subsection,
        crate::inbound::http::catalogue::update_subsection,
        crate::inbound::http::catalogue::delete_subsection,
        crate::inbound::http::catalogue::instructor_courses,
        crate::inbound::http::ratings::course_ratings,
        crate::inbound::http::ratings::rate_course,
        crate::inbound::http::ratings::all_ratings,
        crate::inbound::http::progress::course_progress,
        crate::inbound::http::progress::mark_complete,
        crate::inbound::http::payments::capture_payment,
        crate::inbound::http::payments::verify_payment,
        crate::inbound::http::payments::send_payment_receipt,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        UserRole,
        CourseStatus,
        EnrollmentStatus,
        CourseEnrollment,
        SignupBody,
        LoginBody,
        UserDto,
        SessionUserDto,
        EnrolledCourseDto,
        CategoryDto,
        CourseDto,
        CourseDetailsDto,
        InstructorCourseDto,
        SectionDto,
        SubsectionDto,
        SectionOutlineDto,
        CreateCategoryBody,
        CreateCourseBody,
        CourseStatusBody,
        CreateSectionBody,
        CreateSubsectionBody,
        EditCourseBody,
        EditSubsectionBody,
        UpdateProfileBody,
        ReviewDto,
        ReviewSummaryDto,
        RateCourseBody,
        ProgressDto,
        MarkCompleteBody,
        GatewayOrderDto,
        CaptureBody,
        CaptureResponse,
        VerifyBody,
        VerifyResponse,
        ReceiptBody,
    )),
    tags(
        (name = "auth", description = "Signup, login and logout"),
        (name = "users", description = "The signed-in user's profile"),
        (name = "catalogue", description = "Categories, courses and outlines"),
        (name = "ratings", description = "Course ratings and reviews"),
        (name = "progress", description = "Lecture completion tracking"),
        (name = "payments", description = "Checkout, verification and receipts"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema field structure.

    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    use super::*;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    fn schema(name: &str) -> RefOr<Schema> {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        components
            .schemas
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("{name} schema"))
    }

    #[rstest]
    #[case("Error", "code")]
    #[case("Error", "message")]
    #[case("SignupBody", "confirmPassword")]
    #[case("CourseDto", "whatYouWillLearn")]
    #[case("VerifyBody", "razorpay_signature")]
    #[case("CaptureResponse", "order")]
    fn schemas_carry_wire_field_names(#[case] name: &str, #[case] field: &str) {
        assert_object_schema_has_field(&schema(name), field);
    }

    #[rstest]
    #[case("/api/v1/auth/login")]
    #[case("/api/v1/payments/capture")]
    #[case("/api/v1/payments/verify")]
    #[case("/api/v1/payments/success-email")]
    #[case("/api/v1/courses/{id}/progress")]
    #[case("/api/v1/subsections/{id}")]
    #[case("/health/ready")]
    fn documents_every_route(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    #[case("/api/v1/courses/{id}")]
    #[case("/api/v1/sections/{id}")]
    #[case("/api/v1/subsections/{id}")]
    #[case("/api/v1/users/me")]
    fn editable_resources_document_patch_and_delete(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        let item = doc.paths.paths.get(path).expect("documented path");
        assert!(item.patch.is_some(), "{path} lacks PATCH");
        assert!(item.delete.is_some(), "{path} lacks DELETE");
    }
}
