//! Profile endpoint for the signed-in user.
//!
//! ```text
//! GET    /api/v1/users/me
//! PATCH  /api/v1/users/me {"firstName":"Ada"}
//! DELETE /api/v1/users/me
//! ```

use actix_web::{HttpResponse, delete, get, patch, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::Error;
use crate::domain::ports::ProfileChanges;
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{EnrolledCourseDto, UserDto};
use crate::inbound::http::response::{Envelope, message_only};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Profile edit. Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileBody {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// Return the current user's profile and enrolled courses.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Profile", body = UserDto),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "User no longer exists", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user = session.require_user()?;
    let profile = state.profile.fetch_profile(&user.id).await?;
    let courses: Vec<EnrolledCourseDto> =
        profile.courses.iter().map(EnrolledCourseDto::from).collect();
    Ok(Envelope::ok(
        "User details fetched successfully",
        json!({ "user": UserDto::from(&profile.user), "courses": courses }),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UpdateProfileBody,
    responses(
        (status = 200, description = "Profile updated", body = UserDto),
        (status = 400, description = "Invalid or empty edit", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "E-mail already registered", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[patch("/users/me")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateProfileBody>,
) -> ApiResult<HttpResponse> {
    let user = session.require_user()?;
    let body = payload.into_inner();
    let changes = ProfileChanges {
        first_name: body.first_name,
        last_name: body.last_name,
        email: body.email,
    };
    let updated = state.account.update_profile(&user.id, changes).await?;
    Ok(Envelope::ok(
        "Profile updated successfully",
        json!({ "user": UserDto::from(&updated) }),
    ))
}

/// Close the caller's account and end the session.
#[utoipa::path(
    delete,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Account deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "User no longer exists", body = Error),
        (status = 409, description = "Instructor still owns courses", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteAccount"
)]
#[delete("/users/me")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user = session.require_user()?;
    state.account.delete_account(&user.id).await?;
    session.purge();
    Ok(message_only("Account deleted successfully"))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ports::{EnrolledCourse, UserProfile};
    use crate::domain::{
        CourseId, EmailAddress, PersonName, User, UserDraft, UserId, UserRole,
    };
    use crate::inbound::http::test_utils::{MockPorts, login_as, test_app};

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(current_user)
            .service(update_profile)
            .service(delete_account);
    }

    fn profile(id: UserId, course: CourseId) -> UserProfile {
        UserProfile {
            user: User::new(UserDraft {
                id,
                first_name: PersonName::new("Grace", "firstName").expect("name"),
                last_name: PersonName::new("Hopper", "lastName").expect("name"),
                email: EmailAddress::new("grace@example.com").expect("email"),
                role: UserRole::Student,
                enrolled_courses: vec![course],
            }),
            courses: vec![EnrolledCourse {
                course,
                title: "COBOL for beginners".to_owned(),
                percentage: 50,
            }],
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn returns_profile_with_progress() {
        let id = UserId::random();
        let course = CourseId::random();
        let mut ports = MockPorts::default();
        ports
            .profile
            .expect_fetch_profile()
            .withf(move |requested| *requested == id)
            .return_once(move |_| Ok(profile(id, course)));
        let app = actix_test::init_service(test_app(ports, routes)).await;
        let cookie = login_as(&app, id, UserRole::Student).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/users/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["user"]["email"], "grace@example.com");
        assert_eq!(body["courses"][0]["courseId"], course.to_string());
        assert_eq!(body["courses"][0]["progressPercentage"], 50);
    }

    #[rstest]
    #[actix_web::test]
    async fn anonymous_callers_are_rejected() {
        let app = actix_test::init_service(test_app(MockPorts::default(), routes)).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/users/me").to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn profile_edits_are_forwarded_for_the_caller() {
        let id = UserId::random();
        let mut ports = MockPorts::default();
        ports
            .account
            .expect_update_profile()
            .withf(move |user, changes| {
                *user == id
                    && *changes
                        == ProfileChanges {
                            first_name: Some("Ada".to_owned()),
                            ..ProfileChanges::default()
                        }
            })
            .return_once(move |_, _| Ok(profile(id, CourseId::random()).user));
        let app = actix_test::init_service(test_app(ports, routes)).await;
        let cookie = login_as(&app, id, UserRole::Student).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri("/api/v1/users/me")
                .cookie(cookie)
                .set_json(json!({ "firstName": "Ada" }))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "Profile updated successfully");
        assert_eq!(body["user"]["id"], id.to_string());
    }

    #[rstest]
    #[actix_web::test]
    async fn taken_emails_surface_as_conflicts() {
        let id = UserId::random();
        let mut ports = MockPorts::default();
        ports
            .account
            .expect_update_profile()
            .return_once(|_, _| Err(Error::conflict("Email already registered")));
        let app = actix_test::init_service(test_app(ports, routes)).await;
        let cookie = login_as(&app, id, UserRole::Student).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri("/api/v1/users/me")
                .cookie(cookie)
                .set_json(json!({ "email": "taken@example.com" }))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[rstest]
    #[actix_web::test]
    async fn deleting_the_account_ends_the_session() {
        let id = UserId::random();
        let mut ports = MockPorts::default();
        ports
            .account
            .expect_delete_account()
            .withf(move |user| *user == id)
            .times(1)
            .return_once(|_| Ok(()));
        let app = actix_test::init_service(test_app(ports, routes)).await;
        let cookie = login_as(&app, id, UserRole::Student).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri("/api/v1/users/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let cleared = response
            .response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("removal cookie");
        assert_eq!(cleared.value(), "");
    }

    #[rstest]
    #[actix_web::test]
    async fn instructors_with_courses_cannot_delete_their_account() {
        let id = UserId::random();
        let mut ports = MockPorts::default();
        ports.account.expect_delete_account().return_once(|_| {
            Err(Error::conflict(
                "Delete your courses before deleting the account",
            ))
        });
        let app = actix_test::init_service(test_app(ports, routes)).await;
        let cookie = login_as(&app, id, UserRole::Instructor).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri("/api/v1/users/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
