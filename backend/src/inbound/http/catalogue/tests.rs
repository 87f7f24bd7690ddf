//! Tests for catalogue handlers.

use std::collections::BTreeSet;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use rust_decimal_macros::dec;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{CourseDetails, InstructorCourse};
use crate::domain::service_test_helpers::{course, course_with};
use crate::domain::{
    Category, CategoryDraft, CourseOutline, Money, Section, SectionOutline, Subsection,
    SubsectionId, UserId,
};
use crate::inbound::http::test_utils::{MockPorts, login_as, test_app};

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_categories)
        .service(create_category)
        .service(category_page)
        .service(list_courses)
        .service(create_course)
        .service(instructor_courses)
        .service(course_details)
        .service(set_course_status)
        .service(edit_course)
        .service(delete_course)
        .service(add_section)
        .service(update_section)
        .service(delete_section)
        .service(add_subsection)
        .service(update_subsection)
        .service(delete_subsection);
}

fn category(name: &str) -> Category {
    Category::new(CategoryDraft {
        id: CategoryId::random(),
        name: name.to_owned(),
        description: format!("{name} courses"),
    })
    .expect("category")
}

fn course_body(category: &str) -> Value {
    json!({
        "title": "Rust in Action",
        "description": "Systems programming",
        "whatYouWillLearn": "Ownership",
        "price": "499.50",
        "categoryId": category,
        "tags": ["rust"],
    })
}

#[rstest]
#[actix_web::test]
async fn lists_categories_publicly() {
    let mut ports = MockPorts::default();
    ports
        .catalogue_query
        .expect_list_categories()
        .return_once(|| Ok(vec![category("Systems"), category("Web")]));
    let app = actix_test::init_service(test_app(ports, routes)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/categories").to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["success"], Value::Bool(true));
    assert_eq!(body["categories"][1]["name"], "Web");
}

#[rstest]
#[case(UserRole::Student, StatusCode::FORBIDDEN)]
#[case(UserRole::Instructor, StatusCode::FORBIDDEN)]
#[case(UserRole::Admin, StatusCode::CREATED)]
#[actix_web::test]
async fn only_admins_create_categories(#[case] role: UserRole, #[case] expected: StatusCode) {
    let mut ports = MockPorts::default();
    ports
        .catalogue
        .expect_create_category()
        .withf(|name, _| name == "Systems")
        .returning(|name, _| Ok(category(name)));
    let app = actix_test::init_service(test_app(ports, routes)).await;
    let cookie = login_as(&app, UserId::random(), role).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/categories")
            .cookie(cookie)
            .set_json(json!({ "name": "Systems", "description": "Low level" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), expected);
}

#[rstest]
#[actix_web::test]
async fn category_page_rejects_malformed_ids() {
    let app = actix_test::init_service(test_app(MockPorts::default(), routes)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/categories/not-a-uuid")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], "categoryId");
    assert_eq!(body["details"]["code"], "invalid_uuid");
}

#[rstest]
#[actix_web::test]
async fn instructors_create_draft_courses() {
    let instructor = UserId::random();
    let category_id = CategoryId::random();
    let mut ports = MockPorts::default();
    ports
        .catalogue
        .expect_create_course()
        .withf(move |parts| {
            parts.instructor == instructor
                && parts.category == category_id
                && parts.price == dec!(499.50)
                && parts.instructions.is_empty()
        })
        .return_once(|parts| Ok(course(&parts.title, 49_950)));
    let app = actix_test::init_service(test_app(ports, routes)).await;
    let cookie = login_as(&app, instructor, UserRole::Instructor).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/courses")
            .cookie(cookie)
            .set_json(course_body(&category_id.to_string()))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["course"]["title"], "Rust in Action");
    assert_eq!(body["course"]["price"], "499.50");
}

#[rstest]
#[actix_web::test]
async fn students_cannot_create_courses() {
    let app = actix_test::init_service(test_app(MockPorts::default(), routes)).await;
    let cookie = login_as(&app, UserId::random(), UserRole::Student).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/courses")
            .cookie(cookie)
            .set_json(course_body(&CategoryId::random().to_string()))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["message"], "You are not an Instructor");
}

#[rstest]
#[actix_web::test]
async fn course_details_pass_the_viewer_and_outline() {
    let viewer = UserId::random();
    let published = course("Rust in Action", 49_950);
    let course_id = published.id();
    let section = Section {
        id: crate::domain::SectionId::random(),
        course_id,
        name: "Ownership".to_owned(),
    };
    let subsection = Subsection {
        id: SubsectionId::random(),
        section_id: section.id,
        title: "Moves".to_owned(),
        description: "Move semantics".to_owned(),
        duration_secs: 90,
        video_url: "https://videos.example.com/moves.mp4".to_owned(),
    };
    let details = CourseDetails {
        course: published,
        outline: CourseOutline {
            sections: vec![SectionOutline {
                section,
                subsections: vec![subsection],
            }],
        },
        average_rating: dec!(4.50),
        rating_count: 2,
    };
    let mut ports = MockPorts::default();
    ports
        .catalogue_query
        .expect_course_details()
        .withf(move |id, seen| *id == course_id && *seen == Some(viewer))
        .return_once(move |_, _| Ok(details));
    let app = actix_test::init_service(test_app(ports, routes)).await;
    let cookie = login_as(&app, viewer, UserRole::Student).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/courses/{course_id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["averageRating"], "4.50");
    assert_eq!(body["ratingCount"], 2);
    assert_eq!(body["totalDurationSecs"], 90);
    assert_eq!(body["outline"][0]["name"], "Ownership");
    assert_eq!(body["outline"][0]["subsections"][0]["durationSecs"], 90);
}

#[rstest]
#[actix_web::test]
async fn anonymous_course_details_have_no_viewer() {
    let mut ports = MockPorts::default();
    ports
        .catalogue_query
        .expect_course_details()
        .withf(|_, viewer| viewer.is_none())
        .return_once(|_, _| Err(Error::not_found("Course not found")));
    let app = actix_test::init_service(test_app(ports, routes)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/courses/{}", CourseId::random()))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn status_changes_are_forwarded_for_the_owner() {
    let instructor = UserId::random();
    let draft = course_with("Draft", 1_000, CourseStatus::Draft, BTreeSet::new());
    let course_id = draft.id();
    let mut ports = MockPorts::default();
    ports
        .catalogue
        .expect_set_course_status()
        .withf(move |owner, id, status| {
            *owner == instructor && *id == course_id && *status == CourseStatus::Published
        })
        .return_once(|_, _, _| Ok(course("Draft", 1_000)));
    let app = actix_test::init_service(test_app(ports, routes)).await;
    let cookie = login_as(&app, instructor, UserRole::Instructor).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/courses/{course_id}/status"))
            .cookie(cookie)
            .set_json(json!({ "status": "Published" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["course"]["status"], "Published");
}

#[rstest]
#[actix_web::test]
async fn subsections_are_added_to_sections() {
    let instructor = UserId::random();
    let section_id = crate::domain::SectionId::random();
    let mut ports = MockPorts::default();
    ports
        .catalogue
        .expect_add_subsection()
        .withf(move |owner, request| {
            *owner == instructor && request.section == section_id && request.duration_secs == 300
        })
        .return_once(move |_, request| {
            Ok(Subsection {
                id: SubsectionId::random(),
                section_id: request.section,
                title: request.title,
                description: request.description,
                duration_secs: request.duration_secs,
                video_url: request.video_url,
            })
        });
    let app = actix_test::init_service(test_app(ports, routes)).await;
    let cookie = login_as(&app, instructor, UserRole::Instructor).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/sections/{section_id}/subsections"))
            .cookie(cookie)
            .set_json(json!({
                "title": "Borrowing",
                "description": "Shared references",
                "durationSecs": 300,
                "videoUrl": "https://videos.example.com/borrow.mp4",
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["subsection"]["sectionId"], section_id.to_string());
}

#[rstest]
#[actix_web::test]
async fn instructor_dashboard_reports_income() {
    let instructor = UserId::random();
    let mut ports = MockPorts::default();
    ports
        .catalogue_query
        .expect_instructor_courses()
        .withf(move |id| *id == instructor)
        .return_once(|_| {
            Ok(vec![InstructorCourse {
                course: course("Rust in Action", 49_900),
                income: Money::from_minor(99_800),
            }])
        });
    let app = actix_test::init_service(test_app(ports, routes)).await;
    let cookie = login_as(&app, instructor, UserRole::Instructor).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/instructor/courses")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["courses"][0]["income"], "998.00");
    assert_eq!(body["courses"][0]["title"], "Rust in Action");
}

#[rstest]
#[actix_web::test]
async fn course_edits_forward_only_the_fields_sent() {
    let instructor = UserId::random();
    let owned = course("Rust in Action", 49_950);
    let course_id = owned.id();
    let category_id = CategoryId::random();
    let mut ports = MockPorts::default();
    ports
        .catalogue
        .expect_edit_course()
        .withf(move |owner, id, changes| {
            *owner == instructor
                && *id == course_id
                && changes.price == Some(dec!(299.00))
                && changes.category == Some(category_id)
                && changes.title.is_none()
                && changes.tags.is_none()
        })
        .return_once(|_, _, _| Ok(course("Rust in Action", 29_900)));
    let app = actix_test::init_service(test_app(ports, routes)).await;
    let cookie = login_as(&app, instructor, UserRole::Instructor).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/courses/{course_id}"))
            .cookie(cookie)
            .set_json(json!({ "price": "299.00", "categoryId": category_id.to_string() }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["message"], "Course updated successfully");
    assert_eq!(body["course"]["price"], "299.00");
}

#[rstest]
#[actix_web::test]
async fn course_edits_reject_malformed_category_ids() {
    let app = actix_test::init_service(test_app(MockPorts::default(), routes)).await;
    let cookie = login_as(&app, UserId::random(), UserRole::Instructor).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/courses/{}", CourseId::random()))
            .cookie(cookie)
            .set_json(json!({ "categoryId": "nope" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], "categoryId");
}

#[rstest]
#[case(Ok(()), StatusCode::OK)]
#[case(
    Err(Error::conflict("Course has enrolled students and cannot be deleted")),
    StatusCode::CONFLICT
)]
#[case(Err(Error::forbidden("You do not own this course")), StatusCode::FORBIDDEN)]
#[actix_web::test]
async fn course_deletion_reports_the_service_outcome(
    #[case] outcome: Result<(), Error>,
    #[case] expected: StatusCode,
) {
    let instructor = UserId::random();
    let course_id = CourseId::random();
    let mut ports = MockPorts::default();
    ports
        .catalogue
        .expect_delete_course()
        .withf(move |owner, id| *owner == instructor && *id == course_id)
        .return_once(move |_, _| outcome);
    let app = actix_test::init_service(test_app(ports, routes)).await;
    let cookie = login_as(&app, instructor, UserRole::Instructor).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/courses/{course_id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), expected);
}

#[rstest]
#[actix_web::test]
async fn students_cannot_delete_courses() {
    let app = actix_test::init_service(test_app(MockPorts::default(), routes)).await;
    let cookie = login_as(&app, UserId::random(), UserRole::Student).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/courses/{}", CourseId::random()))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn sections_are_renamed_for_the_owner() {
    let instructor = UserId::random();
    let section_id = crate::domain::SectionId::random();
    let course_id = CourseId::random();
    let mut ports = MockPorts::default();
    ports
        .catalogue
        .expect_rename_section()
        .withf(move |owner, id, name| {
            *owner == instructor && *id == section_id && name == "Lifetimes"
        })
        .return_once(move |_, id, name| {
            Ok(Section {
                id: *id,
                course_id,
                name: name.to_owned(),
            })
        });
    let app = actix_test::init_service(test_app(ports, routes)).await;
    let cookie = login_as(&app, instructor, UserRole::Instructor).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/sections/{section_id}"))
            .cookie(cookie)
            .set_json(json!({ "name": "Lifetimes" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["section"]["name"], "Lifetimes");
}

#[rstest]
#[actix_web::test]
async fn section_deletion_is_forwarded() {
    let instructor = UserId::random();
    let section_id = crate::domain::SectionId::random();
    let mut ports = MockPorts::default();
    ports
        .catalogue
        .expect_delete_section()
        .withf(move |owner, id| *owner == instructor && *id == section_id)
        .return_once(|_, _| Ok(()));
    let app = actix_test::init_service(test_app(ports, routes)).await;
    let cookie = login_as(&app, instructor, UserRole::Instructor).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/sections/{section_id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["message"], "Section deleted successfully");
}

#[rstest]
#[actix_web::test]
async fn subsection_edits_carry_partial_changes() {
    let instructor = UserId::random();
    let subsection_id = SubsectionId::random();
    let section_id = crate::domain::SectionId::random();
    let mut ports = MockPorts::default();
    ports
        .catalogue
        .expect_edit_subsection()
        .withf(move |owner, id, changes| {
            *owner == instructor
                && *id == subsection_id
                && changes.duration_secs == Some(420)
                && changes.title.is_none()
        })
        .return_once(move |_, id, _| {
            Ok(Subsection {
                id: *id,
                section_id,
                title: "Moves".to_owned(),
                description: "Move semantics".to_owned(),
                duration_secs: 420,
                video_url: "https://videos.example.com/moves.mp4".to_owned(),
            })
        });
    let app = actix_test::init_service(test_app(ports, routes)).await;
    let cookie = login_as(&app, instructor, UserRole::Instructor).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/subsections/{subsection_id}"))
            .cookie(cookie)
            .set_json(json!({ "durationSecs": 420 }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["subsection"]["durationSecs"], 420);
}

#[rstest]
#[actix_web::test]
async fn subsection_routes_reject_malformed_ids() {
    let app = actix_test::init_service(test_app(MockPorts::default(), routes)).await;
    let cookie = login_as(&app, UserId::random(), UserRole::Instructor).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri("/api/v1/subsections/not-a-uuid")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], "subsectionId");
    assert_eq!(body["details"]["code"], "invalid_uuid");
}
