//! Tests for the order intent builder.

use std::collections::BTreeSet;
use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ports::{
    CourseRepositoryError, FixturePaymentGateway, MockCourseRepository, MockPaymentGateway,
    PaymentGatewayError,
};
use crate::domain::service_test_helpers::{course, course_with};
use crate::domain::{CourseId, CourseStatus, ErrorCode, GatewayOrder, Money};

fn builder(repo: MockCourseRepository, gateway: Arc<dyn PaymentGateway>) -> OrderIntentBuilder {
    OrderIntentBuilder::new(Arc::new(repo), gateway, Currency::inr())
}

fn selection(courses: &[&Course]) -> CourseSelection {
    CourseSelection::new(courses.iter().map(|c| c.id()).collect()).expect("selection")
}

fn repo_returning(courses: Vec<Course>) -> MockCourseRepository {
    let mut repo = MockCourseRepository::new();
    repo.expect_find_many()
        .times(1)
        .return_once(move |_| Ok(courses));
    repo
}

fn unused_gateway() -> Arc<dyn PaymentGateway> {
    let mut gateway = MockPaymentGateway::new();
    gateway.expect_create_order().times(0);
    Arc::new(gateway)
}

#[rstest]
#[tokio::test]
async fn total_is_sum_of_current_prices() {
    let c1 = course("C1", 1_000);
    let c2 = course("C2", 1_500);
    let requested = selection(&[&c1, &c2]);
    let service = builder(
        repo_returning(vec![c2.clone(), c1.clone()]),
        Arc::new(FixturePaymentGateway::default()),
    );

    let intent = service
        .build(&UserId::random(), requested)
        .await
        .expect("order intent");

    assert_eq!(intent.total, Money::from_minor(2_500));
    assert_eq!(intent.order.amount, Money::from_minor(2_500));
    assert_eq!(intent.order.currency, Currency::inr());
    assert_eq!(intent.order.id, format!("order_{}", intent.receipt));
    assert_eq!(intent.courses, vec![c1.id(), c2.id()]);
}

#[rstest]
#[tokio::test]
async fn gateway_order_notes_bind_the_priced_courses() {
    let c1 = course("C1", 1_000);
    let c2 = course("C2", 1_500);
    let requested = selection(&[&c1, &c2]);
    let expected = requested.digest();
    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_create_order()
        .withf(move |request| request.course_digest == expected)
        .times(1)
        .returning(|request| {
            Ok(GatewayOrder {
                id: "order_bound".to_owned(),
                amount: request.amount,
                currency: request.currency.clone(),
                receipt: request.receipt.to_string(),
                status: "created".to_owned(),
                course_digest: Some(request.course_digest.clone()),
            })
        });
    let service = builder(repo_returning(vec![c1.clone(), c2.clone()]), Arc::new(gateway));

    let intent = service
        .build(&UserId::random(), requested.clone())
        .await
        .expect("order intent");

    assert!(intent.order.covers(&requested));
}

#[rstest]
#[tokio::test]
async fn every_order_gets_a_fresh_receipt() {
    let c1 = course("C1", 1_000);
    let mut repo = MockCourseRepository::new();
    let stored = c1.clone();
    repo.expect_find_many()
        .times(2)
        .returning(move |_| Ok(vec![stored.clone()]));
    let service = builder(repo, Arc::new(FixturePaymentGateway::default()));
    let user = UserId::random();

    let first = service.build(&user, selection(&[&c1])).await.expect("first");
    let second = service.build(&user, selection(&[&c1])).await.expect("second");

    assert_ne!(first.receipt, second.receipt);
}

#[rstest]
#[tokio::test]
async fn enrolled_course_is_a_conflict_naming_the_course() {
    let user = UserId::random();
    let c1 = course_with("C1", 1_000, CourseStatus::Published, BTreeSet::from([user]));
    let c2 = course("C2", 1_500);
    let service = builder(repo_returning(vec![c1.clone(), c2.clone()]), unused_gateway());

    let error = service
        .build(&user, selection(&[&c1, &c2]))
        .await
        .expect_err("conflict");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert!(error.message().contains("C1"));
}

#[rstest]
#[tokio::test]
async fn unknown_course_is_not_found() {
    let c1 = course("C1", 1_000);
    let ghost = CourseId::random();
    let requested = CourseSelection::new(vec![c1.id(), ghost]).expect("selection");
    let service = builder(repo_returning(vec![c1]), unused_gateway());

    let error = service
        .build(&UserId::random(), requested)
        .await
        .expect_err("not found");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(
        error.details(),
        Some(&serde_json::json!({ "courseIds": [ghost] }))
    );
}

#[rstest]
#[tokio::test]
async fn draft_course_cannot_be_bought() {
    let draft = course_with("Draft", 1_000, CourseStatus::Draft, BTreeSet::new());
    let service = builder(repo_returning(vec![draft.clone()]), unused_gateway());

    let error = service
        .build(&UserId::random(), selection(&[&draft]))
        .await
        .expect_err("not found");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(0)]
#[case(-100)]
#[tokio::test]
async fn non_positive_price_is_invalid(#[case] price: i64) {
    let free = course("Free", price);
    let service = builder(repo_returning(vec![free.clone()]), unused_gateway());

    let error = service
        .build(&UserId::random(), selection(&[&free]))
        .await
        .expect_err("invalid");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case(PaymentGatewayError::timeout("10s"), None, true)]
#[case(PaymentGatewayError::rejected(400_u16, "amount too small"), Some(400), false)]
#[tokio::test]
async fn gateway_failures_become_upstream_failures(
    #[case] failure: PaymentGatewayError,
    #[case] provider_status: Option<u16>,
    #[case] retryable: bool,
) {
    let c1 = course("C1", 1_000);
    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_create_order()
        .times(1)
        .return_once(move |_| Err(failure));
    let service = builder(repo_returning(vec![c1.clone()]), Arc::new(gateway));

    let error = service
        .build(&UserId::random(), selection(&[&c1]))
        .await
        .expect_err("gateway failure");

    assert_eq!(error.code(), ErrorCode::UpstreamFailure);
    let details = error.details().expect("details");
    assert_eq!(details["retryable"], retryable);
    assert_eq!(
        details.get("providerStatus").and_then(serde_json::Value::as_u64),
        provider_status.map(u64::from)
    );
}

#[rstest]
#[tokio::test]
async fn repository_outage_is_service_unavailable() {
    let mut repo = MockCourseRepository::new();
    repo.expect_find_many()
        .times(1)
        .return_once(|_| Err(CourseRepositoryError::connection("refused")));
    let service = builder(repo, unused_gateway());

    let error = service
        .build(
            &UserId::random(),
            CourseSelection::new(vec![CourseId::random()]).expect("selection"),
        )
        .await
        .expect_err("unavailable");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
