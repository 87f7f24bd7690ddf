//! Behaviour tests for checkout: order pricing, signature verification and
//! enrollment against the in-memory store.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use eduquest::domain::ports::{
    CourseRepository, EnrollmentLedger, FixturePaymentGateway, NewUserRecord, NotificationQueue,
    NotificationQueueError, PaymentCommand, ProgressRepository, UserRepository,
};
use eduquest::domain::{
    CategoryId, Course, CourseDraft, CourseId, CourseSelection, CourseStatus, Currency,
    EmailAddress, EnrollmentCoordinator, EnrollmentReport, Error, ErrorCode, Money,
    NotificationJob, OrderIntent, OrderIntentBuilder, PasswordHash, PaymentClaim, PaymentService,
    PaymentVerifier, PersonName, ReceiptToken, SignatureVerifier, SigningSecret, UserId,
    UserRole,
};
use eduquest::outbound::memory::MemoryStore;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use rust_decimal::Decimal;
use tokio::runtime::Runtime;

const GATEWAY_SECRET: &str = "bdd_gateway_secret";

/// Queue double that keeps every job it is handed.
#[derive(Clone, Default)]
struct RecordingQueue {
    jobs: Arc<Mutex<Vec<NotificationJob>>>,
}

impl RecordingQueue {
    fn confirmations(&self) -> usize {
        self.jobs
            .lock()
            .expect("queue lock")
            .iter()
            .filter(|job| matches!(job, NotificationJob::EnrollmentConfirmation { .. }))
            .count()
    }
}

#[async_trait]
impl NotificationQueue for RecordingQueue {
    async fn enqueue(&self, job: NotificationJob) -> Result<(), NotificationQueueError> {
        self.jobs.lock().expect("queue lock").push(job);
        Ok(())
    }
}

/// Wrapper for non-Clone runtime handle.
#[derive(Clone)]
struct RuntimeHandle(Arc<Runtime>);

#[derive(Default, ScenarioState)]
struct CheckoutWorld {
    runtime: Slot<RuntimeHandle>,
    store: Slot<MemoryStore>,
    queue: Slot<RecordingQueue>,
    payments: Slot<PaymentService>,
    signatures: Slot<SignatureVerifier>,
    courses: Slot<Vec<(String, CourseId)>>,
    student: Slot<UserId>,
    last_order: Slot<Result<OrderIntent, Error>>,
    receipts: Slot<Vec<ReceiptToken>>,
    last_verification: Slot<Result<EnrollmentReport, Error>>,
}

impl CheckoutWorld {
    fn setup(&self) {
        let runtime = Runtime::new().expect("create runtime");
        let store = MemoryStore::new();
        let queue = RecordingQueue::default();
        let signatures =
            SignatureVerifier::new(&SigningSecret::new(GATEWAY_SECRET)).expect("signing key");
        let gateway = Arc::new(FixturePaymentGateway::default());
        let payments = PaymentService::new(
            OrderIntentBuilder::new(Arc::new(store.clone()), gateway.clone(), Currency::inr()),
            PaymentVerifier::new(
                signatures.clone(),
                gateway,
                EnrollmentCoordinator::new(Arc::new(store.clone()), Arc::new(queue.clone())),
            ),
            Arc::new(store.clone()),
            Arc::new(queue.clone()),
        );

        self.runtime.set(RuntimeHandle(Arc::new(runtime)));
        self.store.set(store);
        self.queue.set(queue);
        self.payments.set(payments);
        self.signatures.set(signatures);
        self.courses.set(Vec::new());
        self.receipts.set(Vec::new());
    }

    fn block_on<T>(&self, future: impl std::future::Future<Output = T>) -> T {
        let runtime = self.runtime.get().expect("runtime");
        runtime.0.block_on(future)
    }

    fn store(&self) -> MemoryStore {
        self.store.get().expect("store")
    }

    fn student(&self) -> UserId {
        self.student.get().expect("student registered")
    }

    fn course_id(&self, name: &str) -> CourseId {
        let name = name.trim_matches('"');
        self.courses
            .get()
            .expect("courses")
            .into_iter()
            .find_map(|(title, id)| (title == name).then_some(id))
            .unwrap_or_else(|| panic!("course {name} was not seeded"))
    }

    fn all_courses(&self) -> CourseSelection {
        let ids = self
            .courses
            .get()
            .expect("courses")
            .into_iter()
            .map(|(_, id)| id)
            .collect();
        CourseSelection::new(ids).expect("selection")
    }

    fn add_course(&self, name: &str, price: &str) {
        let name = name.trim_matches('"').to_owned();
        let price = Decimal::from_str(price.trim_matches('"')).expect("decimal price");
        let course = Course::new(CourseDraft {
            id: CourseId::random(),
            instructor: UserId::random(),
            category: CategoryId::random(),
            title: name.clone(),
            description: format!("{name} description"),
            what_you_will_learn: "Everything".to_owned(),
            price: Money::from_major(price).expect("money"),
            tags: Vec::new(),
            instructions: Vec::new(),
            status: CourseStatus::Published,
            students_enrolled: BTreeSet::new(),
            created_at: Utc::now(),
        })
        .expect("course");
        let store = self.store();
        self.block_on(CourseRepository::create(&store, &course))
            .expect("store course");

        let mut courses = self.courses.get().expect("courses");
        courses.push((name, course.id()));
        self.courses.set(courses);
    }

    fn register_student(&self) {
        let record = NewUserRecord {
            id: UserId::random(),
            first_name: PersonName::new("Ada", "firstName").expect("first name"),
            last_name: PersonName::new("Lovelace", "lastName").expect("last name"),
            email: EmailAddress::new("ada@example.com").expect("email"),
            role: UserRole::Student,
            password_hash: PasswordHash::from_phc("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"),
        };
        let store = self.store();
        let user = self
            .block_on(UserRepository::create(&store, &record))
            .expect("store student");
        self.student.set(user.id());
    }

    fn order(&self, first: &str, second: &str) {
        let selection = CourseSelection::new(vec![self.course_id(first), self.course_id(second)])
            .expect("selection");
        self.place(selection);
    }

    fn place(&self, selection: CourseSelection) {
        let payments = self.payments.get().expect("payments");
        let student = self.student();
        let result = self.block_on(payments.create_order(&student, selection));
        if let Ok(intent) = &result {
            let mut receipts = self.receipts.get().expect("receipts");
            receipts.push(intent.receipt);
            self.receipts.set(receipts);
        }
        self.last_order.set(result);
    }

    /// The gateway order being paid, opened for every course if none is.
    fn paid_order_id(&self) -> String {
        if let Some(Ok(intent)) = self.last_order.get() {
            return intent.order.id;
        }
        self.place(self.all_courses());
        self.last_order().expect("order opened").order.id
    }

    fn pay(&self, tampered: bool) {
        let order_id = self.paid_order_id();
        let payment_id = format!("pay_for_{order_id}");
        let signatures = self.signatures.get().expect("signatures");
        let signature = if tampered {
            signatures.sign(&order_id, "pay_forged")
        } else {
            signatures.sign(&order_id, &payment_id)
        };
        let claim = PaymentClaim::try_new(
            &order_id,
            &payment_id,
            &signature,
            self.all_courses(),
            self.student(),
        )
        .expect("claim");
        let payments = self.payments.get().expect("payments");
        let result = self.block_on(payments.verify_payment(&claim));
        self.last_verification.set(result);
    }

    fn last_order(&self) -> Result<OrderIntent, Error> {
        self.last_order.get().expect("order placed")
    }

    fn last_verification(&self) -> Result<EnrollmentReport, Error> {
        self.last_verification.get().expect("payment verified")
    }
}

#[fixture]
fn world() -> CheckoutWorld {
    CheckoutWorld::default()
}

// -----------------------------------------------------------------------------
// Given Steps
// -----------------------------------------------------------------------------

#[given("a checkout backed by the in-memory store")]
fn a_checkout_backed_by_the_in_memory_store(world: &CheckoutWorld) {
    world.setup();
}

#[given("a published course {name} priced {price}")]
fn a_published_course_priced(world: &CheckoutWorld, name: String, price: String) {
    world.add_course(&name, &price);
}

#[given("a registered student")]
fn a_registered_student(world: &CheckoutWorld) {
    world.register_student();
}

#[given("the student is already enrolled in {name}")]
fn the_student_is_already_enrolled_in(world: &CheckoutWorld, name: String) {
    let course = world.course_id(&name);
    let student = world.student();
    let store = world.store();
    world
        .block_on(EnrollmentLedger::enroll(&store, &course, &student))
        .expect("enroll");
}

// -----------------------------------------------------------------------------
// When Steps
// -----------------------------------------------------------------------------

#[when("the student orders courses {first} and {second}")]
fn the_student_orders_courses(world: &CheckoutWorld, first: String, second: String) {
    world.order(&first, &second);
}

#[when("the student orders course {name} alone")]
fn the_student_orders_course_alone(world: &CheckoutWorld, name: String) {
    let selection = CourseSelection::new(vec![world.course_id(&name)]).expect("selection");
    world.place(selection);
}

#[when("a second order is placed for {first} and {second}")]
fn a_second_order_is_placed_for(world: &CheckoutWorld, first: String, second: String) {
    world.order(&first, &second);
}

#[when("the student pays for both courses with a tampered signature")]
fn the_student_pays_with_a_tampered_signature(world: &CheckoutWorld) {
    world.pay(true);
}

#[when("the student pays for both courses with a valid signature")]
fn the_student_pays_with_a_valid_signature(world: &CheckoutWorld) {
    world.pay(false);
}

#[when("the student pays for both courses again with a valid signature")]
fn the_student_pays_again_with_a_valid_signature(world: &CheckoutWorld) {
    world.pay(false);
}

// -----------------------------------------------------------------------------
// Then Steps
// -----------------------------------------------------------------------------

#[then("the order total is {amount}")]
fn the_order_total_is(world: &CheckoutWorld, amount: String) {
    let expected = Decimal::from_str(amount.trim_matches('"')).expect("decimal amount");
    let intent = world.last_order().expect("order should succeed");
    assert_eq!(intent.total.to_major(), expected);
}

#[then("the gateway order carries the order total")]
fn the_gateway_order_carries_the_order_total(world: &CheckoutWorld) {
    let intent = world.last_order().expect("order should succeed");
    assert_eq!(intent.order.amount, intent.total);
    assert_eq!(intent.order.receipt, intent.receipt.to_string());
}

#[then("each order has a unique receipt")]
fn each_order_has_a_unique_receipt(world: &CheckoutWorld) {
    let receipts = world.receipts.get().expect("receipts");
    assert_eq!(receipts.len(), 2);
    assert_ne!(receipts.first(), receipts.get(1));
}

#[then("the order is refused with a conflict naming {name}")]
fn the_order_is_refused_with_a_conflict_naming(world: &CheckoutWorld, name: String) {
    let error = world.last_order().expect_err("order should be refused");
    assert_eq!(error.code(), ErrorCode::Conflict);
    assert!(
        error.message().contains(name.trim_matches('"')),
        "conflict message should name the course: {}",
        error.message()
    );
}

#[then("the payment is rejected")]
fn the_payment_is_rejected(world: &CheckoutWorld) {
    let error = world.last_verification().expect_err("payment should be rejected");
    assert_eq!(error.code(), ErrorCode::PaymentRejected);
}

#[then("the student holds {count} progress records")]
fn the_student_holds_progress_records(world: &CheckoutWorld, count: usize) {
    let student = world.student();
    let store = world.store();
    let records = world
        .block_on(ProgressRepository::list_for_user(&store, &student))
        .expect("progress");
    assert_eq!(records.len(), count);
}

#[then("the student owns no courses")]
fn the_student_owns_no_courses(world: &CheckoutWorld) {
    let student = world.student();
    let store = world.store();
    let user = world
        .block_on(UserRepository::find_by_id(&store, &student))
        .expect("lookup")
        .expect("student");
    assert!(user.enrolled_courses().is_empty());
}

#[then("the student owns both courses")]
fn the_student_owns_both_courses(world: &CheckoutWorld) {
    let student = world.student();
    let store = world.store();
    let user = world
        .block_on(UserRepository::find_by_id(&store, &student))
        .expect("lookup")
        .expect("student");
    for course in world.all_courses().as_slice() {
        assert!(user.is_enrolled_in(course), "student should own {course}");
        let stored = world
            .block_on(CourseRepository::find_by_id(&store, course))
            .expect("lookup")
            .expect("course");
        assert!(stored.has_student(&student));
    }
}

#[then("the queue holds {count} enrollment confirmations")]
fn the_queue_holds_enrollment_confirmations(world: &CheckoutWorld, count: usize) {
    let queue = world.queue.get().expect("queue");
    assert_eq!(queue.confirmations(), count);
}

#[then("every course reports status {status}")]
fn every_course_reports_status(world: &CheckoutWorld, status: String) {
    let report = world.last_verification().expect("payment should verify");
    assert_eq!(report.courses.len(), 2);
    for entry in &report.courses {
        let actual = serde_json::to_value(entry.status).expect("status json");
        assert_eq!(actual, status.trim_matches('"'));
    }
}

// -----------------------------------------------------------------------------
// Scenarios
// -----------------------------------------------------------------------------

#[scenario(
    path = "tests/features/checkout_enrollment.feature",
    name = "Order total covers every selected course"
)]
fn order_total_covers_every_selected_course(world: CheckoutWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/checkout_enrollment.feature",
    name = "Ordering a course the student already owns is refused"
)]
fn ordering_an_owned_course_is_refused(world: CheckoutWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/checkout_enrollment.feature",
    name = "A tampered signature grants nothing"
)]
fn a_tampered_signature_grants_nothing(world: CheckoutWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/checkout_enrollment.feature",
    name = "A genuine payment enrolls the student in every course"
)]
fn a_genuine_payment_enrolls_the_student(world: CheckoutWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/checkout_enrollment.feature",
    name = "Replaying a genuine payment does not duplicate progress"
)]
fn replaying_a_genuine_payment_does_not_duplicate_progress(world: CheckoutWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/checkout_enrollment.feature",
    name = "A paid order cannot be redeemed for other courses"
)]
fn a_paid_order_cannot_be_redeemed_for_other_courses(world: CheckoutWorld) {
    let _ = world;
}
