//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, plus the services that implement the driving ports.
//! Types stay immutable outside their constructors and document their
//! invariants and serialisation contracts in Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable error identifier.
//! - Catalogue, user, order, payment and enrollment types.
//! - Services: order intent builder, payment verifier, enrollment
//!   coordinator and the catalogue, review, progress, profile and auth
//!   use-cases.

pub mod auth;
pub mod catalogue;
pub mod enrollment;
pub mod error;
pub mod ids;
pub mod money;
pub mod notification;
pub mod order;
pub mod payment;
pub mod ports;
pub mod progress;
pub mod rating;
pub mod trace_id;
pub mod user;

mod auth_service;
mod catalogue_service;
mod enrollment_coordinator;
mod notification_worker;
mod order_intent_builder;
mod payment_service;
mod payment_verifier;
mod port_errors;
mod profile_service;
mod progress_service;
mod review_service;

#[cfg(test)]
pub(crate) mod service_test_helpers;

pub use self::auth::{
    AuthenticatedUser, LoginCredentials, LoginValidationError, PASSWORD_MAX, PASSWORD_MIN,
    PasswordHash, PasswordHashError, SignupParts, SignupRequest, SignupValidationError,
};
pub use self::auth_service::PasswordAuthService;
pub use self::catalogue::{
    CatalogueValidationError, Category, CategoryDraft, Course, CourseChanges, CourseDraft,
    CourseFilter, CourseOutline, CourseStatus, NewCourse, NewCourseParts, NewSection,
    NewSubsection, NewSubsectionParts, Section, SectionOutline, Subsection, SubsectionChanges,
};
pub use self::catalogue_service::CatalogueService;
pub use self::enrollment::{CourseEnrollment, EnrollmentReport, EnrollmentStatus};
pub use self::enrollment_coordinator::EnrollmentCoordinator;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{
    CategoryId, CourseId, IdValidationError, ReviewId, SectionId, SubsectionId, UserId,
};
pub use self::money::{Currency, Money, MoneyValidationError};
pub use self::notification::{EmailMessage, NotificationJob};
pub use self::notification_worker::{DeliveryFailure, NotificationWorker};
pub use self::order::{
    CourseSelection, GatewayOrder, OrderIntent, OrderRequest, OrderValidationError, ReceiptToken,
    order_total,
};
pub use self::order_intent_builder::OrderIntentBuilder;
pub use self::payment::{
    PaymentClaim, PaymentClaimError, SignatureVerifier, SigningKeyError, SigningSecret,
};
pub use self::payment_service::PaymentService;
pub use self::payment_verifier::PaymentVerifier;
pub use self::profile_service::ProfileService;
pub use self::progress::CourseProgress;
pub use self::progress_service::ProgressService;
pub use self::rating::{
    RatingScore, Review, ReviewSummary, ReviewValidationError, SCORE_MAX, average_rating,
    sort_by_score_desc,
};
pub use self::review_service::ReviewService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, PersonName, User, UserDraft, UserRole, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use eduquest::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
