//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod catalogue_command;
mod catalogue_query;
mod category_repository;
mod course_repository;
mod enrollment_ledger;
mod login_service;
mod mail_sender;
mod notification_queue;
mod payment_command;
mod payment_gateway;
mod progress_repository;
mod progress_tracking;
mod rating_repository;
mod reviews;
mod user_account;
mod user_profile_query;
mod user_repository;

#[cfg(test)]
pub use catalogue_command::MockCatalogueCommand;
pub use catalogue_command::{AddSubsectionRequest, CatalogueCommand};
#[cfg(test)]
pub use catalogue_query::MockCatalogueQuery;
pub use catalogue_query::{CatalogueQuery, CategoryPage, CourseDetails, InstructorCourse};
#[cfg(test)]
pub use category_repository::MockCategoryRepository;
pub use category_repository::{CategoryRepository, CategoryRepositoryError};
#[cfg(test)]
pub use course_repository::MockCourseRepository;
pub use course_repository::{CourseRemoval, CourseRepository, CourseRepositoryError};
#[cfg(test)]
pub use enrollment_ledger::MockEnrollmentLedger;
pub use enrollment_ledger::{EnrollOutcome, EnrollmentLedger, EnrollmentLedgerError};
pub use login_service::{LoginService, SignupService};
#[cfg(test)]
pub use login_service::{MockLoginService, MockSignupService};
#[cfg(test)]
pub use mail_sender::MockMailSender;
pub use mail_sender::{DeliveryReceipt, FixtureMailSender, MailDeliveryError, MailSender};
#[cfg(test)]
pub use notification_queue::MockNotificationQueue;
pub use notification_queue::{
    FixtureNotificationQueue, NotificationQueue, NotificationQueueError,
};
#[cfg(test)]
pub use payment_command::MockPaymentCommand;
pub use payment_command::{PaymentCommand, PaymentReceiptRequest};
#[cfg(test)]
pub use payment_gateway::MockPaymentGateway;
pub use payment_gateway::{FixturePaymentGateway, PaymentGateway, PaymentGatewayError};
#[cfg(test)]
pub use progress_repository::MockProgressRepository;
pub use progress_repository::{CompletionOutcome, ProgressRepository, ProgressRepositoryError};
#[cfg(test)]
pub use progress_tracking::{MockProgressCommand, MockProgressQuery};
pub use progress_tracking::{ProgressCommand, ProgressQuery, ProgressView};
#[cfg(test)]
pub use rating_repository::MockRatingRepository;
pub use rating_repository::{RatingRepository, RatingRepositoryError};
#[cfg(test)]
pub use reviews::{MockReviewsCommand, MockReviewsQuery};
pub use reviews::{CourseRatings, ReviewsCommand, ReviewsQuery};
#[cfg(test)]
pub use user_account::MockUserAccountCommand;
pub use user_account::{ProfileChanges, UserAccountCommand};
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::{EnrolledCourse, UserProfile, UserProfileQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{
    AccountRemoval, NewUserRecord, ProfileRecord, UserCredentials, UserPersistenceError,
    UserRepository,
};
