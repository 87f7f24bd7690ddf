//! Builders wiring repositories, integrations and services into [`HttpState`].

use std::sync::Arc;

use mockable::DefaultClock;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use eduquest::domain::ports::{
    CategoryRepository, CourseRepository, EnrollmentLedger, FixturePaymentGateway, MailSender,
    NotificationQueue, PaymentGateway, ProgressRepository, RatingRepository, UserRepository,
};
use eduquest::domain::{
    CatalogueService, EnrollmentCoordinator, NotificationWorker, OrderIntentBuilder,
    PasswordAuthService, PaymentService, PaymentVerifier, ProfileService, ProgressService,
    ReviewService, SignatureVerifier, SigningKeyError, SigningSecret,
};
use eduquest::inbound::http::state::{HttpState, HttpStatePorts};
use eduquest::outbound::gateway::{GatewayBuildError, GatewayCredentials, RazorpayGateway};
use eduquest::outbound::mail::{HttpMailSender, LoggingMailSender};
use eduquest::outbound::memory::MemoryStore;
use eduquest::outbound::persistence::{
    DbPool, DieselCategoryRepository, DieselCourseRepository, DieselEnrollmentLedger,
    DieselProgressRepository, DieselRatingRepository, DieselUserRepository,
};
use eduquest::outbound::queue::ChannelNotificationQueue;

use super::ServerConfig;
use super::config::IntegrationConfig;

/// Failures while assembling the application state.
#[derive(Debug, Error)]
pub enum StateBuildError {
    #[error(transparent)]
    Gateway(#[from] GatewayBuildError),
    #[error("could not build mail client: {0}")]
    Mail(#[from] reqwest::Error),
    #[error(transparent)]
    Signing(#[from] SigningKeyError),
}

/// Ledger store ports backed by one storage engine.
struct Repositories {
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
    courses: Arc<dyn CourseRepository>,
    ledger: Arc<dyn EnrollmentLedger>,
    progress: Arc<dyn ProgressRepository>,
    ratings: Arc<dyn RatingRepository>,
}

impl Repositories {
    fn diesel(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            categories: Arc::new(DieselCategoryRepository::new(pool.clone())),
            courses: Arc::new(DieselCourseRepository::new(pool.clone())),
            ledger: Arc::new(DieselEnrollmentLedger::new(pool.clone())),
            progress: Arc::new(DieselProgressRepository::new(pool.clone())),
            ratings: Arc::new(DieselRatingRepository::new(pool.clone())),
        }
    }

    fn in_memory() -> Self {
        let store = MemoryStore::new();
        Self {
            users: Arc::new(store.clone()),
            categories: Arc::new(store.clone()),
            courses: Arc::new(store.clone()),
            ledger: Arc::new(store.clone()),
            progress: Arc::new(store.clone()),
            ratings: Arc::new(store),
        }
    }
}

/// Choose the gateway adapter and the secret that signs its callbacks.
fn build_gateway(
    integrations: &IntegrationConfig,
) -> Result<(Arc<dyn PaymentGateway>, SigningSecret), StateBuildError> {
    match &integrations.gateway {
        Some(gateway) => {
            let adapter = RazorpayGateway::new(
                &gateway.base_url,
                GatewayCredentials {
                    key_id: gateway.key_id.clone(),
                    key_secret: gateway.key_secret.clone(),
                },
                gateway.timeout,
            )?;
            Ok((Arc::new(adapter), gateway.key_secret.clone()))
        }
        None => {
            warn!("payment gateway not configured; using fixture orders and an ephemeral signing secret");
            Ok((
                Arc::new(FixturePaymentGateway::default()),
                SigningSecret::new(Uuid::new_v4().simple().to_string()),
            ))
        }
    }
}

fn build_mail_sender(integrations: &IntegrationConfig) -> Result<Arc<dyn MailSender>, StateBuildError> {
    match &integrations.mail {
        Some(mail) => Ok(Arc::new(HttpMailSender::new(
            mail.endpoint.clone(),
            mail.token.clone(),
            integrations.mail_from.clone(),
            integrations.mail_timeout,
        )?)),
        None => {
            warn!("mail API not configured; notifications are logged only");
            Ok(Arc::new(LoggingMailSender))
        }
    }
}

/// Build the HTTP state from configuration.
///
/// Uses Diesel repositories when a pool is configured and the in-memory
/// store otherwise. Spawns the notification worker on the current runtime;
/// it stops when the last queue handle is dropped.
///
/// # Errors
/// Returns [`StateBuildError`] when an outbound client cannot be built.
pub(super) fn build_http_state(config: &ServerConfig) -> Result<HttpState, StateBuildError> {
    let repos = match &config.db_pool {
        Some(pool) => Repositories::diesel(pool),
        None => Repositories::in_memory(),
    };
    let integrations = &config.integrations;
    let (gateway, secret) = build_gateway(integrations)?;
    let mail = build_mail_sender(integrations)?;

    let worker = NotificationWorker::new(repos.users.clone(), mail, integrations.mail_timeout);
    let (queue, _worker) = ChannelNotificationQueue::spawn(worker, integrations.queue_capacity);
    let notifications: Arc<dyn NotificationQueue> = Arc::new(queue);

    let payments = Arc::new(PaymentService::new(
        OrderIntentBuilder::new(
            repos.courses.clone(),
            gateway.clone(),
            integrations.currency.clone(),
        ),
        PaymentVerifier::new(
            SignatureVerifier::new(&secret)?,
            gateway,
            EnrollmentCoordinator::new(repos.ledger.clone(), notifications.clone()),
        ),
        repos.users.clone(),
        notifications,
    ));
    let auth = Arc::new(PasswordAuthService::new(repos.users.clone()));
    let catalogue = Arc::new(CatalogueService::new(
        repos.categories.clone(),
        repos.courses.clone(),
        repos.ratings.clone(),
        Arc::new(DefaultClock),
    ));
    let reviews = Arc::new(ReviewService::new(
        repos.courses.clone(),
        repos.ratings.clone(),
        Arc::new(DefaultClock),
    ));
    let progress = Arc::new(ProgressService::new(
        repos.courses.clone(),
        repos.progress.clone(),
    ));
    let profile = Arc::new(ProfileService::new(
        repos.users.clone(),
        repos.courses.clone(),
        repos.progress.clone(),
    ));

    Ok(HttpState::new(HttpStatePorts {
        login: auth.clone(),
        signup: auth,
        profile: profile.clone(),
        account: profile,
        catalogue: catalogue.clone(),
        catalogue_query: catalogue,
        reviews: reviews.clone(),
        reviews_query: reviews,
        progress: progress.clone(),
        progress_query: progress,
        payments,
    }))
}
