//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};
use serde::{Deserialize, Serialize};

use crate::Trace;
use crate::domain::ports::{
    MockCatalogueCommand, MockCatalogueQuery, MockLoginService, MockPaymentCommand,
    MockProgressCommand, MockProgressQuery, MockReviewsCommand, MockReviewsQuery,
    MockSignupService, MockUserAccountCommand, MockUserProfileQuery,
};
use crate::domain::{AuthenticatedUser, Error, UserId, UserRole};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::validation::json_config;

const TEST_LOGIN_PATH: &str = "/__test/login";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// One mock per driving port; unset expectations panic when called.
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub signup: MockSignupService,
    pub profile: MockUserProfileQuery,
    pub account: MockUserAccountCommand,
    pub catalogue: MockCatalogueCommand,
    pub catalogue_query: MockCatalogueQuery,
    pub reviews: MockReviewsCommand,
    pub reviews_query: MockReviewsQuery,
    pub progress: MockProgressCommand,
    pub progress_query: MockProgressQuery,
    pub payments: MockPaymentCommand,
}

impl MockPorts {
    pub fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            login: Arc::new(self.login),
            signup: Arc::new(self.signup),
            profile: Arc::new(self.profile),
            account: Arc::new(self.account),
            catalogue: Arc::new(self.catalogue),
            catalogue_query: Arc::new(self.catalogue_query),
            reviews: Arc::new(self.reviews),
            reviews_query: Arc::new(self.reviews_query),
            progress: Arc::new(self.progress),
            progress_query: Arc::new(self.progress_query),
            payments: Arc::new(self.payments),
        })
    }
}

#[derive(Serialize, Deserialize)]
struct TestIdentity {
    id: UserId,
    role: UserRole,
}

async fn test_login(
    session: SessionContext,
    identity: web::Json<TestIdentity>,
) -> Result<HttpResponse, Error> {
    let TestIdentity { id, role } = identity.into_inner();
    session.persist_user(&AuthenticatedUser { id, role })?;
    Ok(HttpResponse::NoContent().finish())
}

/// App with `/api/v1` routes registered by `routes`, a session and the trace
/// middleware, plus a private endpoint that signs a session in.
pub fn test_app<F>(
    ports: MockPorts,
    routes: F,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    F: FnOnce(&mut web::ServiceConfig),
{
    App::new()
        .app_data(web::Data::new(ports.into_state()))
        .app_data(json_config())
        .wrap(Trace)
        .service(
            web::scope("/api/v1")
                .wrap(test_session_middleware())
                .route(TEST_LOGIN_PATH, web::post().to(test_login))
                .configure(routes),
        )
}

/// Sign in as `id` with `role` and return the session cookie.
pub async fn login_as<S>(app: &S, id: UserId, role: UserRole) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = test::TestRequest::post()
        .uri(&format!("/api/v1{TEST_LOGIN_PATH}"))
        .set_json(TestIdentity { id, role })
        .to_request();
    let response = test::call_service(app, request).await;
    assert!(response.status().is_success(), "test login failed");
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}
