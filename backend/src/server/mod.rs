//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppSettings, ServerConfig};

use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use eduquest::Trace;
#[cfg(debug_assertions)]
use eduquest::doc::ApiDoc;
use eduquest::inbound::http::auth::{login, logout, signup};
use eduquest::inbound::http::catalogue::{
    add_section, add_subsection, category_page, course_details, create_category, create_course,
    delete_course, delete_section, delete_subsection, edit_course, instructor_courses,
    list_categories, list_courses, set_course_status, update_section, update_subsection,
};
use eduquest::inbound::http::health::{HealthState, live, ready};
use eduquest::inbound::http::payments::{capture_payment, send_payment_receipt, verify_payment};
use eduquest::inbound::http::progress::{course_progress, mark_complete};
use eduquest::inbound::http::ratings::{all_ratings, course_ratings, rate_course};
use eduquest::inbound::http::state::HttpState;
use eduquest::inbound::http::users::{current_user, delete_account, update_profile};
use eduquest::inbound::http::validation::json_config;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

/// Register every `/api/v1` handler.
fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(signup)
        .service(login)
        .service(logout)
        .service(current_user)
        .service(update_profile)
        .service(delete_account)
        .service(list_categories)
        .service(create_category)
        .service(category_page)
        .service(list_courses)
        .service(create_course)
        .service(instructor_courses)
        .service(course_details)
        .service(edit_course)
        .service(delete_course)
        .service(set_course_status)
        .service(add_section)
        .service(update_section)
        .service(delete_section)
        .service(add_subsection)
        .service(update_subsection)
        .service(delete_subsection)
        .service(course_ratings)
        .service(rate_course)
        .service(all_ratings)
        .service(course_progress)
        .service(mark_complete)
        .service(capture_payment)
        .service(verify_payment)
        .service(send_payment_receipt);
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1").wrap(session).configure(api_routes);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: pre-built [`ServerConfig`] containing session, binding, storage and
///   integration settings.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when an outbound client cannot be built or
/// binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(
        build_http_state(&config)
            .map_err(|err| std::io::Error::other(format!("application state: {err}")))?,
    );
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
        integrations: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
