//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations: persisting the authenticated user, reading it
//! back, and guarding endpoints by role.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{AuthenticatedUser, Error, UserId, UserRole};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ROLE_KEY: &str = "role";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id and role in the session cookie.
    pub fn persist_user(&self, user: &AuthenticatedUser) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user.id.to_string())
            .and_then(|()| self.0.insert(ROLE_KEY, user.role.as_str()))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current user from the session, if present and well formed.
    pub fn user(&self) -> Result<Option<AuthenticatedUser>, Error> {
        let id = self.read(USER_ID_KEY)?;
        let role = self.read(ROLE_KEY)?;
        let (Some(raw_id), Some(raw_role)) = (id, role) else {
            return Ok(None);
        };
        match (UserId::new(&raw_id), raw_role.parse::<UserRole>()) {
            (Ok(id), Ok(role)) => Ok(Some(AuthenticatedUser { id, role })),
            _ => {
                tracing::warn!("invalid identity in session cookie");
                Ok(None)
            }
        }
    }

    /// Require an authenticated user or return `401 Unauthorized`.
    pub fn require_user(&self) -> Result<AuthenticatedUser, Error> {
        self.user()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Require an authenticated user holding `role`.
    ///
    /// Missing sessions are `401`; a different role is `403`.
    pub fn require_role(&self, role: UserRole) -> Result<AuthenticatedUser, Error> {
        let user = self.require_user()?;
        if user.role != role {
            return Err(Error::forbidden(not_a(role)));
        }
        Ok(user)
    }

    /// Drop every value and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }

    fn read(&self, key: &str) -> Result<Option<String>, Error> {
        self.0
            .get::<String>(key)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))
    }
}

fn not_a(role: UserRole) -> String {
    let name = role.as_str();
    let article = if name.starts_with(['A', 'E', 'I', 'O', 'U']) {
        "an"
    } else {
        "a"
    };
    format!("You are not {article} {name}")
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
