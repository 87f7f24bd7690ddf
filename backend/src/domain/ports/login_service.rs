//! Driving ports for account creation and authentication.
//!
//! In hexagonal terms these are *driving* ports: inbound adapters call them
//! to register or authenticate users without importing the backing
//! infrastructure.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, Error, LoginCredentials, SignupRequest, User};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated identity.
    ///
    /// Unknown e-mails and wrong passwords fail identically.
    async fn authenticate(&self, credentials: &LoginCredentials)
    -> Result<AuthenticatedUser, Error>;
}

/// Domain use-case port for self-service signup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignupService: Send + Sync {
    /// Create a Student or Instructor account.
    async fn signup(&self, request: &SignupRequest) -> Result<User, Error>;
}
