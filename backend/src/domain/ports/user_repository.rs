//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{EmailAddress, PasswordHash, PersonName, User, UserId, UserRole};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses this e-mail.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// Account row written at signup.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub id: UserId,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub role: UserRole,
    pub password_hash: PasswordHash,
}

/// A user together with their stored password hash.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: PasswordHash,
}

/// Validated profile fields written by [`UserRepository::update_profile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
}

/// Outcome of [`UserRepository::delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRemoval {
    /// The account and its enrollments, progress and ratings are gone.
    Removed,
    NotFound,
    /// The user still authors courses, so the account was kept.
    OwnsCourses,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. E-mail uniqueness is enforced by the store.
    async fn create(&self, record: &NewUserRecord) -> Result<User, UserPersistenceError>;

    /// Fetch a user, including enrolled courses, by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user and password hash by normalised e-mail.
    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserCredentials>, UserPersistenceError>;

    /// Overwrite name and e-mail. Returns `false` when the user is absent;
    /// an e-mail owned by another account is `DuplicateEmail`.
    async fn update_profile(
        &self,
        id: &UserId,
        profile: &ProfileRecord,
    ) -> Result<bool, UserPersistenceError>;

    /// Delete an account that authors no courses, cascading to its
    /// enrollments, progress records and ratings.
    async fn delete(&self, id: &UserId) -> Result<AccountRemoval, UserPersistenceError>;
}
