//! Driving port for account holders changing or closing their account.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Profile edits. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccountCommand: Send + Sync {
    /// Apply profile edits for `user` and return the stored result.
    async fn update_profile(&self, user: &UserId, changes: ProfileChanges)
    -> Result<User, Error>;

    /// Close the account. Instructors must delete their courses first.
    async fn delete_account(&self, user: &UserId) -> Result<(), Error>;
}
