//! Account signup and password login.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use super::port_errors::map_user_error;
use super::ports::{LoginService, NewUserRecord, SignupService, UserRepository};
use super::{AuthenticatedUser, Error, LoginCredentials, PasswordHash, SignupRequest, User, UserId};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Password-based authentication over a [`UserRepository`].
#[derive(Clone)]
pub struct PasswordAuthService {
    users: Arc<dyn UserRepository>,
}

impl PasswordAuthService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl LoginService for PasswordAuthService {
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedUser, Error> {
        let Some(stored) = self
            .users
            .find_credentials(credentials.email())
            .await
            .map_err(map_user_error)?
        else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        if !stored.password_hash.verify(credentials.password()) {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(AuthenticatedUser {
            id: stored.user.id(),
            role: stored.user.role(),
        })
    }
}

#[async_trait]
impl SignupService for PasswordAuthService {
    async fn signup(&self, request: &SignupRequest) -> Result<User, Error> {
        let password_hash = PasswordHash::hash(request.password()).map_err(|err| {
            error!(error = %err, "password hashing failed");
            Error::internal("could not create account")
        })?;
        let record = NewUserRecord {
            id: UserId::random(),
            first_name: request.first_name().clone(),
            last_name: request.last_name().clone(),
            email: request.email().clone(),
            role: request.role(),
            password_hash,
        };
        let user = self.users.create(&record).await.map_err(map_user_error)?;
        info!(user_id = %user.id(), role = %user.role(), "account created");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{MockUserRepository, UserCredentials, UserPersistenceError};
    use crate::domain::service_test_helpers::user;
    use crate::domain::{ErrorCode, SignupParts, UserRole};

    fn credentials(password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts("ada@example.com", password).expect("credentials")
    }

    fn stored(password: &str) -> UserCredentials {
        UserCredentials {
            user: user(UserId::random(), UserRole::Instructor, Vec::new()),
            password_hash: PasswordHash::hash(password).expect("hash"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn correct_password_authenticates() {
        let record = stored("correct horse");
        let expected = record.user.id();
        let mut users = MockUserRepository::new();
        users
            .expect_find_credentials()
            .times(1)
            .return_once(move |_| Ok(Some(record)));

        let auth = PasswordAuthService::new(Arc::new(users))
            .authenticate(&credentials("correct horse"))
            .await
            .expect("authenticated");

        assert_eq!(auth.id, expected);
        assert_eq!(auth.role, UserRole::Instructor);
    }

    #[rstest]
    #[case(Some("another one"))]
    #[case(None)]
    #[tokio::test]
    async fn wrong_password_and_unknown_email_fail_alike(#[case] stored_password: Option<&str>) {
        let record = stored_password.map(stored);
        let mut users = MockUserRepository::new();
        users
            .expect_find_credentials()
            .return_once(move |_| Ok(record));

        let error = PasswordAuthService::new(Arc::new(users))
            .authenticate(&credentials("correct horse"))
            .await
            .expect_err("rejected");

        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.message(), INVALID_CREDENTIALS);
    }

    fn signup_request() -> SignupRequest {
        SignupRequest::try_from_parts(SignupParts {
            first_name: "Ada",
            last_name: "Lovelace",
            email: "Ada@Example.com",
            password: "correct horse",
            confirm_password: "correct horse",
            account_type: UserRole::Student,
        })
        .expect("signup")
    }

    #[rstest]
    #[tokio::test]
    async fn signup_stores_a_hash_not_the_password() {
        let mut users = MockUserRepository::new();
        users
            .expect_create()
            .withf(|record| {
                record.email.as_ref() == "ada@example.com"
                    && record.password_hash.as_str() != "correct horse"
                    && record.password_hash.verify("correct horse")
            })
            .times(1)
            .returning(|record| {
                Ok(user(record.id, record.role, Vec::new()))
            });

        let created = PasswordAuthService::new(Arc::new(users))
            .signup(&signup_request())
            .await
            .expect("created");

        assert_eq!(created.role(), UserRole::Student);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let mut users = MockUserRepository::new();
        users
            .expect_create()
            .return_once(|_| Err(UserPersistenceError::duplicate_email("ada@example.com")));

        let error = PasswordAuthService::new(Arc::new(users))
            .signup(&signup_request())
            .await
            .expect_err("conflict");

        assert_eq!(error.code(), ErrorCode::Conflict);
    }
}
