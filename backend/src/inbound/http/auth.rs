//! Account endpoints: signup, login and logout.
//!
//! ```text
//! POST /api/v1/auth/signup {"firstName":"Ada","lastName":"Lovelace",...}
//! POST /api/v1/auth/login  {"email":"ada@example.com","password":"..."}
//! POST /api/v1/auth/logout
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    Error, LoginCredentials, LoginValidationError, SignupParts, SignupRequest,
    SignupValidationError, UserRole, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{SessionUserDto, UserDto};
use crate::inbound::http::response::{Envelope, message_only};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::invalid_field_error;

/// Signup request body for `POST /api/v1/auth/signup`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupBody {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub account_type: UserRole,
}

impl TryFrom<&SignupBody> for SignupRequest {
    type Error = SignupValidationError;

    fn try_from(value: &SignupBody) -> Result<Self, Self::Error> {
        Self::try_from_parts(SignupParts {
            first_name: &value.first_name,
            last_name: &value.last_name,
            email: &value.email,
            password: &value.password,
            confirm_password: &value.confirm_password,
            account_type: value.account_type,
        })
    }
}

/// Login request body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

impl TryFrom<&LoginBody> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: &LoginBody) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

fn map_signup_validation_error(err: SignupValidationError) -> Error {
    let field = match &err {
        SignupValidationError::User(
            UserValidationError::EmptyEmail | UserValidationError::InvalidEmail,
        ) => "email",
        SignupValidationError::User(
            UserValidationError::EmptyName { field } | UserValidationError::NameTooLong { field, .. },
        ) => *field,
        SignupValidationError::User(UserValidationError::UnknownRole)
        | SignupValidationError::AdminNotAllowed => "accountType",
        SignupValidationError::PasswordLength { .. } => "password",
        SignupValidationError::PasswordMismatch => "confirmPassword",
    };
    invalid_field_error(field, err.to_string())
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::InvalidEmail => Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "email", "code": "invalid_email" })),
        LoginValidationError::EmptyPassword => Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Create a Student or Instructor account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupBody,
    responses(
        (status = 201, description = "Account created", body = UserDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "E-mail already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/auth/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupBody>,
) -> ApiResult<HttpResponse> {
    let request = SignupRequest::try_from(&*payload).map_err(map_signup_validation_error)?;
    let user = state.signup.signup(&request).await?;
    Ok(Envelope::created(
        "User registered successfully",
        json!({ "user": UserDto::from(&user) }),
    ))
}

/// Authenticate and establish a session cookie.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Login success", body = SessionUserDto,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginBody>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(&*payload).map_err(map_login_validation_error)?;
    let user = state.login.authenticate(&credentials).await?;
    session.persist_user(&user)?;
    Ok(Envelope::ok(
        "User logged in successfully",
        json!({ "user": SessionUserDto::from(user) }),
    ))
}

/// Drop the session cookie.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "No active session", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.require_user()?;
    session.purge();
    Ok(message_only("Logged out successfully"))
}
