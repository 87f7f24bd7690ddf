//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod catalogue;
pub mod dto;
pub mod error;
pub mod health;
pub mod payments;
pub mod progress;
pub mod ratings;
pub mod response;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;
