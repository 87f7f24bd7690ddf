//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via `diesel-async` and `bb8` connection pooling.
//!
//! - **Thin adapters**: repositories translate between Diesel rows and
//!   domain types. Business rules stay in the domain services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Redacted errors**: database failures become port errors with generic
//!   messages; raw driver text is only logged at debug level.
//!
//! # Example
//!
//! ```ignore
//! use eduquest::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/eduquest")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_category_repository;
mod diesel_course_repository;
mod diesel_enrollment_ledger;
mod diesel_error_mapping;
mod diesel_progress_repository;
mod diesel_rating_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_category_repository::DieselCategoryRepository;
pub use diesel_course_repository::DieselCourseRepository;
pub use diesel_enrollment_ledger::DieselEnrollmentLedger;
pub use diesel_progress_repository::DieselProgressRepository;
pub use diesel_rating_repository::DieselRatingRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
