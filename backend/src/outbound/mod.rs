//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: in-process store implementing the same repository ports
//! - **gateway**: reqwest client for the payment gateway
//! - **mail**: transactional mail senders
//! - **queue**: bounded channel feeding the notification worker
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business rules.

pub mod gateway;
pub mod mail;
pub mod memory;
pub mod persistence;
pub mod queue;
