//! Worldpay gateway connector
//!
//! Authorises card and wallet payments against Worldpay, drives 3DS and the
//! soft-decline exemption retry, and reconciles asynchronous order
//! notifications into the platform's payment state.
//!
//! Payment state lives behind [`infrastructure::adapters::PaymentRepository`].
//! The bundled binary wires the in-memory implementation, which starts empty
//! and is lost on restart; a deployment that reconciles real payments must
//! provide a durable repository.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use config::AppConfig;
pub use shared::error::{AppError, AppResult};

/// Application result type
pub type Result<T> = std::result::Result<T, shared::error::AppError>;

#[cfg(test)]
mod tests;
