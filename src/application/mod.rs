//! Application layer - Use cases and application services
//!
//! This module contains the services that orchestrate gateway calls and
//! payment state changes: authorisation, 3DS continuation, modifications,
//! notification reconciliation and credential checks.

pub mod services;
pub mod use_cases;

pub use services::*;
pub use use_cases::*;
