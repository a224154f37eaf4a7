//! HTTP infrastructure module
//!
//! This module contains the webhook surface: server, routes, handlers and
//! the helpers that inject services into warp filters.

pub mod handlers;
pub mod routes;
pub mod server;
pub mod utils;

pub use handlers::*;
pub use server::HttpServer;
pub use utils::*;
