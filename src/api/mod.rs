//! API Module
//!
//! HTTP handlers and routing for the discovery REST API.
//!
//! # Endpoints
//! - `GET /repositories` - Search and score repositories
//! - `GET /rate-limit` - Shared rate limiter status
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
