//! HTTP server layer.
//!
//! This module exposes the post lookup over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │                    GET /get_post_details                        │
//! │                                                                 │
//! │  ┌──────────────────────────┐  ┌─────────────────────────────┐  │
//! │  │        handlers          │  │           routes            │  │
//! │  │ (query → LookupService)  │  │ (CORS, panics, tracing)     │  │
//! │  └──────────────────────────┘  └─────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    health_handler, internal_error_response, panic_response, post_details_handler, AppState,
    HealthResponse,
};
pub use routes::{create_router, RouterConfig};
