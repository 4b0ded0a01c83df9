//! Web layer for satchel.
//!
//! Serves the homepage and the upload, listing and download endpoints over
//! HTTP using axum.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::{create_app, create_router};
pub use server::WebServer;
