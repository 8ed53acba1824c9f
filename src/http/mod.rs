//! HTTP Module
//!
//! Thin REST facade over a [`Tree`](crate::Tree).
//!
//! ## Routes
//! - `POST /command/{key}`: body becomes the value (`Tree::put`)
//! - `GET  /query/{key}`:   newest value (`Tree::get`)
//! - `GET  /health`:        liveness
//!
//! ## Envelopes
//! ```text
//! 200  {"meta":{"key":"k"},"command":"v"}
//! 200  {"meta":{"key":"k"},"query":"v"}
//! 4xx  {"meta":{"code":"404","error":"Key not found"}}
//! ```

mod handlers;
mod response;
mod server;

pub use response::{ApiError, CommandResponse, ErrorMeta, ErrorResponse, KeyMeta, QueryResponse};
pub use server::{create_router, serve, serve_with_shutdown, AppState};
