//! Upstream HTTP module.
//!
//! This module provides:
//! - The `HttpClient` capability providers call through
//! - A reqwest-backed production client
//! - Upstream response types

pub mod client;
#[cfg(test)]
pub(crate) mod stub;
pub mod types;

pub use client::{HttpClient, HttpRequest, HttpResponse, Method, ReqwestClient};
pub use types::*;
