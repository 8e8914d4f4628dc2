//! HTTP middleware for axum.
//!
//! This module contains middleware layers for cross-cutting concerns:
//!
//! - `client_ip` - client address extraction from proxy headers
//! - `rate_limit` - per-route fixed-window quotas
//! - `origin` - Origin/Referer allow-list

pub mod client_ip;
pub mod origin;
pub mod rate_limit;

pub use client_ip::{extract_client_ip, ClientIp, UNKNOWN_CLIENT};
pub use origin::{origin_middleware, request_origin, OriginGuard};
pub use rate_limit::{rate_limit_middleware, RateLimitGuard};
