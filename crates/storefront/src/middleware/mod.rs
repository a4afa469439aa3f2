//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Request ID (record `x-request-id` in the span, echo it back)
//! 4. Security headers (CSP, frame, referrer)
//! 5. Session layer (tower-sessions with an in-memory store)
//! 6. Auth session restore (token refresh, deferred profile fetch)
//! 7. Rate limiting on auth form posts (governor)

pub mod auth;
pub mod page;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    AuthRejection, OptionalAuth, RequireAdmin, RequireAuth, clear_auth_state,
    restore_auth_session, set_auth_state,
};
pub use page::PageContext;
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
