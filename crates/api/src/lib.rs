//! HTTP API layer for finboard.
//!
//! - **Endpoints**: auth, account lifecycle, admin moderation, inquiries, board,
//!   assets, push subscriptions and the cron sweeps
//! - **Extractors**: session claims
//! - **Middleware**: session decoding and the suspension gate
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod suspension_cache;

pub use endpoints::router;
pub use middleware::{AppState, GateMode};
pub use suspension_cache::SuspensionCache;
