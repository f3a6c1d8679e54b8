//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, transport layers)
//!     → pipeline.rs (chaos latency, timing, panic capture, metrics)
//!     → handlers.rs / chaos::control (business and control endpoints)
//!     → error.rs (typed rejections → JSON)
//! ```

pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod server;

pub use server::{build_router, AppState, HttpServer};
