//! HTTP gateway for the Stubby URL shortener.
//!
//! The router is exposed as a library so it can be exercised in-process;
//! the `stubby-gateway` binary only adds configuration and a listener.

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use state::AppState;
