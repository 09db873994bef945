//! URL shortener service implementation.
//!
//! This crate wires a [`UrlStore`](stubby_core::UrlStore) and a
//! [`CodeGenerator`](stubby_generator::CodeGenerator) into the
//! [`Shortener`](stubby_core::Shortener) operations. Core types are
//! re-exported from `stubby_core`.

pub mod service;
pub mod settings;

pub use service::ShortenerService;
pub use settings::ShortenerSettings;
pub use stubby_core::{Shortener, ShortenerError};
