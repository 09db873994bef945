//! Core types and traits for the Stubby URL shortener.
//!
//! This crate provides the domain model shared by the generator, the
//! storage backends, the shortener service and the HTTP gateway.

pub mod error;
pub mod mapping;
pub mod page;
pub mod shortcode;
pub mod shortener;
pub mod store;

pub use error::{CoreError, ShortenerError, StorageError};
pub use mapping::{NewUrlMapping, UrlMapping};
pub use page::{Page, PageRequest, MAX_PAGE_SIZE};
pub use shortcode::{ShortCode, ALPHABET, SHORT_CODE_LENGTH};
pub use shortener::Shortener;
pub use store::{InsertOutcome, UrlStore};
