//! # Scribe Core
//!
//! The domain layer of the Scribe blog: posts, comments and tags, the ports
//! storage and mail adapters implement, and the small amount of real logic
//! the blog has (publication filtering, tag-overlap recommendations, trigram
//! search, pagination and form validation).
//! This crate has zero infrastructure dependencies.

pub mod domain;
pub mod editorial;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod publication;
pub mod search;
pub mod share;
pub mod similarity;

pub use error::{DomainError, RepoError};
