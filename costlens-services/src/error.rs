//! Registry error types.

use thiserror::Error;

/// Errors raised by the [`ServiceRegistry`](crate::ServiceRegistry).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A plugin with this slug is already registered.
    #[error("Duplicate service slug: {slug}")]
    DuplicateSlug {
        /// The colliding slug.
        slug: String,
    },

    /// No plugin matches the query.
    #[error("Service not found: {query}")]
    NotFound {
        /// What was looked up.
        query: String,
    },
}
