//! HTTP client library for the movies REST API.
//!
//! Exposes list/retrieve/create/update/delete against the `movies/`
//! resource of a Django REST backend.

/// Movies resource client.
pub mod movies;
