//! `MovieApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::form::MovieForm;
use super::types::{Movie, MovieId};

/// Movies resource API trait.
///
/// Abstracts the five CRUD operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(MovieApi: Send)]
pub trait LocalMovieApi {
    /// Lists all movies (`GET movies/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the server responds with
    /// a non-2xx status, or JSON parsing fails.
    async fn list(&self) -> Result<Vec<Movie>>;

    /// Retrieves a single movie (`GET movies/{id}/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the server responds with
    /// a non-2xx status, or JSON parsing fails.
    async fn retrieve(&self, id: &MovieId) -> Result<Movie>;

    /// Creates a movie from a multipart payload (`POST movies/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the server responds with
    /// a non-2xx status, or JSON parsing fails.
    async fn create(&self, form: MovieForm) -> Result<Movie>;

    /// Replaces a movie with a multipart payload (`PUT movies/{id}/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the server responds with
    /// a non-2xx status, or JSON parsing fails.
    async fn update(&self, id: &MovieId, form: MovieForm) -> Result<Movie>;

    /// Deletes a movie (`DELETE movies/{id}/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails or the server responds
    /// with a non-2xx status.
    async fn delete(&self, id: &MovieId) -> Result<()>;
}
