//! Movies resource client module.
//!
//! Maps list/retrieve/create/update/delete onto the backend's
//! `movies/` and `movies/{id}/` endpoints.

mod api;
mod client;
mod form;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalMovieApi, MovieApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{DEFAULT_BASE_URL, MovieClient, MovieClientBuilder};
pub use form::{FilePart, FormValue, MovieForm};
pub use types::{Movie, MovieId};
