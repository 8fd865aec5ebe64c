//! `MovieForm` - record payload sent as `multipart/form-data`.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};

/// MIME type used when the file extension is not recognised.
const FALLBACK_MIME: &str = "application/octet-stream";

/// A file attached to a form field (e.g. the poster image).
#[derive(Clone, PartialEq, Eq)]
pub struct FilePart {
    /// File name reported in the `Content-Disposition` header.
    pub file_name: String,
    /// MIME type of the content.
    pub mime: String,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl FilePart {
    /// Creates a file part from in-memory content.
    #[must_use]
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Reads a file from disk, guessing the MIME type from its extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the path has no
    /// UTF-8 file name.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(String::from)
            .with_context(|| format!("path has no file name: {}", path.display()))?;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;

        Ok(Self::new(file_name, guess_mime(path), bytes))
    }
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Guesses an image MIME type from the file extension.
fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => FALLBACK_MIME,
    }
}

/// Value of a single form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    /// Plain text field.
    Text(String),
    /// File upload field.
    File(FilePart),
}

/// Movie record payload.
///
/// An ordered field-name to value mapping. Setting a field that already
/// exists replaces its value in place. No schema is enforced; the backend
/// validates the record.
#[derive(Debug, Clone, Default, PartialEq)]
#[allow(clippy::module_name_repetitions)]
pub struct MovieForm {
    fields: Vec<(String, FormValue)>,
}

impl MovieForm {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `title` field.
    #[must_use]
    pub fn title(self, title: impl Into<String>) -> Self {
        self.text("title", title)
    }

    /// Sets the `genre` field.
    #[must_use]
    pub fn genre(self, genre: impl Into<String>) -> Self {
        self.text("genre", genre)
    }

    /// Sets the `director` field.
    #[must_use]
    pub fn director(self, director: impl Into<String>) -> Self {
        self.text("director", director)
    }

    /// Sets the `release_year` field.
    #[must_use]
    pub fn release_year(self, year: i32) -> Self {
        self.text("release_year", year.to_string())
    }

    /// Sets the `rating` field.
    #[must_use]
    pub fn rating(self, rating: f64) -> Self {
        self.text("rating", rating.to_string())
    }

    /// Attaches the `poster` image.
    #[must_use]
    pub fn poster(self, poster: FilePart) -> Self {
        self.file("poster", poster)
    }

    /// Sets an arbitrary text field.
    #[must_use]
    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name.into(), FormValue::Text(value.into()))
    }

    /// Sets an arbitrary file field.
    #[must_use]
    pub fn file(self, name: impl Into<String>, part: FilePart) -> Self {
        self.set(name.into(), FormValue::File(part))
    }

    /// Returns the value of a field, if set.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Returns the fields in insertion order.
    #[must_use]
    pub fn fields(&self) -> &[(String, FormValue)] {
        &self.fields
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn set(mut self, name: String, value: FormValue) -> Self {
        if let Some(slot) = self.fields.iter_mut().find(|(field, _)| *field == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
        self
    }

    /// Encodes the fields as a multipart body.
    ///
    /// # Errors
    ///
    /// Returns an error if a file part carries an invalid MIME type.
    pub(crate) fn into_multipart(self) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = match value {
                FormValue::Text(text) => form.text(name, text),
                FormValue::File(file) => {
                    let part = Part::bytes(file.bytes)
                        .file_name(file.file_name)
                        .mime_str(&file.mime)
                        .with_context(|| format!("invalid MIME type for field {name}"))?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}
