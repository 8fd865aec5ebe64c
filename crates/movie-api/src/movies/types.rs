//! Movie record and identifier types.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of a movie record.
///
/// Opaque to the client: numeric and string ids are both accepted and
/// interpolated verbatim into the request path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MovieId(String);

impl MovieId {
    /// Creates an identifier from its literal text.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the literal text of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MovieId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl Serialize for MovieId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MovieId {
    /// Accepts a JSON number or string.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Unsigned(u64),
            Signed(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Unsigned(id) => Self::from(id),
            RawId::Signed(id) => Self::from(id),
            RawId::Text(id) => Self::from(id),
        })
    }
}

impl From<&str> for MovieId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MovieId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u32> for MovieId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for MovieId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for MovieId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// A movie record as returned by the backend.
///
/// Every field is optional. A successful response is decoded as far as it
/// goes; absent or `null` fields become `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Movie {
    /// Backend-assigned primary key.
    pub id: Option<MovieId>,
    /// Title.
    pub title: Option<String>,
    /// Genre.
    pub genre: Option<String>,
    /// Director.
    pub director: Option<String>,
    /// Release year.
    pub release_year: Option<i32>,
    /// Rating score.
    pub rating: Option<f64>,
    /// Absolute URL of the uploaded poster image.
    pub poster: Option<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Movie {
    /// Returns the identifier used to address this record, if the backend sent one.
    #[must_use]
    pub const fn movie_id(&self) -> Option<&MovieId> {
        self.id.as_ref()
    }
}
