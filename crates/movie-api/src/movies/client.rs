//! `MovieClient` - movies REST API client implementation.

use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use tracing::instrument;
use url::Url;

use super::api::MovieApi;
use super::form::MovieForm;
use super::types::{Movie, MovieId};

/// Default base URL of the movies backend.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/";

/// Default User-Agent.
const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Collection path, relative to the base URL.
const MOVIES_PATH: &str = "movies/";

/// Movies REST API client.
///
/// Base URL and default headers are fixed at build time. Each operation is
/// a single request; failures from `reqwest` are returned as-is, with one
/// context line naming the operation.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct MovieClient {
    /// HTTP client carrying the default JSON headers.
    http_client: Client,
    /// Base URL, always ending with `/`.
    base_url: Url,
}

/// Builder for `MovieClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct MovieClientBuilder {
    base_url: Option<Url>,
    user_agent: Option<String>,
}

impl MovieClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            user_agent: None,
        }
    }

    /// Overrides the base URL (default: `http://127.0.0.1:8000/api/`).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Overrides the User-Agent (default: `movie-api/<version>`).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - The default base URL fails to parse.
    /// - The User-Agent is not a valid header value.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<MovieClient> {
        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };
        let base_url = with_trailing_slash(base_url);

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| String::from(DEFAULT_USER_AGENT));

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .default_headers(headers)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(MovieClient {
            http_client,
            base_url,
        })
    }
}

/// Appends `/` to the URL path so relative joins stay under it.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

impl MovieClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> MovieClientBuilder {
        MovieClientBuilder::new()
    }

    /// Returns the base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the `movies/` collection.
    fn collection_url(&self) -> Result<Url> {
        self.base_url
            .join(MOVIES_PATH)
            .with_context(|| format!("failed to join URL path: {MOVIES_PATH}"))
    }

    /// URL of a single record, `movies/{id}/`.
    fn detail_url(&self, id: &MovieId) -> Result<Url> {
        let path = format!("{MOVIES_PATH}{id}/");
        self.base_url
            .join(&path)
            .with_context(|| format!("failed to join URL path: {path}"))
    }

    /// Executes a request and rejects non-2xx responses.
    async fn send(&self, operation: &str, builder: RequestBuilder) -> Result<Response> {
        let request = builder
            .build()
            .with_context(|| format!("failed to build {operation} request"))?;

        tracing::debug!(method = %request.method(), url = %request.url(), "movies API request");

        let result = self.http_client.execute(request).await;
        let response = result.with_context(|| format!("{operation} request failed"))?;

        let status = response.status();
        tracing::debug!(%operation, %status, "movies API response");

        let status_check = response.error_for_status_ref().map(|_| ());
        if let Err(err) = status_check {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<failed to read body>"));
            tracing::debug!(%operation, %status, %body, "movies API error body");
            return Err(anyhow::Error::new(err).context(format!("{operation} failed (HTTP {status})")));
        }

        Ok(response)
    }

    /// Reads the response body and decodes it as JSON.
    async fn decode<T: serde::de::DeserializeOwned>(
        operation: &str,
        response: Response,
    ) -> Result<T> {
        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read response body: {operation}"))?;
        tracing::debug!(%operation, body_len = body.len(), "movies API body received");

        let raw_result: std::result::Result<T, _> = serde_json::from_str(&body);
        raw_result.with_context(|| format!("failed to decode JSON response: {operation}"))
    }
}

impl MovieApi for MovieClient {
    #[instrument(skip_all)]
    async fn list(&self) -> Result<Vec<Movie>> {
        let url = self.collection_url()?;
        let response = self.send("list", self.http_client.get(url)).await?;
        Self::decode("list", response).await
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn retrieve(&self, id: &MovieId) -> Result<Movie> {
        let url = self.detail_url(id)?;
        let response = self.send("retrieve", self.http_client.get(url)).await?;
        Self::decode("retrieve", response).await
    }

    #[instrument(skip_all)]
    async fn create(&self, form: MovieForm) -> Result<Movie> {
        let url = self.collection_url()?;
        let multipart = form.into_multipart()?;
        let response = self
            .send("create", self.http_client.post(url).multipart(multipart))
            .await?;
        Self::decode("create", response).await
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn update(&self, id: &MovieId, form: MovieForm) -> Result<Movie> {
        let url = self.detail_url(id)?;
        let multipart = form.into_multipart()?;
        let response = self
            .send("update", self.http_client.put(url).multipart(multipart))
            .await?;
        Self::decode("update", response).await
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn delete(&self, id: &MovieId) -> Result<()> {
        let url = self.detail_url(id)?;
        self.send("delete", self.http_client.delete(url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use wiremock::matchers::{body_string_contains, header, header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::movies::FilePart;

    /// Builds a client pointed at the mock server's `/api/` prefix.
    fn client_for(server: &MockServer) -> MovieClient {
        let base_url = format!("{}/api/", server.uri());
        MovieClient::builder()
            .base_url(base_url.parse().unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_uses_default_base_url() {
        // Arrange & Act
        let client = MovieClient::builder().build().unwrap();

        // Assert
        assert_eq!(client.base_url().as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_builder_with_custom_base_url() {
        // Arrange
        let custom_url = Url::parse("http://localhost:9000/v2/").unwrap();

        // Act
        let client = MovieClient::builder()
            .base_url(custom_url.clone())
            .build()
            .unwrap();

        // Assert
        assert_eq!(client.base_url, custom_url);
    }

    #[test]
    fn test_builder_appends_trailing_slash() {
        // Arrange
        let url = Url::parse("http://localhost:9000/api").unwrap();

        // Act
        let client = MovieClient::builder().base_url(url).build().unwrap();

        // Assert
        assert_eq!(client.base_url().as_str(), "http://localhost:9000/api/");
        assert_eq!(
            client.collection_url().unwrap().as_str(),
            "http://localhost:9000/api/movies/"
        );
    }

    #[test]
    fn test_detail_url_interpolates_id_literally() {
        // Arrange
        let client = MovieClient::builder().build().unwrap();

        // Act
        let numeric = client.detail_url(&MovieId::from(42_u64)).unwrap();
        let text = client.detail_url(&MovieId::new("the-matrix")).unwrap();

        // Assert
        assert_eq!(numeric.as_str(), "http://127.0.0.1:8000/api/movies/42/");
        assert_eq!(text.as_str(), "http://127.0.0.1:8000/api/movies/the-matrix/");
    }

    #[test]
    fn test_builder_rejects_invalid_user_agent() {
        // Arrange & Act
        let result = MovieClient::builder().user_agent("bad\nagent").build();

        // Assert
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_via_http() {
        // Arrange
        let mock_server = MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/movies/list.json");

        Mock::given(method("GET"))
            .and(path("/api/movies/"))
            .and(header("Content-Type", "application/json"))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let movies = client.list().await.unwrap();

        // Assert
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].title.as_deref(), Some("Spirited Away"));
        assert_eq!(movies[1].id, Some(MovieId::from(8_u64)));
    }

    #[tokio::test]
    async fn test_list_accepts_partial_records() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/movies/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"id":1,"title":"X"},{}]"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let movies = client.list().await.unwrap();

        // Assert
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].id, Some(MovieId::from(1_u64)));
        assert_eq!(movies[0].title.as_deref(), Some("X"));
        assert!(movies[0].genre.is_none());
        assert!(movies[1].id.is_none());
    }

    #[tokio::test]
    async fn test_retrieve_accepts_partial_record() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/movies/3/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"title":"Only a title"}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let movie = client.retrieve(&MovieId::from(3_u64)).await.unwrap();

        // Assert
        assert_eq!(movie.title.as_deref(), Some("Only a title"));
        assert!(movie.id.is_none());
        assert!(movie.release_year.is_none());
    }

    #[tokio::test]
    async fn test_retrieve_via_http() {
        // Arrange
        let mock_server = MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/movies/movie_7.json");

        Mock::given(method("GET"))
            .and(path("/api/movies/7/"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let movie = client.retrieve(&MovieId::from(7_u64)).await.unwrap();

        // Assert
        assert_eq!(movie.id, Some(MovieId::from(7_u64)));
        assert_eq!(movie.director.as_deref(), Some("Hayao Miyazaki"));
    }

    #[tokio::test]
    async fn test_retrieve_with_string_id() {
        // Arrange
        let mock_server = MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/movies/movie_7.json");

        Mock::given(method("GET"))
            .and(path("/api/movies/spirited-away/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act & Assert (mock expect(1) verifies the path)
        client
            .retrieve(&MovieId::new("spirited-away"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_sends_multipart() {
        // Arrange
        let mock_server = MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/movies/created.json");

        Mock::given(method("POST"))
            .and(path("/api/movies/"))
            .and(header_regex("Content-Type", "^multipart/form-data; boundary="))
            .and(body_string_contains("name=\"title\""))
            .and(body_string_contains("Paprika"))
            .and(body_string_contains("filename=\"paprika.png\""))
            .respond_with(ResponseTemplate::new(201).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let form = MovieForm::new()
            .title("Paprika")
            .genre("Animation")
            .director("Satoshi Kon")
            .release_year(2006)
            .rating(7.7)
            .poster(FilePart::new(
                "paprika.png",
                "image/png",
                b"fake-png-bytes".to_vec(),
            ));

        // Act
        let created = client.create(form).await.unwrap();

        // Assert
        assert_eq!(created.id, Some(MovieId::from(9_u64)));
        assert_eq!(created.title.as_deref(), Some("Paprika"));
    }

    #[tokio::test]
    async fn test_update_sends_multipart() {
        // Arrange
        let mock_server = MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/movies/updated_7.json");

        Mock::given(method("PUT"))
            .and(path("/api/movies/7/"))
            .and(header_regex("Content-Type", "^multipart/form-data; boundary="))
            .and(body_string_contains("Sen to Chihiro no Kamikakushi"))
            .respond_with(ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let form = MovieForm::new().title("Sen to Chihiro no Kamikakushi");

        // Act
        let updated = client
            .update(&MovieId::from(7_u64), form)
            .await
            .unwrap();

        // Assert
        assert_eq!(updated.id, Some(MovieId::from(7_u64)));
        assert_eq!(updated.title.as_deref(), Some("Sen to Chihiro no Kamikakushi"));
    }

    #[tokio::test]
    async fn test_delete_via_http() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/movies/7/"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let result = client.delete(&MovieId::from(7_u64)).await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_not_found_keeps_reqwest_status() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string(r#"{"detail":"No Movie matches the given query."}"#),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let err = client.retrieve(&MovieId::from(404_u64)).await.unwrap_err();

        // Assert
        let source = err.downcast_ref::<reqwest::Error>().unwrap();
        assert!(source.is_status());
        assert_eq!(source.status(), Some(reqwest::StatusCode::NOT_FOUND));
        assert!(err.to_string().contains("retrieve failed"));
    }

    #[tokio::test]
    async fn test_create_bad_request_is_error() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"poster":["No file was submitted."]}"#),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let err = client
            .create(MovieForm::new().title("No poster"))
            .await
            .unwrap_err();

        // Assert
        let source = err.downcast_ref::<reqwest::Error>().unwrap();
        assert_eq!(source.status(), Some(reqwest::StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_delete_server_error_is_not_retried() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let result = client.delete(&MovieId::from(1_u64)).await;

        // Assert
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_connect_error() {
        // Arrange
        let client = MovieClient::builder()
            .base_url(Url::parse("http://127.0.0.1:1/api/").unwrap())
            .build()
            .unwrap();

        // Act
        let err = client.list().await.unwrap_err();

        // Assert
        let source = err.downcast_ref::<reqwest::Error>().unwrap();
        assert!(source.is_connect());
        assert!(err.to_string().contains("list request failed"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let err = client.list().await.unwrap_err();

        // Assert
        assert!(err.to_string().contains("failed to decode JSON response: list"));
    }

    #[tokio::test]
    async fn test_user_agent_is_sent() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(header("User-Agent", DEFAULT_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let movies = client.list().await.unwrap();

        // Assert
        assert!(movies.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        // Arrange
        let mock_server = MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/movies/movie_7.json");

        Mock::given(method("GET"))
            .and(path("/api/movies/7/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/movies/8/"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let found = MovieId::from(7_u64);
        let missing = MovieId::from(8_u64);

        // Act
        let (first, second) = tokio::join!(client.retrieve(&found), client.retrieve(&missing));

        // Assert
        assert_eq!(first.unwrap().id, Some(found));
        assert!(second.is_err());
    }
}
