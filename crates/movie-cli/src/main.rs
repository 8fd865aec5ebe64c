//! movies - command-line client for the movies REST API.

/// Application configuration (TOML).
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

use crate::config::{AppConfig, resolve_config_path};
use movie_api::movies::{FilePart, Movie, MovieApi, MovieClient, MovieForm, MovieId};

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Override the API base URL (e.g. "http://127.0.0.1:8000/api/").
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List all movies.
    List,
    /// Show a single movie.
    Get(IdArgs),
    /// Create a movie (multipart upload).
    Create(MovieFieldArgs),
    /// Replace a movie (multipart upload).
    Update(UpdateArgs),
    /// Delete a movie.
    Delete(IdArgs),
    /// Inspect or change the configuration.
    Config(ConfigCommand),
}

/// Arguments for subcommands addressing one movie.
#[derive(clap::Args)]
struct IdArgs {
    /// Movie ID (numeric or string, used verbatim in the URL path).
    #[arg(long, required = true)]
    id: MovieId,
}

/// Movie fields sent as form data.
#[derive(clap::Args)]
struct MovieFieldArgs {
    /// Title.
    #[arg(long)]
    title: Option<String>,
    /// Genre.
    #[arg(long)]
    genre: Option<String>,
    /// Director.
    #[arg(long)]
    director: Option<String>,
    /// Release year (e.g. 2001).
    #[arg(long)]
    release_year: Option<i32>,
    /// Rating (e.g. 8.6).
    #[arg(long)]
    rating: Option<f64>,
    /// Poster image file to upload.
    #[arg(long)]
    poster: Option<PathBuf>,
    /// Additional form field as KEY=VALUE. Repeatable.
    #[arg(long = "field", value_name = "KEY=VALUE")]
    extra_fields: Vec<String>,
}

/// Arguments for the `update` subcommand.
#[derive(clap::Args)]
struct UpdateArgs {
    /// Movie ID (numeric or string, used verbatim in the URL path).
    #[arg(long, required = true)]
    id: MovieId,
    /// Fields to send.
    #[command(flatten)]
    fields: MovieFieldArgs,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show the config file path and effective base URL.
    Show,
    /// Persist the API base URL to the config file.
    SetBaseUrl(SetBaseUrlArgs),
}

/// Arguments for the `config set-base-url` subcommand.
#[derive(clap::Args)]
struct SetBaseUrlArgs {
    /// Base URL (e.g. "http://127.0.0.1:8000/api/").
    url: String,
}

/// Splits a `KEY=VALUE` argument.
fn parse_field(raw: &str) -> Result<(&str, &str)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("invalid --field {raw:?}: expected KEY=VALUE");
    };
    if key.is_empty() {
        bail!("invalid --field {raw:?}: empty field name");
    }
    Ok((key, value))
}

/// Builds the form payload from CLI flags.
///
/// `--field` entries are applied first, so the named flags win on conflict.
///
/// # Errors
///
/// Returns an error if a `--field` is malformed or the poster cannot be read.
async fn build_form(args: &MovieFieldArgs) -> Result<MovieForm> {
    let mut form = MovieForm::new();

    for raw in &args.extra_fields {
        let (key, value) = parse_field(raw)?;
        form = form.text(key, value);
    }

    if let Some(ref title) = args.title {
        form = form.title(title.as_str());
    }
    if let Some(ref genre) = args.genre {
        form = form.genre(genre.as_str());
    }
    if let Some(ref director) = args.director {
        form = form.director(director.as_str());
    }
    if let Some(year) = args.release_year {
        form = form.release_year(year);
    }
    if let Some(rating) = args.rating {
        form = form.rating(rating);
    }
    if let Some(ref poster) = args.poster {
        let part = FilePart::from_path(poster)
            .await
            .context("failed to load poster")?;
        form = form.poster(part);
    }

    Ok(form)
}

/// Builds the API client from config and CLI overrides.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded, the base URL is invalid,
/// or the HTTP client fails to build.
fn build_client(dir: Option<&PathBuf>, base_url: Option<&str>) -> Result<MovieClient> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;
    let base_url = config.resolve_base_url(base_url)?;

    tracing::debug!(%base_url, "Using movies API");

    MovieClient::builder()
        .base_url(base_url)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
        .context("failed to build API client")
}

/// Renders an optional field, `-` when absent.
fn field<T: std::fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| String::from("-"), ToString::to_string)
}

/// Logs one movie record in detail.
fn log_movie(movie: &Movie) {
    tracing::info!("ID: {}", field(movie.id.as_ref()));
    tracing::info!("Title: {}", field(movie.title.as_ref()));
    tracing::info!("Genre: {}", field(movie.genre.as_ref()));
    tracing::info!("Director: {}", field(movie.director.as_ref()));
    tracing::info!("Release Year: {}", field(movie.release_year.as_ref()));
    tracing::info!("Rating: {}", field(movie.rating.as_ref()));
    tracing::info!("Poster: {}", field(movie.poster.as_ref()));
    for (key, value) in &movie.extra {
        tracing::info!("{}: {}", key, value);
    }
}

/// Runs the `list` subcommand.
///
/// # Errors
///
/// Returns an error if the API request fails.
#[instrument(skip_all)]
async fn run_list(client: &MovieClient) -> Result<()> {
    let movies = client.list().await.context("failed to list movies")?;

    tracing::info!("ID\tTitle\t\t\tGenre\t\tDirector\t\tYear\tRating");
    for movie in &movies {
        tracing::info!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            field(movie.id.as_ref()),
            field(movie.title.as_ref()),
            field(movie.genre.as_ref()),
            field(movie.director.as_ref()),
            field(movie.release_year.as_ref()),
            field(movie.rating.as_ref()),
        );
    }
    tracing::info!("Total: {} movies", movies.len());

    Ok(())
}

/// Runs the `get` subcommand.
///
/// # Errors
///
/// Returns an error if the API request fails.
#[instrument(skip_all)]
async fn run_get(client: &MovieClient, args: &IdArgs) -> Result<()> {
    let movie = client
        .retrieve(&args.id)
        .await
        .with_context(|| format!("failed to retrieve movie {}", args.id))?;
    log_movie(&movie);
    Ok(())
}

/// Runs the `create` subcommand.
///
/// # Errors
///
/// Returns an error if the form cannot be built or the API request fails.
#[instrument(skip_all)]
async fn run_create(client: &MovieClient, args: &MovieFieldArgs) -> Result<()> {
    let form = build_form(args).await?;
    let movie = client
        .create(form)
        .await
        .context("failed to create movie")?;

    tracing::info!("Created movie {}", field(movie.id.as_ref()));
    log_movie(&movie);
    Ok(())
}

/// Runs the `update` subcommand.
///
/// # Errors
///
/// Returns an error if the form cannot be built or the API request fails.
#[instrument(skip_all)]
async fn run_update(client: &MovieClient, args: &UpdateArgs) -> Result<()> {
    let form = build_form(&args.fields).await?;
    let movie = client
        .update(&args.id, form)
        .await
        .with_context(|| format!("failed to update movie {}", args.id))?;

    tracing::info!("Updated movie {}", field(movie.id.as_ref()));
    log_movie(&movie);
    Ok(())
}

/// Runs the `delete` subcommand.
///
/// # Errors
///
/// Returns an error if the API request fails.
#[instrument(skip_all)]
async fn run_delete(client: &MovieClient, args: &IdArgs) -> Result<()> {
    client
        .delete(&args.id)
        .await
        .with_context(|| format!("failed to delete movie {}", args.id))?;
    tracing::info!("Deleted movie {}", args.id);
    Ok(())
}

/// Runs the `config show` subcommand.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or holds an invalid URL.
fn run_config_show(dir: Option<&PathBuf>, base_url: Option<&str>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;
    let effective = config.resolve_base_url(base_url)?;

    tracing::info!("Config file: {}", config_path.display());
    tracing::info!("Base URL: {}", effective);
    Ok(())
}

/// Runs the `config set-base-url` subcommand.
///
/// # Errors
///
/// Returns an error if the URL is invalid or the config cannot be saved.
fn run_config_set_base_url(dir: Option<&PathBuf>, args: &SetBaseUrlArgs) -> Result<()> {
    let url = Url::parse(&args.url).with_context(|| format!("invalid base URL: {}", args.url))?;

    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let mut config = AppConfig::load(&config_path).context("failed to load config")?;
    config.api.base_url = Some(String::from(url.as_str()));
    config.save(&config_path).context("failed to save config")?;

    tracing::info!("Saved base URL {} to {}", url, config_path.display());
    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let dir = cli.dir.as_ref();
    let base_url = cli.base_url.as_deref();
    match cli.command {
        Commands::List => run_list(&build_client(dir, base_url)?).await,
        Commands::Get(args) => run_get(&build_client(dir, base_url)?, &args).await,
        Commands::Create(args) => run_create(&build_client(dir, base_url)?, &args).await,
        Commands::Update(args) => run_update(&build_client(dir, base_url)?, &args).await,
        Commands::Delete(args) => run_delete(&build_client(dir, base_url)?, &args).await,
        Commands::Config(cmd) => match cmd.command {
            ConfigSubcommands::Show => run_config_show(dir, base_url),
            ConfigSubcommands::SetBaseUrl(args) => run_config_set_base_url(dir, &args),
        },
    }
}
