use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::config::{API_URL_VAR, ConfigError};
use services::{ApiConfig, AppServices, AuthConfig, Clock, InMemoryAuthProvider};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as log_fmt};
use ui::{App, build_app_context};

const DB_URL_VAR: &str = "STUDY_DB_URL";
const DEFAULT_DB_URL: &str = "sqlite://study.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--api-url <url>] [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api-url http://127.0.0.1:8000");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!();
    eprintln!("Environment (also read from .env):");
    eprintln!("  STUDY_API_URL, STUDY_API_TIMEOUT_SECS, STUDY_TOP_K, {DB_URL_VAR}");
    eprintln!("  STUDY_AUTH_API_KEY, STUDY_AUTH_DOMAIN, STUDY_AUTH_PROJECT_ID");
    eprintln!("  RUST_LOG (default: info)");
}

struct Args {
    api_url: Option<String>,
    db_url: String,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut api_url = None;
        let mut db_url = normalize_sqlite_url(
            std::env::var(DB_URL_VAR)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DB_URL.to_string()),
        );

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api-url" => api_url = Some(require_value(args, "--api-url")?),
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Some(Self { api_url, db_url }))
    }
}

/// Rewrite a `sqlite:` URL so its file path is absolute; query options are kept.
fn normalize_sqlite_url(raw: String) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" {
        return trimmed.to_string();
    }

    let rest = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let (path_str, options) = match rest.split_once('?') {
        Some((path, options)) => (path, Some(options)),
        None => (rest, None),
    };
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    match options {
        Some(options) => format!("sqlite://{}?{options}", absolute.display()),
        None => format!("sqlite://{}", absolute.display()),
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn api_config(api_url: Option<&str>) -> Result<ApiConfig, ConfigError> {
    // --api-url wins over STUDY_API_URL; everything else comes from the environment.
    ApiConfig::from_lookup(|key| match api_url {
        Some(url) if key == API_URL_VAR => Some(url.to_string()),
        _ => std::env::var(key).ok(),
    })
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let Some(parsed) = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?
    else {
        print_usage();
        return Ok(());
    };

    let config = api_config(parsed.api_url.as_deref())?;
    let auth_config = AuthConfig::from_env();
    info!(
        api_url = %config.base_url(),
        timeout_secs = config.timeout().as_secs(),
        top_k = config.top_k(),
        db_url = %parsed.db_url,
        "starting study assistant"
    );
    if auth_config.is_complete() {
        info!(?auth_config, "identity provider configured; using the local provider");
    }

    // Open + migrate SQLite here so services stay free of filesystem concerns.
    prepare_sqlite_file(&parsed.db_url)?;
    let provider = Arc::new(InMemoryAuthProvider::new());
    let services =
        AppServices::new_sqlite(&parsed.db_url, config, Clock::system(), provider).await?;

    let context = build_app_context(services.clone());

    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Study Assistant")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);

    services.shutdown();
    info!("study assistant stopped");
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    log_fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::{Args, ArgsError, api_config, normalize_sqlite_url};

    fn parse(raw: &[&str]) -> Result<Option<Args>, ArgsError> {
        let mut iter = raw.iter().map(ToString::to_string);
        Args::parse(&mut iter)
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&["--api-url", "http://localhost:9000", "--db", "sqlite::memory:"])
            .unwrap()
            .unwrap();
        assert_eq!(args.api_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(args.db_url, "sqlite::memory:");
    }

    #[test]
    fn help_and_bad_flags() {
        assert!(parse(&["--help"]).unwrap().is_none());
        assert!(matches!(
            parse(&["--db"]),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
        assert!(matches!(parse(&["--verbose"]), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/study.sqlite3".into());
        assert!(url.starts_with("sqlite:///"), "{url}");
        assert!(url.ends_with("data/study.sqlite3"), "{url}");
        let url = normalize_sqlite_url("sqlite://already.db?mode=rwc".into());
        assert!(url.starts_with("sqlite:///"), "{url}");
        assert!(url.ends_with("/already.db?mode=rwc"), "{url}");
        assert_eq!(
            normalize_sqlite_url("sqlite:///var/lib/study.sqlite3".into()),
            "sqlite:///var/lib/study.sqlite3"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
    }

    #[test]
    fn default_database_is_absolute() {
        let args = parse(&[]).unwrap().unwrap();
        assert!(args.db_url.starts_with("sqlite:///"), "{}", args.db_url);
    }

    #[test]
    fn api_url_flag_replaces_the_environment_url() {
        let config = api_config(Some("http://localhost:9000/")).unwrap();
        assert_eq!(config.base_url().as_str(), "http://localhost:9000/");
        assert!(api_config(Some("ftp://example.com")).is_err());
    }
}
