use crate::constants::{
    DEFAULT_API_BASE, DEFAULT_BACKOFF_BASE_SECS, DEFAULT_BACKOFF_CAP_SECS,
    DEFAULT_BACKOFF_JITTER_MILLIS, DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_LESSONS_DIR, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SUBMIT_ATTEMPTS, DEFAULT_THEME,
};
use crate::error::AppError;
use crate::error_recovery::{BackoffPolicy, RetryPolicy};
use crate::model::{DeckFormat, ExportFormat, GenerationOptions, SharingPolicy};
use crate::types::{ApiKey, ThemeName, ValidatedUrl};
use clap::builder::BoolishValueParser;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Parsed command-line input; every option can also come from the environment.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// API key for the deck-generation service
    #[arg(long, env = "GAMMA_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Public host of the lesson site; replaces {{HOST}} in lesson text (e.g. "https://learn.example.com")
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Base URL of the generation API, including its version segment
    #[arg(long, env = "GAMMA_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Deck format: presentation or webpage
    #[arg(long, env = "DECK_FORMAT", default_value = "presentation")]
    pub format: String,

    /// Theme name applied to generated decks
    #[arg(long, env = "THEME_NAME", default_value = DEFAULT_THEME)]
    pub theme: String,

    /// Also export each deck as pdf or pptx
    #[arg(long, env = "EXPORT_AS")]
    pub export_as: Option<String>,

    /// Download exported files next to the generated site
    #[arg(
        long,
        env = "DOWNLOAD_EXPORTS",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub download_exports: Option<bool>,

    /// CSV manifest of lessons (columns: title, format, theme, exportAs, source)
    #[arg(long, env = "BATCH_CSV", value_name = "PATH")]
    pub batch_csv: Option<PathBuf>,

    /// Directory holding the lesson Markdown files [default: lessons, or the
    /// manifest's directory when --batch-csv is given]
    #[arg(short = 'i', long, env = "LESSONS_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory the site, status snapshot and downloads are written to
    #[arg(short = 'o', long, env = "OUTPUT_DIR", default_value = "site")]
    pub output_dir: PathBuf,

    /// Extra guidance passed to the generator with every lesson
    #[arg(long, env = "ADDITIONAL_INSTRUCTIONS")]
    pub additional_instructions: Option<String>,

    /// Output language for generated text (e.g. "en")
    #[arg(long, env = "TEXT_LANGUAGE")]
    pub text_language: Option<String>,

    /// Status checks per lesson before giving up
    #[arg(long, default_value_t = DEFAULT_POLL_ATTEMPTS)]
    pub max_attempts: u32,

    /// Seconds between status checks while a deck is still generating
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    pub poll_interval_secs: u64,

    /// Submission attempts when the service is rate limiting
    #[arg(long, default_value_t = DEFAULT_SUBMIT_ATTEMPTS)]
    pub submit_attempts: u32,

    /// First backoff delay in seconds after a throttled response
    #[arg(long, default_value_t = DEFAULT_BACKOFF_BASE_SECS)]
    pub backoff_base_secs: u64,

    /// Longest backoff delay in seconds
    #[arg(long, default_value_t = DEFAULT_BACKOFF_CAP_SECS)]
    pub backoff_cap_secs: u64,

    /// Timeout in seconds for each request to the service
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Everything the API client needs, injected at construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: ApiKey,
    pub api_base: ValidatedUrl,
    pub request_timeout: Duration,
    pub submit_policy: RetryPolicy,
    pub poll_policy: RetryPolicy,
}

impl ClientConfig {
    /// Default endpoints and timings for the given key.
    pub fn for_key(api_key: ApiKey) -> Self {
        let backoff = BackoffPolicy {
            base: Duration::from_secs(DEFAULT_BACKOFF_BASE_SECS),
            cap: Duration::from_secs(DEFAULT_BACKOFF_CAP_SECS),
            max_jitter: Duration::from_millis(DEFAULT_BACKOFF_JITTER_MILLIS),
        };
        Self {
            api_key,
            api_base: default_api_base(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            submit_policy: RetryPolicy {
                max_attempts: DEFAULT_SUBMIT_ATTEMPTS,
                interval: backoff.base,
                backoff,
            },
            poll_policy: RetryPolicy {
                max_attempts: DEFAULT_POLL_ATTEMPTS,
                interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
                backoff,
            },
        }
    }
}

fn default_api_base() -> ValidatedUrl {
    // The constant is a well-formed https URL
    match ValidatedUrl::parse(DEFAULT_API_BASE) {
        Ok(url) => url,
        Err(e) => unreachable!("default API base is invalid: {}", e),
    }
}

/// Resolved run configuration, validated and ready to drive a whole batch.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub client: ClientConfig,
    /// Site host substituted into lesson text.
    pub host: ValidatedUrl,
    /// Defaults for every lesson; manifest rows may override some of them.
    pub generation: GenerationOptions,
    /// Lesson directory, or the base for manifest `source` paths.
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub batch_csv: Option<PathBuf>,
    pub download_exports: bool,
    pub verbose: bool,
}

impl RunConfig {
    /// Resolves a complete run configuration from CLI input and environment.
    ///
    /// Every failure here is a configuration error and stops the run.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        let api_key = required(cli.api_key.as_deref(), "GAMMA_KEY (or --api-key)")?;
        let api_key = ApiKey::new(api_key).map_err(|e| invalid("GAMMA_KEY", e))?;

        let host = required(cli.host.as_deref(), "HOST (or --host)")?;
        let host = ValidatedUrl::parse(host).map_err(|e| invalid("HOST", e))?;
        let api_base =
            ValidatedUrl::parse(&cli.api_base).map_err(|e| invalid("GAMMA_API_BASE", e))?;

        let format: DeckFormat = cli.format.parse().map_err(|e| invalid("DECK_FORMAT", e))?;
        let theme = ThemeName::new(cli.theme).map_err(|e| invalid("THEME_NAME", e))?;
        let export_as = match cli.export_as.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(
                value
                    .parse::<ExportFormat>()
                    .map_err(|e| invalid("EXPORT_AS", e))?,
            ),
        };

        let input_dir = lesson_base(cli.input_dir, cli.batch_csv.as_deref())?;

        for (name, value) in [
            ("--max-attempts", cli.max_attempts),
            ("--submit-attempts", cli.submit_attempts),
        ] {
            if value == 0 {
                return Err(AppError::MissingConfiguration(format!(
                    "{} must be at least 1",
                    name
                )));
            }
        }
        if cli.backoff_cap_secs < cli.backoff_base_secs {
            return Err(AppError::MissingConfiguration(
                "--backoff-cap-secs must not be below --backoff-base-secs".to_string(),
            ));
        }

        let backoff = BackoffPolicy {
            base: Duration::from_secs(cli.backoff_base_secs),
            cap: Duration::from_secs(cli.backoff_cap_secs),
            max_jitter: Duration::from_millis(DEFAULT_BACKOFF_JITTER_MILLIS),
        };
        let client = ClientConfig {
            api_key,
            api_base,
            request_timeout: Duration::from_secs(cli.request_timeout_secs),
            submit_policy: RetryPolicy {
                max_attempts: cli.submit_attempts,
                interval: backoff.base,
                backoff,
            },
            poll_policy: RetryPolicy {
                max_attempts: cli.max_attempts,
                interval: Duration::from_secs(cli.poll_interval_secs),
                backoff,
            },
        };

        Ok(RunConfig {
            client,
            host,
            generation: GenerationOptions {
                format,
                theme,
                export_as,
                sharing: SharingPolicy::default(),
                additional_instructions: cli.additional_instructions,
                text_language: cli.text_language,
            },
            input_dir,
            output_dir: cli.output_dir,
            batch_csv: cli.batch_csv,
            download_exports: cli.download_exports.unwrap_or(false),
            verbose: cli.verbose,
        })
    }
}

/// Picks the directory lessons are read from.
///
/// Manifest sources resolve against an explicit input directory, else the
/// manifest's own directory; without a manifest the default is `lessons`.
fn lesson_base(input_dir: Option<PathBuf>, manifest: Option<&Path>) -> Result<PathBuf, AppError> {
    if let Some(manifest) = manifest {
        if !manifest.is_file() {
            return Err(AppError::MissingConfiguration(format!(
                "batch manifest {} does not exist",
                manifest.display()
            )));
        }
    }

    let dir = match (input_dir, manifest) {
        (Some(dir), _) => dir,
        (None, Some(manifest)) => manifest
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
        (None, None) => PathBuf::from(DEFAULT_LESSONS_DIR),
    };
    // An empty path is the working directory
    if !dir.as_os_str().is_empty() && !dir.is_dir() {
        return Err(AppError::MissingConfiguration(format!(
            "lesson directory {} does not exist",
            dir.display()
        )));
    }
    Ok(dir)
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::MissingConfiguration(format!("{} is not set", name)))
}

fn invalid(name: &str, err: impl std::fmt::Display) -> AppError {
    AppError::MissingConfiguration(format!("{} is invalid: {}", name, err))
}
