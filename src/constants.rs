//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role. Reading these constants should tell you how the batch
//! talks to the generation service: how often it asks, how long it waits,
//! and what it assumes when a lesson does not say otherwise.

// ---------------------------------------------------------------------------
// Generation service
// ---------------------------------------------------------------------------

/// Base URL of the public generation API, including the version segment.
pub const DEFAULT_API_BASE: &str = "https://public-api.gamma.app/v0.2";

/// Header carrying the API key on every request (`X-API-KEY`; header
/// names are case-insensitive and `http` stores them lowercase).
pub const API_KEY_HEADER: &str = "x-api-key";

/// How lesson text is treated by the service: kept as written.
pub const TEXT_MODE: &str = "preserve";

/// Cards are split where the lesson text has explicit breaks (`---`).
pub const CARD_SPLIT: &str = "inputTextBreaks";

/// Lesson decks are text-only; image generation is switched off.
pub const IMAGE_SOURCE: &str = "noImages";

/// Theme applied when neither the run nor the lesson names one.
pub const DEFAULT_THEME: &str = "Oasis";

// ---------------------------------------------------------------------------
// Polling and backoff
// ---------------------------------------------------------------------------

/// Status checks per job before giving up.
///
/// Observed generation times range from under a minute to several
/// minutes; 60 checks at the default interval covers about five minutes.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 60;

/// Seconds between status checks while a job is still pending.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Submission attempts when the service answers 429 or 5xx.
pub const DEFAULT_SUBMIT_ATTEMPTS: u32 = 3;

/// First backoff delay after a throttled response, doubled per repeat.
pub const DEFAULT_BACKOFF_BASE_SECS: u64 = 2;

/// Upper bound on any computed backoff delay.
pub const DEFAULT_BACKOFF_CAP_SECS: u64 = 60;

/// Upper bound on random jitter added to a computed backoff delay.
pub const DEFAULT_BACKOFF_JITTER_MILLIS: u64 = 1000;

/// Per-request timeout for calls to the service.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Status values that mean a job finished successfully (compared case-insensitively).
pub const SUCCESS_STATUSES: &[&str] = &["completed", "succeeded", "complete"];

/// Status values that mean a job failed (compared case-insensitively).
pub const FAILURE_STATUSES: &[&str] = &["failed"];

// ---------------------------------------------------------------------------
// Lessons and output
// ---------------------------------------------------------------------------

/// Directory scanned for lessons when none is given and no manifest is used.
pub const DEFAULT_LESSONS_DIR: &str = "lessons";

/// Lesson file read for manifest rows that do not name a source.
pub const DEFAULT_MANIFEST_SOURCE: &str = "deck.md";

/// Placeholder in lesson text replaced with the configured site host.
pub const HOST_PLACEHOLDER: &str = "HOST";

/// Longest slug derived from a lesson title.
pub const SLUG_MAX_LENGTH: usize = 80;

/// Maximum characters shown when previewing response bodies in logs and errors.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 500;
