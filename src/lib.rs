// src/lib.rs
//! lesson2deck library: turns Markdown lessons into generated slide decks
//! and a static lesson site.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `ValidationError`
//! - **Configuration**: `CommandLineInput`, `RunConfig`, `ClientConfig`
//! - **Domain model**: `GenerationRequest`, `GenerationJob`, `LessonOutcome`, etc.
//! - **API client**: `DeckClient`, `Submitter`, `Poller`, `extract`
//! - **Batch**: `BatchRunner`, lesson loading, site rendering and output

pub mod analytics;
pub mod api;
pub mod batch;
pub mod config;
pub mod constants;
pub mod error;
pub mod error_recovery;
pub mod formatting;
pub mod lessons;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, ResponseClass};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{ClientConfig, CommandLineInput, RunConfig};

// --- Domain Model ---
pub use crate::model::{
    AccessLevel, DeckFormat, ExportFormat, ExtractedResult, GenerationJob, GenerationOptions,
    GenerationRequest, JobStatus, LessonOutcome, LessonRecord, OutcomeStatus, SharingPolicy,
};

// --- Domain Types ---
pub use crate::types::{ApiKey, GenerationId, ThemeName, ValidatedUrl};

// --- API Client ---
pub use crate::api::{
    client::ApiResponse, extract, DeckClient, GammaHttpClient, GeneratedDeck, GenerationApi,
    Poller, RemoteState, Submitter,
};

// --- Retry ---
pub use crate::error_recovery::{
    with_backoff, BackoffError, BackoffPolicy, RetryPolicy, Sleeper, TokioSleeper, Verdict,
};

// --- Batch ---
pub use crate::analytics::BatchStats;
pub use crate::batch::{BatchRunner, BatchSummary};
pub use crate::lessons::{load_lesson, plan_lessons, Lesson, LessonEntry, LessonOverrides};

// --- Pipeline Traits ---
pub use crate::pipeline::{DeckGenerator, ExportFetcher, SiteComposer, SiteDelivery};
