//! Domain model: generation requests, remote jobs and per-lesson outcomes.

mod job;
mod outcome;
mod request;

pub use job::{GenerationJob, JobStatus};
pub use outcome::{ExtractedResult, LessonOutcome, LessonRecord, OutcomeStatus};
pub use request::{
    AccessLevel, DeckFormat, ExportFormat, GenerationOptions, GenerationRequest, SharingPolicy,
};
