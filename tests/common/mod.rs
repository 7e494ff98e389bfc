// tests/common/mod.rs
//! Shared fakes for integration tests: a scripted generation API and a
//! sleeper that records waits instead of sleeping.

#![allow(dead_code)]

use lesson2deck::api::GenerationBody;
use lesson2deck::{
    ApiResponse, AppError, BackoffPolicy, GenerationApi, GenerationId, RetryPolicy, Sleeper,
};
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One canned answer from the fake service.
#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, String),
    RetryAfter(u16, u64),
    Transport,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Reply::Status(200, body.to_string())
    }

    pub fn status(code: u16, body: &str) -> Self {
        Reply::Status(code, body.to_string())
    }

    fn into_response(self, url: &str) -> Result<ApiResponse<String>, AppError> {
        match self {
            Reply::Status(code, body) => Ok(ApiResponse::new(status(code), body, url)),
            Reply::RetryAfter(code, secs) => Ok(ApiResponse::new(status(code), "", url)
                .with_retry_after(Duration::from_secs(secs))),
            Reply::Transport => Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            ))),
        }
    }
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap()
}

/// Replays scripted answers in order; the last answer repeats forever.
#[derive(Debug, Default)]
pub struct ScriptedApi {
    creates: Mutex<VecDeque<Reply>>,
    fetches: Mutex<VecDeque<Reply>>,
    pub create_calls: AtomicU32,
    pub fetch_calls: AtomicU32,
    pub bodies: Mutex<Vec<Value>>,
}

impl ScriptedApi {
    pub fn new(creates: Vec<Reply>, fetches: Vec<Reply>) -> Self {
        Self {
            creates: Mutex::new(creates.into()),
            fetches: Mutex::new(fetches.into()),
            ..Self::default()
        }
    }

    pub fn creates(&self) -> u32 {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> u32 {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    fn next(queue: &Mutex<VecDeque<Reply>>) -> Reply {
        let mut queue = queue.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().expect("script has no replies")
        }
    }
}

#[async_trait::async_trait]
impl GenerationApi for ScriptedApi {
    async fn create_generation(
        &self,
        body: &GenerationBody,
    ) -> Result<ApiResponse<String>, AppError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.bodies
            .lock()
            .unwrap()
            .push(serde_json::to_value(body).unwrap());
        Self::next(&self.creates).into_response("https://fake/generations")
    }

    async fn fetch_generation(&self, id: &GenerationId) -> Result<ApiResponse<String>, AppError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.fetches).into_response(&format!("https://fake/generations/{}", id))
    }
}

/// Records every requested wait and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

/// Jitter-free policy so recorded waits are exact.
pub fn policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        interval: Duration::from_secs(5),
        backoff: BackoffPolicy {
            base: Duration::from_secs(2),
            cap: Duration::from_secs(60),
            max_jitter: Duration::ZERO,
        },
    }
}

pub fn secs(values: &[u64]) -> Vec<Duration> {
    values.iter().map(|s| Duration::from_secs(*s)).collect()
}
