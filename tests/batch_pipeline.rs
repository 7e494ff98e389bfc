// tests/batch_pipeline.rs
//! Whole batches with a fake generator: lesson loading, failure handling,
//! downloads and the written site.

use lesson2deck::{
    ApiKey, AppError, BatchRunner, ClientConfig, DeckGenerator, ExportFetcher, ExportFormat,
    ExtractedResult, GeneratedDeck, GenerationId, GenerationJob, GenerationOptions,
    GenerationRequest, JobStatus, OutcomeStatus, RunConfig, ValidatedUrl,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Completes every lesson except those titled "Broken" or "Slow".
#[derive(Default)]
struct FakeGenerator {
    requests: Mutex<Vec<(String, String, Option<ExportFormat>)>>,
}

impl FakeGenerator {
    fn titles(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(title, _, _)| title.clone())
            .collect()
    }

    fn text_of(&self, title: &str) -> String {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .find(|(t, _, _)| t == title)
            .map(|(_, text, _)| text.clone())
            .unwrap()
    }
}

#[async_trait::async_trait]
impl DeckGenerator for FakeGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedDeck, AppError> {
        self.requests.lock().unwrap().push((
            request.title().to_string(),
            request.source_text().to_string(),
            request.export_as(),
        ));
        let id = GenerationId::new(format!("gen-{}", request.title().to_lowercase())).unwrap();

        match request.title() {
            "Broken" => Err(AppError::GenerationFailed {
                id,
                body: r#"{"status":"failed"}"#.to_string(),
            }),
            "Slow" => Err(AppError::PollTimeout {
                id,
                attempts: 60,
                throttled: false,
            }),
            _ => {
                let payload = json!({
                    "status": "completed",
                    "gammaUrl": format!("https://gamma.app/docs/{}", id),
                });
                let mut job = GenerationJob::pending(id.clone());
                job.transition(JobStatus::Completed, payload).unwrap();
                Ok(GeneratedDeck {
                    job,
                    links: ExtractedResult {
                        share_url: Some(format!("https://gamma.app/docs/{}", id)),
                        file_url: request
                            .export_as()
                            .map(|f| format!("https://files.example.com/{}.{}", id, f)),
                    },
                })
            }
        }
    }
}

/// Writes a small file for every download, or fails for URLs containing "fail".
#[derive(Default)]
struct FakeFetcher {
    fetched: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl ExportFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, AppError> {
        self.fetched.lock().unwrap().push(url.to_string());
        if url.contains("fail") {
            return Err(AppError::MalformedResponse("download refused".to_string()));
        }
        fs::create_dir_all(destination.parent().unwrap())?;
        fs::write(destination, b"deck")?;
        Ok(4)
    }
}

fn run_config(input: &Path, output: &Path) -> RunConfig {
    RunConfig {
        client: ClientConfig::for_key(ApiKey::new("sk-test").unwrap()),
        host: ValidatedUrl::parse("https://learn.example.com/").unwrap(),
        generation: GenerationOptions::default(),
        input_dir: input.to_path_buf(),
        output_dir: output.to_path_buf(),
        batch_csv: None,
        download_exports: false,
        verbose: false,
    }
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn failing_lessons_do_not_stop_the_batch() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write(input.path(), "01-fractions.md", "# Fractions\nHalves and quarters.");
    write(input.path(), "02-broken.md", "# Broken\nThis one fails.");
    write(input.path(), "03-slow.md", "# Slow\nThis one times out.");
    write(input.path(), "04-empty.md", "   \n");
    write(input.path(), "05-loops.md", "# Loops\nSlides at {{HOST}}/loops");

    let config = run_config(input.path(), output.path());
    let generator = FakeGenerator::default();
    let runner = BatchRunner::new(&config, &generator, None).unwrap();

    let summary = runner.run().await.unwrap();

    let statuses: Vec<(&str, OutcomeStatus)> = summary
        .lessons
        .iter()
        .map(|l| (l.outcome.title.as_str(), l.outcome.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("Fractions", OutcomeStatus::Completed),
            ("Broken", OutcomeStatus::Failed),
            ("Slow", OutcomeStatus::TimedOut),
            ("04 empty", OutcomeStatus::Rejected),
            ("Loops", OutcomeStatus::Completed),
        ]
    );
    // The empty lesson never reaches the service
    assert_eq!(generator.titles(), vec!["Fractions", "Broken", "Slow", "Loops"]);
    assert_eq!(
        generator.text_of("Loops"),
        "# Loops\nSlides at https://learn.example.com/loops"
    );

    assert_eq!(summary.stats.total, 5);
    assert_eq!(summary.stats.completed, 2);
    assert_eq!(summary.stats.failed, 1);
    assert_eq!(summary.stats.timeout, 1);
    assert_eq!(summary.stats.rejected, 1);
    assert!(summary.report.is_success());
    assert!(summary.report.site_is_browsable());
    assert_eq!(summary.report.written.len(), 7);

    let broken = &summary.lessons[1].outcome;
    assert_eq!(broken.generation_id.as_ref().map(|id| id.as_str()), Some("gen-broken"));
    assert!(broken.error.as_deref().unwrap().contains("failed"));

    let index = fs::read_to_string(output.path().join("index.html")).unwrap();
    for slug in ["fractions", "broken", "slow", "04-empty", "loops"] {
        assert!(index.contains(&format!("lessons/{}.html", slug)), "{}", slug);
        assert!(output.path().join(format!("lessons/{}.html", slug)).is_file());
    }
    assert!(index.contains(r#"class="status status-failed""#));

    let status = read_json(&output.path().join("status.json"));
    assert_eq!(status["stats"]["total"], 5);
    assert_eq!(status["lessons"][0]["status"], "completed");
    assert_eq!(status["lessons"][0]["shareUrl"], "https://gamma.app/docs/gen-fractions");
    assert_eq!(status["lessons"][1]["status"], "failed");
    assert_eq!(status["lessons"][2]["status"], "timeout");
    assert_eq!(status["lessons"][3]["status"], "rejected");
    assert!(status["generatedAt"].is_string());

    let page = fs::read_to_string(output.path().join("lessons/fractions.html")).unwrap();
    assert!(page.contains(r#"src="https://gamma.app/docs/gen-fractions""#));
    assert!(page.contains("Halves and quarters."));
}

#[tokio::test]
async fn manifest_rows_override_defaults_and_download_exports() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write(input.path(), "intro.md", "# Heading ignored\nWelcome.");
    write(input.path(), "deck.md", "Default source.");
    let manifest = write(
        input.path(),
        "batch.csv",
        "title,format,theme,exportAs,source\n\
         Intro,,,pptx,intro.md\n\
         Intro,webpage,Chisel,,\n\
         Missing,,,,nowhere.md\n",
    );

    let config = RunConfig {
        batch_csv: Some(manifest),
        download_exports: true,
        ..run_config(input.path(), output.path())
    };
    let generator = FakeGenerator::default();
    let fetcher = FakeFetcher::default();
    let runner = BatchRunner::new(&config, &generator, Some(&fetcher)).unwrap();

    let summary = runner.run().await.unwrap();

    let outcomes: Vec<_> = summary.lessons.iter().map(|l| &l.outcome).collect();
    assert_eq!(outcomes.len(), 3);

    // Duplicate titles get distinct slugs
    assert_eq!(outcomes[0].slug, "intro");
    assert_eq!(outcomes[1].slug, "intro-2");
    assert_eq!(outcomes[1].source, input.path().join("deck.md"));

    let expected_download = output.path().join("downloads/intro_gen-intro.pptx");
    assert_eq!(outcomes[0].downloaded_file.as_deref(), Some(expected_download.as_path()));
    assert!(expected_download.is_file());
    assert_eq!(outcomes[1].downloaded_file, None);

    assert_eq!(outcomes[2].status, OutcomeStatus::Rejected);
    assert!(outcomes[2].error.as_deref().unwrap().contains("nowhere.md"));

    let requests = generator.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].2, Some(ExportFormat::Pptx));
    assert_eq!(requests[1].2, None);
    assert_eq!(fetcher.fetched.lock().unwrap().len(), 1);

    let index = fs::read_to_string(output.path().join("index.html")).unwrap();
    assert!(index.contains(r#"href="downloads/intro_gen-intro.pptx""#));
}

#[tokio::test]
async fn failed_downloads_leave_the_lesson_completed() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write(input.path(), "fail.md", "# Fail\nExport link will not download.");

    let config = RunConfig {
        download_exports: true,
        generation: GenerationOptions {
            export_as: Some(ExportFormat::Pdf),
            ..GenerationOptions::default()
        },
        ..run_config(input.path(), output.path())
    };
    let generator = FakeGenerator::default();
    let fetcher = FakeFetcher::default();
    let runner = BatchRunner::new(&config, &generator, Some(&fetcher)).unwrap();

    let summary = runner.run().await.unwrap();
    let outcome = &summary.lessons[0].outcome;

    assert_eq!(outcome.status, OutcomeStatus::Completed);
    assert_eq!(
        outcome.file_url.as_deref(),
        Some("https://files.example.com/gen-fail.pdf")
    );
    assert_eq!(outcome.downloaded_file, None);
    assert_eq!(fetcher.fetched.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn unreadable_manifest_is_a_configuration_error() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let config = RunConfig {
        batch_csv: Some(input.path().join("missing.csv")),
        ..run_config(input.path(), output.path())
    };
    let generator = FakeGenerator::default();
    let runner = BatchRunner::new(&config, &generator, None).unwrap();

    let err = runner.run().await.unwrap_err();

    assert!(err.is_fatal());
    assert!(generator.titles().is_empty());
}

#[tokio::test]
async fn empty_lesson_directory_still_writes_the_site() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let config = run_config(input.path(), output.path());
    let generator = FakeGenerator::default();
    let runner = BatchRunner::new(&config, &generator, None).unwrap();

    let summary = runner.run().await.unwrap();

    assert_eq!(summary.stats.total, 0);
    assert!(output.path().join("index.html").is_file());
    assert_eq!(read_json(&output.path().join("status.json"))["lessons"], json!([]));
}
