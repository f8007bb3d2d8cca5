use std::fs;
use std::path::Path;
use std::sync::{mpsc, Arc, Mutex};

use merge_core::{
    build, ConversionMode, ConversionProgress, ConversionRequest, ConversionResult, OutputFormat,
};
use merge_engine::{
    ConversionBackend, ConversionClient, FolderMergeBackend, MergeSettings, ProgressListener,
    ProgressSink, ResultListener, SubmitError,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Seen {
    Progress(u8),
    Finished(bool, String),
}

#[derive(Clone, Default)]
struct Recorder {
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Recorder {
    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

impl ProgressListener for Recorder {
    fn on_progress(&self, progress: ConversionProgress) {
        self.seen
            .lock()
            .unwrap()
            .push(Seen::Progress(progress.percent()));
    }
}

impl ResultListener for Recorder {
    fn on_conversion_finished(&self, result: &ConversionResult) {
        self.seen
            .lock()
            .unwrap()
            .push(Seen::Finished(result.success, result.message.clone()));
    }
}

/// Emits a fixed progress sequence, then a fixed result.
struct ScriptedBackend {
    steps: Vec<u8>,
    result: ConversionResult,
}

impl ConversionBackend for ScriptedBackend {
    fn run(&self, _request: &ConversionRequest, sink: &dyn ProgressSink) -> ConversionResult {
        for step in &self.steps {
            sink.progress(*step);
        }
        self.result.clone()
    }
}

/// Blocks each run until the test releases it.
struct GatedBackend {
    gate: Mutex<mpsc::Receiver<()>>,
}

impl ConversionBackend for GatedBackend {
    fn run(&self, _request: &ConversionRequest, sink: &dyn ProgressSink) -> ConversionResult {
        sink.progress(0);
        let _ = self.gate.lock().unwrap().recv();
        ConversionResult::success("released")
    }
}

struct PanickingBackend;

impl ConversionBackend for PanickingBackend {
    fn run(&self, _request: &ConversionRequest, _sink: &dyn ProgressSink) -> ConversionResult {
        panic!("backend blew up");
    }
}

fn client_with(backend: Arc<dyn ConversionBackend>) -> (ConversionClient, Recorder) {
    let recorder = Recorder::default();
    let client = ConversionClient::new(
        backend,
        Box::new(recorder.clone()),
        Box::new(recorder.clone()),
    );
    (client, recorder)
}

fn request_for(dir: &Path) -> ConversionRequest {
    build(
        &dir.display().to_string(),
        &OutputFormat::html(),
        "",
    )
    .unwrap()
}

#[test]
fn progress_then_result_reach_listeners_in_order() {
    let temp = TempDir::new().unwrap();
    let (mut client, recorder) = client_with(Arc::new(ScriptedBackend {
        steps: vec![0, 25, 50, 100],
        result: ConversionResult::success("Done"),
    }));

    client.submit(request_for(temp.path())).unwrap();
    assert!(client.is_busy());
    client.wait_idle();

    assert!(!client.is_busy());
    assert_eq!(
        recorder.seen(),
        vec![
            Seen::Progress(0),
            Seen::Progress(25),
            Seen::Progress(50),
            Seen::Progress(100),
            Seen::Finished(true, "Done".to_string()),
        ]
    );
}

#[test]
fn second_submit_while_running_is_refused() {
    let temp = TempDir::new().unwrap();
    let (release, gate) = mpsc::channel();
    let (mut client, recorder) = client_with(Arc::new(GatedBackend {
        gate: Mutex::new(gate),
    }));

    let first = client.submit(request_for(temp.path())).unwrap();
    assert_eq!(
        client.submit(request_for(temp.path())),
        Err(SubmitError::Busy)
    );

    release.send(()).unwrap();
    client.wait_idle();
    assert_eq!(
        recorder.seen(),
        vec![Seen::Progress(0), Seen::Finished(true, "released".to_string())]
    );

    release.send(()).unwrap();
    let second = client.submit(request_for(temp.path())).unwrap();
    assert!(second > first);
    client.wait_idle();
    assert_eq!(recorder.seen().len(), 4);
}

#[test]
fn failure_clears_the_guard() {
    let temp = TempDir::new().unwrap();
    let (mut client, recorder) = client_with(Arc::new(ScriptedBackend {
        steps: vec![0],
        result: ConversionResult::failure("Permission denied"),
    }));

    client.submit(request_for(temp.path())).unwrap();
    client.wait_idle();
    assert_eq!(
        recorder.seen().last(),
        Some(&Seen::Finished(false, "Permission denied".to_string()))
    );

    assert!(client.submit(request_for(temp.path())).is_ok());
    client.wait_idle();
}

#[test]
fn input_must_be_an_existing_folder() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("page.html");
    fs::write(&file, "<p>x</p>").unwrap();
    let (mut client, recorder) = client_with(Arc::new(ScriptedBackend {
        steps: vec![],
        result: ConversionResult::success("unused"),
    }));

    assert_eq!(
        client.submit(request_for(&file)),
        Err(SubmitError::InputNotADirectory(file.clone()))
    );
    assert!(!client.is_busy());
    assert_eq!(client.poll(), 0);
    assert!(recorder.seen().is_empty());
}

#[test]
fn panicking_backend_still_finishes() {
    let temp = TempDir::new().unwrap();
    let (mut client, recorder) = client_with(Arc::new(PanickingBackend));

    client.submit(request_for(temp.path())).unwrap();
    client.wait_idle();
    assert_eq!(
        recorder.seen(),
        vec![Seen::Finished(
            false,
            "conversion backend panicked".to_string()
        )]
    );
}

#[test]
fn folder_merge_backend_converts_through_the_client() {
    let temp = TempDir::new().unwrap();
    let site = temp.path().join("site");
    fs::create_dir_all(site.join("css")).unwrap();
    fs::write(
        site.join("index.html"),
        r#"<html><head><link rel="stylesheet" href="css/a.css"></head><body>hi</body></html>"#,
    )
    .unwrap();
    fs::write(site.join("css/a.css"), "p { margin: 0 }").unwrap();
    let out = temp.path().join("out");

    let (mut client, recorder) = client_with(Arc::new(FolderMergeBackend::new(
        MergeSettings::default(),
    )));
    let request = build(
        &site.display().to_string(),
        &OutputFormat::html(),
        &out.display().to_string(),
    )
    .unwrap()
    .with_mode(ConversionMode::Single);

    client.submit(request).unwrap();
    client.wait_idle();

    let expected = out.join("site.html");
    assert_eq!(
        recorder.seen(),
        vec![
            Seen::Progress(0),
            Seen::Progress(50),
            Seen::Progress(100),
            Seen::Finished(
                true,
                format!("Converted {} into {}", site.display(), expected.display())
            ),
        ]
    );
    let merged = fs::read_to_string(expected).unwrap();
    assert!(merged.contains("<style>\np { margin: 0 }\n</style>"));
}

#[test]
fn unknown_format_fails_after_starting() {
    let temp = TempDir::new().unwrap();
    let (mut client, recorder) = client_with(Arc::new(FolderMergeBackend::default()));
    let pdf = OutputFormat::new("pdf").unwrap();
    let request = build(&temp.path().display().to_string(), &pdf, "").unwrap();

    client.submit(request).unwrap();
    client.wait_idle();
    assert_eq!(
        recorder.seen(),
        vec![
            Seen::Progress(0),
            Seen::Finished(false, "unsupported output format: pdf".to_string()),
        ]
    );
}
