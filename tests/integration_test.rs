use base64::{engine::general_purpose::STANDARD, Engine};
use futures::future::{BoxFuture, FutureExt};
use photo_labeler::config::Config;
use photo_labeler::error::{AppResult, LabelerError};
use photo_labeler::models::ImagePayload;
use photo_labeler::services::OcrEngine;
use photo_labeler::{logger, App, GroupSize};
use std::collections::VecDeque;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// 按顺序返回预设标签的假 OCR 引擎
struct FakeOcr {
    replies: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl FakeOcr {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|s| s.to_string()).collect()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrEngine for FakeOcr {
    fn recognize<'a>(
        &'a self,
        _credential: &'a str,
        _image: &'a ImagePayload,
    ) -> BoxFuture<'a, AppResult<String>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LabelerError::service_call_failed("fake", "no reply left"))
        }
        .boxed()
    }
}

struct Workspace {
    root: PathBuf,
}

impl Workspace {
    fn new(images: &[&str]) -> Self {
        let root = std::env::temp_dir().join(format!(
            "photo_labeler_it_{}",
            uuid::Uuid::new_v4().simple()
        ));
        let input = root.join("input");
        std::fs::create_dir_all(&input).unwrap();
        let png = STANDARD.decode(PNG_1X1).unwrap();
        for name in images {
            std::fs::write(input.join(name), &png).unwrap();
        }
        std::fs::write(input.join("notes.txt"), b"ignored").unwrap();
        Self { root }
    }

    fn config(&self, api_key: &str) -> Config {
        Config {
            input_folder: self.root.join("input").display().to_string(),
            output_folder: self.root.join("output").display().to_string(),
            export_base_name: "site photos".to_string(),
            group_size: GroupSize::Pair,
            output_log_file: self.root.join("output.txt").display().to_string(),
            ocr_api_key: api_key.to_string(),
            ..Config::default()
        }
    }

    fn session_path(&self) -> PathBuf {
        self.root.join("input").join("labels.toml")
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

fn zip_entries(path: &Path) -> Vec<String> {
    let bytes = std::fs::read(path).unwrap();
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    archive.file_names().map(String::from).collect::<Vec<_>>()
}

fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names
}

#[tokio::test]
async fn test_full_run_labels_and_exports() {
    logger::init();
    let ws = Workspace::new(&["a.png", "b.png", "c.png", "d.png"]);
    let engine = FakeOcr::new(&["R-1", "ACC-7"]);

    let app = App::with_engine(ws.config("test-key"), engine.clone()).unwrap();
    let summary = app.run().await.unwrap();

    assert_eq!(summary.images, 4);
    assert_eq!(engine.calls(), 2);
    let recognition = summary.recognition.expect("识别应该执行");
    assert_eq!(recognition.labeled, 2);
    assert_eq!(recognition.failed(), 0);
    assert_eq!(summary.thumbnail_failures, 0);

    let archive_path = summary.archive_path.expect("应该导出 ZIP");
    assert_eq!(archive_path.file_name().unwrap(), "site_photos.zip");
    assert_eq!(
        sorted(zip_entries(&archive_path)),
        vec!["ACC-7-2.png", "ACC-7.png", "R-1-2.png", "R-1.png"]
    );

    let report_path = summary.report_path.expect("应该导出 Excel");
    assert_eq!(report_path.file_name().unwrap(), "site_photos-report.xlsx");
    assert!(report_path.exists());

    let session = std::fs::read_to_string(ws.session_path()).unwrap();
    assert!(session.contains("R-1-2"));
    assert!(!session.contains("test-key"));
}

#[tokio::test]
async fn test_second_run_skips_completed_groups_and_keeps_manual_edits() {
    let ws = Workspace::new(&["a.png", "b.png"]);

    let first = FakeOcr::new(&["R-1"]);
    App::with_engine(ws.config("test-key"), first.clone())
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(first.calls(), 1);

    // 用户在会话文件里手动修改已完成的名称
    let session = std::fs::read_to_string(ws.session_path()).unwrap();
    std::fs::write(ws.session_path(), session.replace("\"R-1-2\"", "\"R-1-side\"")).unwrap();

    let second = FakeOcr::new(&["SHOULD-NOT-BE-USED"]);
    let summary = App::with_engine(ws.config("test-key"), second.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(second.calls(), 0);
    assert_eq!(summary.recognition.unwrap().skipped, 1);
    assert_eq!(
        sorted(zip_entries(&summary.archive_path.unwrap())),
        vec!["R-1-side.png", "R-1.png"]
    );
}

#[tokio::test]
async fn test_missing_credential_skips_recognition_but_still_exports() {
    let ws = Workspace::new(&["a.png", "b.png", "c.png"]);
    let engine = FakeOcr::new(&["R-1"]);

    let summary = App::with_engine(ws.config(""), engine.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(engine.calls(), 0);
    assert!(summary.recognition.is_none());
    assert_eq!(
        sorted(zip_entries(&summary.archive_path.unwrap())),
        vec!["a.png", "b.png", "c.png"]
    );

    let log = std::fs::read_to_string(ws.root.join("output.txt")).unwrap();
    assert!(log.contains("OCR_API_KEY"));
}

#[tokio::test]
async fn test_empty_folder_does_nothing() {
    let ws = Workspace::new(&[]);
    let engine = FakeOcr::new(&[]);

    let summary = App::with_engine(ws.config("test-key"), engine.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.images, 0);
    assert!(summary.archive_path.is_none());
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：OCR_API_KEY=... INPUT_FOLDER=... cargo test -- --ignored
async fn test_live_run_with_real_ocr() {
    logger::init();

    let config = Config::from_env();
    assert!(config.has_credential(), "需要设置 OCR_API_KEY");

    let summary = App::initialize(config)
        .await
        .expect("初始化失败")
        .run()
        .await
        .expect("运行失败");

    println!("识别结果: {:?}", summary.recognition);
    assert!(summary.images > 0, "INPUT_FOLDER 中应该有图片");
}
