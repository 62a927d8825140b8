use mcq_generator::config::Config;
use mcq_generator::models::{read_file, table_rows};
use mcq_generator::ui::Command;
use mcq_generator::{App, AppResult, ChatBackend, ChatReply, Phase, TokenUsage};
use tokio_test::{assert_err, assert_ok};

const QUIZ: &str = r#"{
  "1": {"mcq": "Which river flows through Cairo?", "options": {"a": "Nile", "b": "Amazon", "c": "Danube", "d": "Volga"}, "correct": "a"},
  "2": {"mcq": "Which city was Byzantium?", "options": {"a": "Rome", "b": "Athens", "c": "Istanbul", "d": "Sparta"}, "correct": "c"}
}"#;

/// 按提示词内容返回固定回复的后端
struct ScriptedBackend;

impl ChatBackend for ScriptedBackend {
    async fn chat(&self, user_message: &str, _system: Option<&str>) -> AppResult<ChatReply> {
        let content = if user_message.contains("RESPONSE_JSON") {
            format!("```json\n{}\n```", QUIZ)
        } else {
            "The quiz suits history students.".to_string()
        };
        Ok(ChatReply {
            content,
            usage: TokenUsage::for_call("gpt-3.5-turbo", 400, 120),
        })
    }

    fn model_name(&self) -> &str {
        "gpt-3.5-turbo"
    }
}

fn scripted(_config: &Config) -> AppResult<ScriptedBackend> {
    Ok(ScriptedBackend)
}

fn test_config(output_dir: &std::path::Path) -> Config {
    Config {
        llm_api_key: Some("sk-test".to_string()),
        output_dir: output_dir.display().to_string(),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_full_session_generate_save_reset() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("notes.txt");
    std::fs::write(&source, "Ancient cities and rivers.").unwrap();
    let downloads = dir.path().join("downloads");

    let script = format!(
        "file {}\ncount 2\nsubject history\ntone hard\ngenerate\nsave {}\nreset\nstatus\nquit\n",
        source.display(),
        downloads.display()
    );

    let mut app = App::with_connector(test_config(dir.path()), scripted).unwrap();
    let mut output = Vec::new();
    app.run_with(script.as_bytes(), &mut output).await.unwrap();
    let output = String::from_utf8(output).unwrap();

    assert!(output.contains("== Quiz Analysis =="), "{}", output);
    assert!(output.contains("The quiz suits history students."));
    assert!(output.contains("== Generated MCQs =="));
    assert!(output.contains("Which city was Byzantium?"));
    assert!(output.contains("Total Tokens: 1040"));
    assert!(output.contains("会话已重置"));

    let csv = std::fs::read_to_string(downloads.join("mcqs.csv")).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.starts_with("MCQ,Choices,Correct\n"));
    // mcqs.json 保留模型的原始回复，包括代码块包裹
    let json = std::fs::read_to_string(downloads.join("mcqs.json")).unwrap();
    assert_eq!(json, format!("```json\n{}\n```", QUIZ));

    assert!(app.session().is_initial());
}

#[tokio::test]
async fn test_missing_api_key_reports_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("notes.txt");
    std::fs::write(&source, "text").unwrap();

    let config = Config {
        output_dir: dir.path().display().to_string(),
        ..Config::default()
    };
    let mut app = App::initialize(config).unwrap();

    let upload = app.handle(Command::File(source)).await;
    assert!(upload.contains("notes.txt"));

    let text = app.handle(Command::Generate).await;
    assert!(text.contains("OPENAI_API_KEY"), "{}", text);
    assert_eq!(app.session().phase(), Phase::ShowingError);
    assert!(app.session().is_pending());

    // 失败后没有可下载的内容
    let save = app.handle(Command::Save(None)).await;
    assert!(save.contains("generate"));
}

#[tokio::test]
async fn test_retry_after_failure_uses_same_request() {
    fn failing(_config: &Config) -> AppResult<ScriptedBackend> {
        Err(mcq_generator::AppError::remote_call("gpt-3.5-turbo", "503 Service Unavailable"))
    }

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("notes.txt");
    std::fs::write(&source, "text").unwrap();

    let mut app = App::with_connector(test_config(dir.path()), failing).unwrap();
    app.handle(Command::File(source)).await;
    let text = app.handle(Command::Generate).await;
    assert!(text.contains("503 Service Unavailable"));
    assert!(app.session().is_pending());

    // 再次失败时待处理标记依然保留
    let text = app.handle(Command::Retry).await;
    assert!(text.contains("503 Service Unavailable"));
    assert!(app.session().is_pending());
}

#[tokio::test]
async fn test_generate_without_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::with_connector(test_config(dir.path()), scripted).unwrap();

    let text = app.handle(Command::Generate).await;
    assert!(text.contains("请先上传"));
    assert!(!app.session().is_pending());
}

#[tokio::test]
async fn test_unsupported_upload_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("slides.pptx");
    std::fs::write(&source, "binary").unwrap();

    let err = assert_err!(read_file(&source).await);
    assert_eq!(err.kind(), "UnsupportedInput");

    let mut app = App::with_connector(test_config(dir.path()), scripted).unwrap();
    let text = app.handle(Command::File(source)).await;
    assert!(text.contains("仅支持 PDF 和 TXT"));
    assert!(app.session().text.is_none());
}

#[tokio::test]
async fn test_text_upload_is_exact() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("chapter.TXT");
    let content = "Line one\n\nLine three with ünïcödé\n";
    std::fs::write(&source, content).unwrap();

    let text = assert_ok!(read_file(&source).await);
    assert_eq!(text, content);
}

#[tokio::test]
async fn test_pdf_upload_extracts_text() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("hello.pdf");
    std::fs::write(&source, build_pdf("Hello Quiz World")).unwrap();

    let text = assert_ok!(read_file(&source).await);
    assert!(text.contains("Hello"), "提取结果: {:?}", text);
}

#[test]
fn test_table_rows_match_entry_count() {
    let rows = table_rows(QUIZ).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].correct, "c");
    assert!(table_rows("{\"1\": ").is_none());
}

/// 测试真实 API 的完整生成流程
///
/// 运行方式：
/// ```bash
/// OPENAI_API_KEY=... cargo test test_live_generation -- --ignored --nocapture
/// ```
#[tokio::test]
#[ignore]
async fn test_live_generation() {
    mcq_generator::logger::init();

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("notes.txt");
    std::fs::write(
        &source,
        "The mitochondria is the powerhouse of the cell. It produces ATP through respiration.",
    )
    .unwrap();

    let mut config = Config::from_env().unwrap();
    config.output_dir = dir.path().display().to_string();
    let mut app = App::initialize(config).unwrap();

    app.handle(Command::File(source)).await;
    app.handle(Command::Count(2)).await;
    let text = app.handle(Command::Generate).await;
    println!("{}", text);

    assert_eq!(app.session().phase(), Phase::ShowingResult);
}

/// 生成只有一页文字的 PDF
fn build_pdf(text: &str) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![72.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}
