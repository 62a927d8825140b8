use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::clients::{ChatBackend, LlmClient};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{read_file, table_rows};
use crate::services::ExportService;
use crate::ui::{render, Command};
use crate::utils::logging;
use crate::workflow::{GenerateFlow, SessionCtx};

/// 创建 LLM 客户端的工厂
pub type Connector<B> = fn(&Config) -> AppResult<B>;

/// 应用主结构
///
/// 持有配置和唯一的会话上下文，逐行读取命令并执行
pub struct App<B> {
    config: Config,
    connect: Connector<B>,
    session: SessionCtx,
    flow: GenerateFlow,
}

impl App<LlmClient> {
    /// 初始化应用（使用真实的 LLM 客户端）
    pub fn initialize(config: Config) -> AppResult<Self> {
        Self::with_connector(config, LlmClient::new)
    }
}

impl<B: ChatBackend> App<B> {
    /// 使用自定义客户端工厂初始化
    pub fn with_connector(config: Config, connect: Connector<B>) -> AppResult<Self> {
        if let Some(log_file) = &config.session_log_file {
            logging::init_log_file(log_file)?;
        }
        logging::log_startup(&config);

        Ok(Self {
            flow: GenerateFlow::new(config.strict_schema),
            config,
            connect,
            session: SessionCtx::new(),
        })
    }

    pub fn session(&self) -> &SessionCtx {
        &self.session
    }

    /// 在标准输入输出上运行
    pub async fn run(&mut self) -> AppResult<()> {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.run_with(stdin, stdout).await
    }

    /// 运行主循环，直到输入结束或收到 quit
    pub async fn run_with<R, W>(&mut self, input: R, mut output: W) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        write_out(&mut output, &render::render_banner()).await?;

        let mut lines = input.lines();
        loop {
            write_out(&mut output, "> ").await?;
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => return Err(AppError::io("stdin", e)),
            };

            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    write_out(&mut output, &format!("{}\n", e)).await?;
                    continue;
                }
            };

            if command == Command::Quit {
                break;
            }

            let text = self.handle(command).await;
            write_out(&mut output, &text).await?;
        }

        info!("👋 会话结束");
        Ok(())
    }

    /// 执行一条命令，返回要展示的文本
    ///
    /// 所有错误都在这里转换为展示文本，不会中断主循环
    pub async fn handle(&mut self, command: Command) -> String {
        match command {
            Command::File(path) => self.upload(&path).await,
            Command::Count(count) => match self.session.set_mcq_count(count) {
                Ok(()) => format!("Number of MCQs: {}\n", count),
                Err(e) => format!("{}\n", e),
            },
            Command::Subject(subject) => {
                self.session.set_subject(subject);
                format!("Subject: {}\n", subject)
            }
            Command::Tone(tone) => {
                self.session.set_tone(tone);
                format!("Tone: {}\n", tone)
            }
            Command::Generate => {
                if let Err(e) = self.session.submit() {
                    return format!("{}\n", e);
                }
                self.generate().await
            }
            Command::Retry => {
                if self.session.is_pending() {
                    self.generate().await
                } else {
                    "没有需要重试的请求\n".to_string()
                }
            }
            Command::Show => render::render_file_content(&self.session),
            Command::Save(dir) => self.save(dir).await,
            Command::Status => render::render_status(&self.session),
            Command::Reset => {
                self.session.reset();
                self.session_log("reset");
                "会话已重置\n".to_string()
            }
            Command::Help => render::render_help(),
            Command::Quit => String::new(),
        }
    }

    async fn upload(&mut self, path: &Path) -> String {
        match read_file(path).await {
            Ok(text) => {
                let chars = text.chars().count();
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                self.session.set_file(name.clone(), text);
                self.session_log(&format!("upload {} ({} chars)", name, chars));
                format!("已读取 {}，共 {} 个字符\n", name, chars)
            }
            Err(e) => {
                warn!("读取文件失败: {}", e);
                format!("{}\n", e)
            }
        }
    }

    async fn generate(&mut self) -> String {
        let config = &self.config;
        let connect = self.connect;
        let outcome = self.flow.run(&mut self.session, || connect(config)).await;

        match outcome {
            Ok(()) => match self.session.result() {
                Some(result) => {
                    logging::log_usage(&result.usage);
                    let text = render::render_result(result);
                    self.session_log(&format!("generate ok, {} tokens", result.usage.total_tokens));
                    text
                }
                None => String::new(),
            },
            Err(e) => {
                self.session_log(&format!("generate failed: {}", e));
                match self.session.last_error() {
                    Some(report) => render::render_error(report),
                    None => format!("{}\n", e),
                }
            }
        }
    }

    /// 下载 mcqs.csv 和 mcqs.json
    ///
    /// CSV 来自去掉代码块后的题目；JSON 是模型原样返回的字符串
    async fn save(&self, dir: Option<PathBuf>) -> String {
        let Some(result) = self.session.result() else {
            return "还没有可下载的结果，请先 generate\n".to_string();
        };
        let Some(rows) = table_rows(&result.quiz) else {
            return "题目无法转换为表格，没有可下载的内容\n".to_string();
        };

        let dir = dir.unwrap_or_else(|| PathBuf::from(&self.config.output_dir));
        match ExportService::new(dir).save(&rows, &result.raw_quiz).await {
            Ok(files) => format!(
                "已下载: {}\n已下载: {}\n",
                files.csv_path.display(),
                files.json_path.display()
            ),
            Err(e) => format!("{}\n", e),
        }
    }

    /// 写会话日志，失败只记录警告
    fn session_log(&self, line: &str) {
        if let Some(log_file) = &self.config.session_log_file {
            if let Err(e) = logging::append_log_line(log_file, line) {
                warn!("写入会话日志失败: {}", e);
            }
        }
    }
}

async fn write_out<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> AppResult<()> {
    output
        .write_all(text.as_bytes())
        .await
        .map_err(|e| AppError::io("stdout", e))?;
    output.flush().await.map_err(|e| AppError::io("stdout", e))
}
