//! 대화형 셸.
//!
//! 한 줄에 명령 하나. `edit` 이후에는 `:save` 또는 `:cancel`이 나올 때까지
//! 입력 줄을 편집 버퍼로 모은다.

use smarthand_core::models::document::SelectedFile;
use smarthand_core::models::export::ExportFormat;
use smarthand_workflow::session::Session;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::render;

const HELP: &str = "\
명령:
  open <경로>          파일 선택
  upload               업로드 및 추출
  show                 결과 보기
  edit                 편집 시작 (:save 저장, :cancel 취소)
  copy                 텍스트 클립보드 복사
  download <형식>      excel | csv | text
  clear                초기화
  status               현재 상태
  health               서버 상태 확인
  help                 도움말
  quit                 종료
";

/// 셸 명령
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(PathBuf),
    Upload,
    Show,
    Edit,
    Copy,
    Download(ExportFormat),
    Clear,
    Status,
    Health,
    Help,
    Quit,
}

/// 입력 줄 파싱
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    match name.to_ascii_lowercase().as_str() {
        "open" if !rest.is_empty() => Ok(Command::Open(PathBuf::from(rest))),
        "open" => Err("사용법: open <경로>".to_string()),
        "upload" => Ok(Command::Upload),
        "show" => Ok(Command::Show),
        "edit" => Ok(Command::Edit),
        "copy" => Ok(Command::Copy),
        "download" => rest
            .parse::<ExportFormat>()
            .map(Command::Download)
            .map_err(|_| "사용법: download <excel|csv|text>".to_string()),
        "clear" => Ok(Command::Clear),
        "status" => Ok(Command::Status),
        "health" => Ok(Command::Health),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("알 수 없는 명령: {other} (help 참고)")),
    }
}

/// 줄 처리 후 계속 여부
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// 셸 상태
pub struct Repl {
    session: Session,
    /// 편집 중 입력된 줄
    draft: Option<Vec<String>>,
    /// 이미 출력한 알림 ID
    shown: HashSet<u64>,
}

impl Repl {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            draft: None,
            shown: HashSet::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// 프롬프트 문자열
    pub fn prompt(&self) -> &'static str {
        if self.draft.is_some() {
            "edit> "
        } else {
            "smarthand> "
        }
    }

    /// 한 줄 처리. 출력할 텍스트와 흐름을 돌려준다.
    pub async fn handle_line(&mut self, line: &str) -> (String, Flow) {
        let mut out = String::new();

        let flow = if self.draft.is_some() {
            self.handle_edit_line(line, &mut out);
            Flow::Continue
        } else if line.trim().is_empty() {
            Flow::Continue
        } else {
            match parse_command(line) {
                Ok(command) => self.run_command(command, &mut out).await,
                Err(message) => {
                    let _ = writeln!(out, "{message}");
                    Flow::Continue
                }
            }
        };

        out.push_str(&self.drain_notifications());
        (out, flow)
    }

    fn handle_edit_line(&mut self, line: &str, out: &mut String) {
        match line.trim_end() {
            ":save" => {
                self.draft = None;
                match self.session.save_edit() {
                    Ok(result) => {
                        let _ = writeln!(out, "{}자 저장됨", result.char_count());
                    }
                    Err(err) => {
                        let _ = writeln!(out, "{err}");
                    }
                }
            }
            ":cancel" => {
                self.draft = None;
                if let Err(err) = self.session.cancel_edit() {
                    let _ = writeln!(out, "{err}");
                } else {
                    out.push_str("편집 취소\n");
                }
            }
            text => {
                let Some(draft) = self.draft.as_mut() else {
                    return;
                };
                draft.push(text.to_string());
                let buffer = draft.join("\n");
                if let Err(err) = self.session.update_edit_buffer(buffer) {
                    let _ = writeln!(out, "{err}");
                    self.draft = None;
                }
            }
        }
    }

    async fn run_command(&mut self, command: Command, out: &mut String) -> Flow {
        debug!(?command, "셸 명령");
        match command {
            Command::Open(path) => match SelectedFile::open(&path).await {
                Ok(file) => match self.session.select_file(file) {
                    Ok(validation) if validation.is_valid => {
                        out.push_str(&render::upload_panel(&self.session.upload_view()));
                    }
                    Ok(_) => {}
                    Err(err) => {
                        let _ = writeln!(out, "{err}");
                    }
                },
                Err(err) => {
                    let _ = writeln!(out, "파일을 열 수 없습니다: {err}");
                }
            },
            Command::Upload => {
                if self.session.upload().await.is_ok() {
                    if let Some(view) = self.session.result_view() {
                        out.push_str(&render::result_panel(&view));
                    }
                }
            }
            Command::Show => match self.session.result_view() {
                Some(view) => out.push_str(&render::result_panel(&view)),
                None => out.push_str("추출 결과 없음\n"),
            },
            Command::Edit => match self.session.begin_edit() {
                Ok(()) => {
                    self.draft = Some(Vec::new());
                    out.push_str("새 텍스트를 입력하세요. :save 저장, :cancel 취소\n");
                    if let Some(text) = self.session.snapshot().displayed_text() {
                        let _ = writeln!(out, "{text}");
                    }
                }
                Err(err) => {
                    let _ = writeln!(out, "{err}");
                }
            },
            Command::Copy => {
                if !self.session.copy_text() {
                    out.push_str("복사하지 못했습니다\n");
                }
            }
            Command::Download(format) => {
                if let Ok(saved) = self.session.download(format).await {
                    let _ = writeln!(out, "{} ({} bytes)", saved.path.display(), saved.size);
                }
            }
            Command::Clear => {
                self.session.clear();
                out.push_str("초기화됨\n");
            }
            Command::Status => {
                out.push_str(&render::upload_panel(&self.session.upload_view()));
                if let Some(view) = self.session.result_view() {
                    let _ = writeln!(out, "결과: {}", view.char_count_label);
                }
            }
            Command::Health => match self.session.health().await {
                Ok(value) => {
                    let _ = writeln!(out, "서버 정상: {value}");
                }
                Err(err) => {
                    let _ = writeln!(out, "{err}");
                }
            },
            Command::Help => out.push_str(HELP),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// 아직 출력하지 않은 알림
    fn drain_notifications(&mut self) -> String {
        let fresh: Vec<_> = self
            .session
            .notifications()
            .into_iter()
            .filter(|n| self.shown.insert(n.id))
            .collect();
        render::notifications(&fresh)
    }
}

/// 표준 입출력으로 셸 실행
pub async fn run(session: Session) -> anyhow::Result<()> {
    let mut repl = Repl::new(session);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    stdout.write_all(HELP.as_bytes()).await?;
    loop {
        stdout.write_all(repl.prompt().as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let (output, flow) = repl.handle_line(&line).await;
        stdout.write_all(output.as_bytes()).await?;
        if flow == Flow::Quit {
            break;
        }
    }
    stdout.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use smarthand_core::config::AppConfig;
    use smarthand_network::http_client::HttpExtractionClient;
    use smarthand_workflow::saver::LocalFileSaver;
    use std::sync::Arc;

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse_command("open ./scans/invoice.pdf"),
            Ok(Command::Open(PathBuf::from("./scans/invoice.pdf")))
        );
        assert_eq!(parse_command("  UPLOAD "), Ok(Command::Upload));
        assert_eq!(
            parse_command("download xlsx"),
            Ok(Command::Download(ExportFormat::Excel))
        );
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
        assert!(parse_command("open").is_err());
        assert!(parse_command("download pdf").is_err());
        assert!(parse_command("fly").is_err());
    }

    fn repl_for(server_url: &str, out_dir: &std::path::Path) -> Repl {
        let mut config = AppConfig::default_config();
        config.server.base_url = server_url.to_string();
        let api = Arc::new(HttpExtractionClient::from_config(&config).unwrap());
        let saver = Arc::new(LocalFileSaver::new(out_dir));
        Repl::new(Session::from_config(&config, api, saver))
    }

    #[tokio::test]
    async fn open_upload_edit_download() {
        let mut server = mockito::Server::new_async().await;
        let _extract = server
            .mock("POST", "/api/extract")
            .with_status(200)
            .with_body(
                r#"{"success":true,"data":{"rawText":"Total: $100","downloadFormats":[{"format":"csv","endpoint":"/api/export/csv"}]}}"#,
            )
            .create_async()
            .await;
        let export = server
            .mock("GET", "/api/export/csv")
            .match_query(mockito::Matcher::Regex("Total.*200".to_string()))
            .with_status(200)
            .with_body("text\nTotal: $200\n")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("invoice.pdf");
        std::fs::write(&input, b"%PDF-1.7 fake").unwrap();
        let out_dir = dir.path().join("out");
        let mut repl = repl_for(&server.url(), &out_dir);

        let (out, _) = repl.handle_line(&format!("open {}", input.display())).await;
        assert!(out.contains("[PDF] invoice.pdf"));

        let (out, _) = repl.handle_line("upload").await;
        assert!(out.contains("11 characters extracted"));
        assert!(out.contains("File processed successfully!"));

        let (_, _) = repl.handle_line("edit").await;
        assert_eq!(repl.prompt(), "edit> ");
        repl.handle_line("Total: $200").await;
        let (out, _) = repl.handle_line(":save").await;
        assert!(out.contains("Text saved successfully!"));
        assert_eq!(repl.prompt(), "smarthand> ");

        let (out, _) = repl.handle_line("download csv").await;
        assert!(out.contains("invoice-edited.csv"));
        assert!(out.contains("Downloaded as CSV successfully!"));
        export.assert_async().await;
        assert_eq!(
            std::fs::read_to_string(out_dir.join("invoice-edited.csv")).unwrap(),
            "text\nTotal: $200\n"
        );

        // 이미 출력한 알림은 다시 나오지 않는다
        let (out, _) = repl.handle_line("status").await;
        assert!(!out.contains("successfully"));
    }

    #[tokio::test]
    async fn rejected_file_prints_reason() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.zip");
        std::fs::write(&input, b"PK").unwrap();
        let mut repl = repl_for("http://127.0.0.1:9", dir.path());

        let (out, _) = repl.handle_line(&format!("open {}", input.display())).await;
        assert!(out.contains("File type not supported"));

        let (out, _) = repl.handle_line("upload").await;
        assert!(out.contains("Please select a file first"));
    }

    #[tokio::test]
    async fn cancel_and_quit() {
        let mut repl = repl_for("http://127.0.0.1:9", std::path::Path::new("."));
        let (out, _) = repl.handle_line("edit").await;
        assert!(out.contains("편집할 추출 결과가 없습니다"));
        assert_eq!(repl.prompt(), "smarthand> ");

        let (_, flow) = repl.handle_line("quit").await;
        assert_eq!(flow, Flow::Quit);
    }
}
