//! # smarthand-app
//!
//! SmartHand OCR 클라이언트 바이너리 진입점.
//! 설정 로드, 어댑터 와이어링, 서브커맨드 실행.

mod clipboard;
mod render;
mod repl;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use directories::{ProjectDirs, UserDirs};
use smarthand_core::config::AppConfig;
use smarthand_core::config_manager::{ConfigManager, CONFIG_FILE_NAME};
use smarthand_core::models::document::SelectedFile;
use smarthand_core::models::export::ExportFormat;
use smarthand_core::ports::clipboard::ClipboardWriter;
use smarthand_network::http_client::HttpExtractionClient;
use smarthand_workflow::saver::LocalFileSaver;
use smarthand_workflow::session::Session;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::clipboard::SystemClipboard;

/// 백엔드 URL 환경 변수
const API_URL_ENV: &str = "SMARTHAND_API_URL";

/// 업로드 진행률 출력 간격
const PROGRESS_TICK: Duration = Duration::from_millis(200);

/// SmartHand OCR 클라이언트
///
/// 문서를 추출 서비스에 올리고 결과를 확인/편집/내보낸다.
#[derive(Parser, Debug)]
#[command(name = "smarthand")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 추출 서비스 URL (기본: 설정 파일, 환경 변수 SMARTHAND_API_URL)
    #[arg(long, short = 's', global = true)]
    server: Option<String>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "warn", global = true)]
    log_level: String,

    /// 설정 파일 경로
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 요청 타임아웃 (초)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 서버 상태 확인
    Health,
    /// 문서 추출 후 결과 출력
    Extract {
        /// 문서 경로 (pdf, jpg, jpeg, png, doc, docx)
        file: PathBuf,
        /// 결과를 JSON으로 출력
        #[arg(long)]
        json: bool,
    },
    /// 문서 추출 후 지정 형식으로 저장
    Export {
        /// 문서 경로
        file: PathBuf,
        /// 내보내기 형식 (excel, csv, text)
        #[arg(long, short = 'f')]
        format: ExportFormat,
        /// 저장 디렉토리
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
        /// 추출 텍스트 대신 저장할 편집 텍스트 파일
        #[arg(long)]
        edited_text: Option<PathBuf>,
    },
    /// 대화형 셸 (기본)
    Interactive,
}

/// 설정 파일 경로 결정 (CLI 인자 또는 플랫폼별 기본 경로)
///
/// # 플랫폼별 기본 경로:
/// - macOS: `~/Library/Application Support/com.smarthand.smarthand/config.json`
/// - Windows: `%APPDATA%\smarthand\smarthand\config\config.json`
/// - Linux: `~/.config/smarthand/config.json`
fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| {
            ProjectDirs::from("com", "smarthand", "smarthand")
                .map(|p| p.config_dir().join(CONFIG_FILE_NAME))
        })
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// 내보내기 저장 디렉토리 (CLI → 설정 → 다운로드 폴더 → 현재 디렉토리)
fn resolve_output_dir(cli: Option<&Path>, config: &AppConfig) -> PathBuf {
    cli.map(Path::to_path_buf)
        .or_else(|| config.download.output_dir.clone())
        .or_else(|| UserDirs::new().and_then(|u| u.download_dir().map(Path::to_path_buf)))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// 설정 로드 + 실행 시점 덮어쓰기 (파일에는 저장하지 않음)
fn load_config(args: &Args) -> Result<AppConfig> {
    let path = resolve_config_path(args.config.as_deref());
    let manager = ConfigManager::load_or_init(path.clone())
        .with_context(|| format!("설정 파일 로드 실패: {}", path.display()))?;
    info!("설정 파일: {:?}", manager.path());

    let env_url = std::env::var(API_URL_ENV).ok().filter(|v| !v.trim().is_empty());
    apply_overrides(
        manager.current(),
        args.server.as_deref(),
        env_url.as_deref(),
        args.timeout_secs,
    )
}

/// 우선순위: `--server` > 환경 변수 > 설정 파일
fn apply_overrides(
    mut config: AppConfig,
    server: Option<&str>,
    env_url: Option<&str>,
    timeout_secs: Option<u64>,
) -> Result<AppConfig> {
    if let Some(url) = server.or(env_url) {
        config.server.base_url = url.trim().to_string();
    }
    if let Some(secs) = timeout_secs {
        config.server.request_timeout_ms = secs.saturating_mul(1000);
    }
    config
        .validate()
        .map_err(|e| anyhow!("설정 검증 실패: {e}"))?;
    Ok(config)
}

/// 어댑터 와이어링
fn build_session(config: &AppConfig, output_dir: PathBuf, with_clipboard: bool) -> Result<Session> {
    let api = Arc::new(HttpExtractionClient::from_config(config)?);
    let saver = Arc::new(LocalFileSaver::new(output_dir));
    let session = Session::from_config(config, api, saver);

    if !with_clipboard {
        return Ok(session);
    }
    match SystemClipboard::new() {
        Ok(clipboard) => Ok(session.with_clipboard(Arc::new(clipboard) as Arc<dyn ClipboardWriter>)),
        Err(e) => {
            warn!("클립보드 사용 불가, 복사 비활성화: {e}");
            Ok(session)
        }
    }
}

/// 파일 선택. 검증 실패 시 사유와 함께 종료.
async fn select(session: &Session, path: &Path) -> Result<()> {
    let file = SelectedFile::open(path)
        .await
        .with_context(|| format!("파일을 열 수 없습니다: {}", path.display()))?;
    let validation = session.select_file(file)?;
    if !validation.is_valid {
        bail!("{}", validation.errors.join(", "));
    }
    eprint!("{}", render::upload_panel(&session.upload_view()));
    Ok(())
}

/// 업로드하면서 진행률을 stderr에 표시
async fn upload_with_progress(session: &Session) -> Result<()> {
    let upload = session.upload();
    tokio::pin!(upload);
    let mut ticker = tokio::time::interval(PROGRESS_TICK);

    let outcome = loop {
        tokio::select! {
            outcome = &mut upload => break outcome,
            _ = ticker.tick() => {
                if let Some(progress) = session.upload_view().progress {
                    eprint!("\r업로드 중... {progress:>3}%");
                }
            }
        }
    };
    eprintln!();

    outcome.map(|_| ()).map_err(|e| {
        let message = session
            .snapshot()
            .error
            .unwrap_or_else(|| e.user_message());
        anyhow!(message)
    })
}

async fn run_health(session: &Session) -> Result<()> {
    let value = session.health().await?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

async fn run_extract(session: &Session, file: &Path, json: bool) -> Result<()> {
    select(session, file).await?;
    upload_with_progress(session).await?;

    let state = session.snapshot();
    let result = state
        .result()
        .ok_or_else(|| anyhow!("추출 결과가 없습니다"))?;
    if json {
        println!("{}", serde_json::to_string_pretty(result.as_ref())?);
    } else if let Some(view) = session.result_view() {
        print!("{}", render::result_panel(&view));
    }
    Ok(())
}

async fn run_export(
    session: &Session,
    file: &Path,
    format: ExportFormat,
    edited_text: Option<&Path>,
) -> Result<()> {
    select(session, file).await?;
    upload_with_progress(session).await?;

    if let Some(path) = edited_text {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("편집 텍스트를 읽을 수 없습니다: {}", path.display()))?;
        session.begin_edit()?;
        session.update_edit_buffer(text)?;
        session.save_edit()?;
        debug!("편집 텍스트 적용: {}", path.display());
    }

    match session.download(format).await {
        Ok(saved) => {
            eprint!("{}", render::notifications(&session.notifications()));
            println!("{}", saved.path.display());
            Ok(())
        }
        Err(e) => bail!("Failed to download {}: {}", format, e.user_message()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // tracing 초기화
    let log_filter = format!(
        "smarthand={},smarthand_app={},smarthand_core={},smarthand_network={},smarthand_workflow={}",
        args.log_level, args.log_level, args.log_level, args.log_level, args.log_level
    );
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    let config = load_config(&args)?;
    info!(
        base_url = %config.server.base_url,
        timeout_ms = config.server.request_timeout_ms,
        "SmartHand 클라이언트 시작"
    );

    match args.command.unwrap_or(Command::Interactive) {
        Command::Health => {
            let session = build_session(&config, PathBuf::from("."), false)?;
            run_health(&session).await
        }
        Command::Extract { file, json } => {
            let session = build_session(&config, PathBuf::from("."), false)?;
            run_extract(&session, &file, json).await
        }
        Command::Export {
            file,
            format,
            out,
            edited_text,
        } => {
            let output_dir = resolve_output_dir(out.as_deref(), &config);
            let session = build_session(&config, output_dir, false)?;
            run_export(&session, &file, format, edited_text.as_deref()).await
        }
        Command::Interactive => {
            let output_dir = resolve_output_dir(None, &config);
            info!("내보내기 저장 위치: {}", output_dir.display());
            let session = build_session(&config, output_dir, true)?;
            repl::run(session).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_export() {
        let args = Args::try_parse_from([
            "smarthand",
            "-s",
            "http://ocr.local:5050",
            "export",
            "invoice.pdf",
            "--format",
            "xlsx",
            "--out",
            "/tmp/out",
        ])
        .unwrap();
        assert_eq!(args.server.as_deref(), Some("http://ocr.local:5050"));
        match args.command {
            Some(Command::Export { format, out, .. }) => {
                assert_eq!(format, ExportFormat::Excel);
                assert_eq!(out, Some(PathBuf::from("/tmp/out")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_defaults_to_interactive() {
        let args = Args::try_parse_from(["smarthand"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.log_level, "warn");
    }

    #[test]
    fn cli_rejects_unknown_format() {
        assert!(Args::try_parse_from(["smarthand", "export", "a.pdf", "-f", "pdf"]).is_err());
    }

    #[test]
    fn server_flag_beats_env() {
        let config = apply_overrides(
            AppConfig::default_config(),
            Some("http://flag:1"),
            Some("http://env:2"),
            Some(5),
        )
        .unwrap();
        assert_eq!(config.server.base_url, "http://flag:1");
        assert_eq!(config.server.request_timeout_ms, 5_000);

        let config =
            apply_overrides(AppConfig::default_config(), None, Some("http://env:2"), None).unwrap();
        assert_eq!(config.server.base_url, "http://env:2");
    }

    #[test]
    fn invalid_override_is_rejected() {
        assert!(apply_overrides(AppConfig::default_config(), Some("ftp://x"), None, None).is_err());
        assert!(apply_overrides(AppConfig::default_config(), None, None, Some(0)).is_err());
    }

    #[test]
    fn explicit_paths_win() {
        assert_eq!(
            resolve_config_path(Some(Path::new("/etc/smarthand.json"))),
            PathBuf::from("/etc/smarthand.json")
        );

        let mut config = AppConfig::default_config();
        config.download.output_dir = Some(PathBuf::from("/data/exports"));
        assert_eq!(resolve_output_dir(None, &config), PathBuf::from("/data/exports"));
        assert_eq!(
            resolve_output_dir(Some(Path::new("out")), &config),
            PathBuf::from("out")
        );
    }
}
