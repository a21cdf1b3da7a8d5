//! 다운로드 오케스트레이터.
//!
//! 형식 → 엔드포인트 해석, 저장 파일 이름 결정, 페이로드 구성,
//! 내보내기 요청, 저장까지 한 번에 처리한다. 상태는 건드리지 않는다.

use chrono::Utc;
use smarthand_core::error::CoreError;
use smarthand_core::models::export::{ExportFormat, ExportPayload};
use smarthand_core::models::extraction::{DownloadFormatEntry, ExtractionResult};
use smarthand_core::ports::extraction_api::ExtractionApi;
use smarthand_core::ports::file_saver::FileSaver;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// 원본 이름이 없을 때 쓰는 기본 이름
pub const FALLBACK_BASE_NAME: &str = "extracted-data";

/// 저장 파일 이름 결정
///
/// 마지막 확장자만 떼고, 편집된 결과면 `-edited`를 붙인 뒤 형식 확장자를 붙인다.
pub fn derive_filename(original: Option<&str>, format: ExportFormat, is_edited: bool) -> String {
    let base = original
        .map(str::trim)
        .map(|name| match name.rsplit_once('.') {
            Some((stem, ext)) if !ext.is_empty() => stem,
            _ => name,
        })
        .filter(|stem| !stem.is_empty())
        .unwrap_or(FALLBACK_BASE_NAME);

    let suffix = if is_edited { "-edited" } else { "" };
    format!("{base}{suffix}.{}", format.extension())
}

/// 백엔드 형식 목록에서 엔드포인트 찾기
pub fn resolve_endpoint(
    format: ExportFormat,
    formats: &[DownloadFormatEntry],
) -> Result<&str, CoreError> {
    formats
        .iter()
        .find(|entry| entry.format.parse::<ExportFormat>().ok() == Some(format))
        .map(|entry| entry.endpoint.as_str())
        .ok_or_else(|| CoreError::NotFound {
            resource_type: "다운로드 형식".to_string(),
            id: format.id().to_string(),
        })
}

/// 저장 완료된 내보내기
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedExport {
    pub format: ExportFormat,
    pub filename: String,
    pub path: PathBuf,
    pub size: usize,
}

/// 내보내기 요청 + 저장
#[derive(Clone)]
pub struct DownloadOrchestrator {
    api: Arc<dyn ExtractionApi>,
    saver: Arc<dyn FileSaver>,
}

impl DownloadOrchestrator {
    pub fn new(api: Arc<dyn ExtractionApi>, saver: Arc<dyn FileSaver>) -> Self {
        Self { api, saver }
    }

    /// 다운로드 실행
    ///
    /// 실패해도 `result`는 바뀌지 않는다 (불변 참조만 받음).
    pub async fn download(
        &self,
        format: ExportFormat,
        formats: &[DownloadFormatEntry],
        result: &ExtractionResult,
        original_filename: Option<&str>,
    ) -> Result<SavedExport, CoreError> {
        let endpoint = resolve_endpoint(format, formats)?;
        let filename = derive_filename(original_filename, format, result.is_edited);
        let payload = ExportPayload::new(result, original_filename, Utc::now());

        debug!(format = %format, endpoint, filename = %filename, "내보내기 요청");
        let content = self.api.export(endpoint, &payload).await?;

        let path = self.saver.save(&filename, &content).await?;
        info!(format = %format, bytes = content.len(), "내보내기 완료: {}", path.display());

        Ok(SavedExport {
            format,
            filename,
            path,
            size: content.len(),
        })
    }
}
