//! 화면 표시용 뷰 모델.
//!
//! `AppState` 스냅샷에서 계산되는 읽기 전용 값. 렌더러(CLI 등)는 이 구조체만 본다.

use serde::Serialize;
use smarthand_core::models::document::SelectedFile;
use smarthand_core::models::export::ExportFormat;

use crate::state::{AppState, DownloadState, EditorState, UploadPhase};

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// 사람이 읽는 파일 크기 ("0 Bytes", "1.5 KB", "2 MB")
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

/// 천 단위 구분 기호 (1234567 → "1,234,567")
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// 필드 키 → 표시 라벨 (`invoiceNumber` → `INVOICE NUMBER`)
pub fn humanize_key(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in key.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if ch.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words.join(" ").to_uppercase()
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// 선택된 파일 카드
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCard {
    pub name: String,
    pub size_label: String,
    pub kind: String,
}

impl FileCard {
    pub fn from_file(file: &SelectedFile) -> Self {
        Self {
            name: file.name.clone(),
            size_label: format_file_size(file.size),
            kind: file.kind_label().to_string(),
        }
    }
}

/// 구조화 필드 한 줄
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRow {
    pub key: String,
    pub label: String,
    pub value: String,
}

/// 다운로드 버튼
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadButton {
    /// 백엔드 형식 식별자
    pub format_id: String,
    /// 알려진 형식이면 Some
    pub format: Option<ExportFormat>,
    pub label: String,
    pub enabled: bool,
    /// 이 형식이 다운로드 중인지
    pub pending: bool,
}

/// 결과 패널
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultView {
    /// 표시 텍스트 (편집 중이면 버퍼)
    pub text: String,
    pub is_editing: bool,
    pub is_edited: bool,
    pub char_count: usize,
    /// "11 characters extracted"
    pub char_count_label: String,
    pub fields: Vec<FieldRow>,
    pub entity_count: Option<usize>,
    pub table_count: Option<usize>,
    pub downloads: Vec<DownloadButton>,
}

impl ResultView {
    /// 결과가 있을 때만 생성
    pub fn from_state(state: &AppState) -> Option<Self> {
        let result = state.result()?;
        let text = state.displayed_text().unwrap_or_default().to_string();
        let char_count = text.chars().count();

        let fields = result
            .structured_data
            .iter()
            .flatten()
            .map(|(key, value)| FieldRow {
                key: key.clone(),
                label: humanize_key(key),
                value: display_value(value),
            })
            .collect();

        let pending = match state.download {
            DownloadState::Pending { format, .. } => Some(format),
            DownloadState::Idle => None,
        };
        let can_download = state.can_download();

        let downloads = result
            .download_formats
            .iter()
            .map(|entry| {
                let format = entry.format.parse::<ExportFormat>().ok();
                let label = entry
                    .description
                    .clone()
                    .or_else(|| format.map(|f| f.label().to_string()))
                    .unwrap_or_else(|| entry.format.clone());
                DownloadButton {
                    format_id: entry.format.clone(),
                    format,
                    label,
                    enabled: can_download && format.is_some(),
                    pending: format.is_some() && format == pending,
                }
            })
            .collect();

        Some(Self {
            char_count_label: format!("{} characters extracted", format_count(char_count)),
            text,
            is_editing: matches!(state.editor, EditorState::Editing { .. }),
            is_edited: result.is_edited,
            char_count,
            fields,
            entity_count: result.entities.as_ref().map(Vec::len),
            table_count: result.tables.as_ref().map(Vec::len),
            downloads,
        })
    }

    /// 형식 버튼 찾기
    pub fn button(&self, format: ExportFormat) -> Option<&DownloadButton> {
        self.downloads.iter().find(|b| b.format == Some(format))
    }
}

/// 업로드 영역 요약
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadView {
    pub file: Option<FileCard>,
    /// 진행률 (업로드 중일 때만)
    pub progress: Option<u8>,
    pub can_upload: bool,
    pub error: Option<String>,
}

impl UploadView {
    pub fn from_state(state: &AppState) -> Self {
        let progress = match &state.upload {
            UploadPhase::Uploading { progress, .. } => Some(*progress),
            _ => None,
        };
        Self {
            file: state.file().map(FileCard::from_file),
            progress,
            can_upload: state.can_upload(),
            error: state.error.clone(),
        }
    }
}
