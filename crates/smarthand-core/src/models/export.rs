//! 내보내기 형식 및 요청 페이로드.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::models::extraction::ExtractionResult;

/// 백엔드가 지원하는 내보내기 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// 엑셀 스프레드시트
    Excel,
    /// CSV
    Csv,
    /// 일반 텍스트
    Text,
}

impl ExportFormat {
    /// 전체 형식 (표시 순서)
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Excel, ExportFormat::Csv, ExportFormat::Text];

    /// 형식 식별자 (백엔드 `format` 필드와 동일)
    pub fn id(self) -> &'static str {
        match self {
            ExportFormat::Excel => "excel",
            ExportFormat::Csv => "csv",
            ExportFormat::Text => "text",
        }
    }

    /// 저장 파일 확장자
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Excel => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::Text => "txt",
        }
    }

    /// 백엔드 기본 엔드포인트
    pub fn default_endpoint(self) -> &'static str {
        match self {
            ExportFormat::Excel => "/api/export/excel",
            ExportFormat::Csv => "/api/export/csv",
            ExportFormat::Text => "/api/export/text",
        }
    }

    /// 기본 설명
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Excel => "Excel spreadsheet",
            ExportFormat::Csv => "Comma-separated values",
            ExportFormat::Text => "Editable plain text",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ExportFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "csv" => Ok(ExportFormat::Csv),
            "text" | "txt" => Ok(ExportFormat::Text),
            other => Err(CoreError::NotFound {
                resource_type: "다운로드 형식".to_string(),
                id: other.to_string(),
            }),
        }
    }
}

/// 내보내기 요청에 첨부되는 메타데이터
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    /// 업로드한 원본 파일 이름
    pub original_filename: Option<String>,
    /// 편집 여부
    pub is_edited: bool,
    /// 편집 시각
    pub edited_at: Option<DateTime<Utc>>,
    /// 현재 텍스트 문자 수
    pub character_count: usize,
    /// 다운로드 요청 시각
    pub downloaded_at: DateTime<Utc>,
}

/// `GET <endpoint>?data=...` 의 `data` 값
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPayload {
    /// 현재 결과 (편집 반영)
    #[serde(flatten)]
    pub result: ExtractionResult,
    /// 메타데이터
    pub metadata: ExportMetadata,
}

impl ExportPayload {
    /// 현재 결과로 페이로드 구성
    pub fn new(
        result: &ExtractionResult,
        original_filename: Option<&str>,
        downloaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            metadata: ExportMetadata {
                original_filename: original_filename.map(str::to_string),
                is_edited: result.is_edited,
                edited_at: result.edited_at,
                character_count: result.char_count(),
                downloaded_at,
            },
            result: result.clone(),
        }
    }
}
