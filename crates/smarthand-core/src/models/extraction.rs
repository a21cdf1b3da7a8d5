//! 추출 결과 모델.
//!
//! 백엔드 `POST /api/extract` 응답 본문과 일치한다 (camelCase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 백엔드가 제공하는 다운로드 형식 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadFormatEntry {
    /// 형식 식별자 ("excel", "csv", "text")
    pub format: String,
    /// 내보내기 엔드포인트 (상대 경로 또는 절대 URL)
    pub endpoint: String,
    /// 사람이 읽는 설명
    #[serde(default)]
    pub description: Option<String>,
}

/// 문서 추출 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// 추출된 원문 텍스트
    pub raw_text: String,
    /// 구조화 필드 (필드명 → 값, 백엔드가 보낸 순서)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_data: Option<serde_json::Map<String, serde_json::Value>>,
    /// 인식된 엔티티
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<serde_json::Value>>,
    /// 감지된 표
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<serde_json::Value>>,
    /// 지원 다운로드 형식
    #[serde(default)]
    pub download_formats: Vec<DownloadFormatEntry>,
    /// 사용자 편집 여부
    #[serde(default)]
    pub is_edited: bool,
    /// 마지막 편집 시각
    #[serde(default)]
    pub edited_at: Option<DateTime<Utc>>,
    /// 편집 전 원문
    #[serde(default)]
    pub original_text: Option<String>,
}

impl ExtractionResult {
    /// 텍스트만 있는 결과 생성
    pub fn from_text(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            structured_data: None,
            entities: None,
            tables: None,
            download_formats: Vec::new(),
            is_edited: false,
            edited_at: None,
            original_text: None,
        }
    }

    /// 업로드 직후 상태로 정규화: 편집 표시 해제, 원문 스냅샷 기록
    pub fn into_fresh(self) -> Self {
        let original_text = Some(self.raw_text.clone());
        Self {
            is_edited: false,
            edited_at: None,
            original_text,
            ..self
        }
    }

    /// 편집된 텍스트로 새 결과 생성. `self`는 바뀌지 않는다.
    ///
    /// 이전 결과의 원문 스냅샷을 유지하고, 없으면 이전 텍스트를 원문으로 삼는다.
    pub fn with_edited_text(&self, text: impl Into<String>, edited_at: DateTime<Utc>) -> Self {
        Self {
            raw_text: text.into(),
            is_edited: true,
            edited_at: Some(edited_at),
            original_text: self
                .original_text
                .clone()
                .or_else(|| Some(self.raw_text.clone())),
            ..self.clone()
        }
    }

    /// 문자 수 (유니코드 스칼라 기준)
    pub fn char_count(&self) -> usize {
        self.raw_text.chars().count()
    }
}

/// `POST /api/extract` 응답 envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResponse {
    /// 처리 성공 여부
    pub success: bool,
    /// 성공 시 결과
    #[serde(default)]
    pub data: Option<ExtractionResult>,
    /// 실패 시 메시지
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_backend_payload() {
        let json = r#"{
            "success": true,
            "data": {
                "rawText": "Total: $100",
                "structuredData": {"invoiceNumber": "INV-7", "totalAmount": 100},
                "tables": [[["a", "b"]]],
                "downloadFormats": [
                    {"format": "csv", "endpoint": "/api/export/csv", "description": "Comma separated"}
                ]
            }
        }"#;
        let resp: ExtractResponse = serde_json::from_str(json).unwrap();
        assert!(resp.success);
        let data = resp.data.unwrap();
        assert_eq!(data.raw_text, "Total: $100");
        assert_eq!(data.char_count(), 11);
        assert_eq!(data.tables.as_ref().map(Vec::len), Some(1));
        assert!(data.entities.is_none());
        assert_eq!(data.download_formats[0].format, "csv");
        assert!(!data.is_edited);
    }

    #[test]
    fn structured_fields_keep_backend_order() {
        let json = r#"{
            "rawText": "x",
            "structuredData": {"vendor": "ACME", "date": "2024-01-05", "amount": 100}
        }"#;
        let data: ExtractionResult = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = data
            .structured_data
            .iter()
            .flatten()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, ["vendor", "date", "amount"]);
    }

    #[test]
    fn failure_envelope() {
        let resp: ExtractResponse =
            serde_json::from_str(r#"{"success": false, "error": "Unsupported scan"}"#).unwrap();
        assert!(!resp.success);
        assert!(resp.data.is_none());
        assert_eq!(resp.error.as_deref(), Some("Unsupported scan"));
    }

    #[test]
    fn into_fresh_snapshots_original() {
        let mut result = ExtractionResult::from_text("hello");
        result.is_edited = true;
        let fresh = result.into_fresh();
        assert!(!fresh.is_edited);
        assert!(fresh.edited_at.is_none());
        assert_eq!(fresh.original_text.as_deref(), Some("hello"));
    }

    #[test]
    fn edit_keeps_first_original() {
        let first = ExtractionResult::from_text("v1").into_fresh();
        let now = Utc::now();
        let second = first.with_edited_text("v2", now);
        let third = second.with_edited_text("v3", now);

        assert_eq!(first.raw_text, "v1");
        assert_eq!(second.raw_text, "v2");
        assert_eq!(third.raw_text, "v3");
        assert!(third.is_edited);
        assert_eq!(third.edited_at, Some(now));
        assert_eq!(third.original_text.as_deref(), Some("v1"));
    }

    #[test]
    fn serializes_camel_case() {
        let result = ExtractionResult::from_text("x");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["rawText"], "x");
        assert_eq!(value["isEdited"], false);
        assert!(value.get("structuredData").is_none());
        assert!(value["editedAt"].is_null());
    }

    #[test]
    fn char_count_counts_scalars() {
        assert_eq!(ExtractionResult::from_text("합계 ₩5").char_count(), 5);
    }
}
