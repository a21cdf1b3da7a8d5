//! HTTP 실패 → `CoreError` 정규화.
//!
//! 세 가지 경우를 구분한다:
//! 1. 백엔드가 에러 응답을 반환 → `CoreError::Api`
//! 2. 응답을 받지 못함 (연결 실패, 타임아웃) → `CoreError::Network`
//! 3. 요청 구성 실패 → `CoreError::Request`

use reqwest::StatusCode;
use smarthand_core::error::CoreError;

/// 에러 본문 미리보기 최대 길이
const MAX_BODY_PREVIEW_CHARS: usize = 200;

/// reqwest 전송 에러 매핑 (응답이 없는 경우)
pub fn map_transport_error(operation: &str, err: reqwest::Error) -> CoreError {
    if err.is_builder() {
        return CoreError::Request(format!("{operation}: {err}"));
    }
    if err.is_timeout() {
        return CoreError::Network(format!("{operation}: 응답 시간 초과 ({err})"));
    }
    if err.is_connect() {
        return CoreError::Network(format!("{operation}: 서버에 연결할 수 없음 ({err})"));
    }
    CoreError::Network(format!("{operation}: {err}"))
}

/// 에러 상태 코드 + 본문 매핑
pub fn map_error_response(status: StatusCode, body: &str) -> CoreError {
    let message = extract_error_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
    });

    CoreError::Api {
        status: status.as_u16(),
        message,
    }
}

/// 본문에서 가장 구체적인 메시지 추출
///
/// 우선순위: JSON `error` → JSON `message` → 본문 텍스트
pub fn extract_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["error", "message"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                if !msg.trim().is_empty() {
                    return Some(msg.trim().to_string());
                }
            }
        }
        if value.is_object() {
            // 메시지 필드 없는 JSON 객체는 원문을 노출하지 않는다
            return None;
        }
    }

    Some(trimmed.chars().take(MAX_BODY_PREVIEW_CHARS).collect())
}
