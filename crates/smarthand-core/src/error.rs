//! SmartHand 핵심 에러 타입.
//!
//! 네트워크 어댑터와 워크플로우 crate 모두 이 타입을 그대로 반환한다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패 ({field}): {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 리소스를 찾을 수 없음
    #[error("{resource_type} 미발견: {id}")]
    NotFound {
        /// 리소스 종류 (예: "다운로드 형식")
        resource_type: String,
        /// 리소스 식별자
        id: String,
    },

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),

    /// 응답을 받지 못함 (연결 실패, 타임아웃)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 요청 구성 단계에서 실패 (잘못된 URL, 본문 생성 실패 등)
    #[error("요청 구성 에러: {0}")]
    Request(String),

    /// 백엔드가 에러 응답을 반환함
    #[error("{message}")]
    Api {
        /// HTTP 상태 코드
        status: u16,
        /// 백엔드가 제공한 가장 구체적인 메시지
        message: String,
    },

    /// 서비스 일시 불가 (헬스 체크 실패)
    #[error("{0}")]
    ServiceUnavailable(String),

    /// 현재 상태에서 허용되지 않는 전이
    #[error("{0}")]
    InvalidState(String),

    /// 클립보드 접근 실패
    #[error("클립보드 에러: {0}")]
    Clipboard(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// 사용자에게 보여줄 메시지.
    ///
    /// 백엔드 메시지가 있으면 접두어 없이 그대로 쓴다.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Api { message, .. } => message.clone(),
            CoreError::Network(msg) | CoreError::Request(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}
