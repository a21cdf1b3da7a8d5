//! 애플리케이션 설정 구조체.
//!
//! 백엔드 URL, 업로드 허용 규칙, 알림 표시 시간, 다운로드 저장 위치를 정의한다.
//! 파일 로드/저장은 [`crate::config_manager::ConfigManager`]가 담당한다.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 백엔드 연결 설정
    pub server: ServerConfig,
    /// 업로드 허용 규칙
    #[serde(default)]
    pub upload: UploadConfig,
    /// 알림 설정
    #[serde(default)]
    pub notification: NotificationConfig,
    /// 다운로드 설정
    #[serde(default)]
    pub download: DownloadConfig,
}

/// 백엔드 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 추출 서비스 기본 URL (예: "http://localhost:5050")
    pub base_url: String,
    /// 요청 타임아웃 (밀리초)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

// ============================================================
// 업로드 설정
// ============================================================

/// 업로드 허용 규칙: 파일 검증기가 사용
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// 최대 파일 크기 (바이트)
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,
    /// 허용 MIME 타입
    #[serde(default = "default_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,
    /// 허용 확장자 (소문자, 점 없이)
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size_bytes(),
            allowed_mime_types: default_allowed_mime_types(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

// ============================================================
// 알림 설정
// ============================================================

/// 일시 알림 표시 시간
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// 성공 알림 표시 시간 (밀리초)
    #[serde(default = "default_success_display_ms")]
    pub success_display_ms: u64,
    /// 에러 알림 표시 시간 (밀리초)
    #[serde(default = "default_error_display_ms")]
    pub error_display_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            success_display_ms: default_success_display_ms(),
            error_display_ms: default_error_display_ms(),
        }
    }
}

// ============================================================
// 다운로드 설정
// ============================================================

/// 내보내기 파일 저장 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// 저장 디렉토리 (없으면 현재 디렉토리)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl AppConfig {
    /// 기본 설정 생성
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig {
                base_url: default_base_url(),
                request_timeout_ms: default_request_timeout_ms(),
            },
            upload: UploadConfig::default(),
            notification: NotificationConfig::default(),
            download: DownloadConfig::default(),
        }
    }

    /// 설정값 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        let url = url::Url::parse(&self.server.base_url).map_err(|e| CoreError::Validation {
            field: "server.base_url".to_string(),
            message: format!("잘못된 URL '{}': {e}", self.server.base_url),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoreError::Validation {
                field: "server.base_url".to_string(),
                message: format!("지원하지 않는 스킴: {}", url.scheme()),
            });
        }
        if self.server.request_timeout_ms == 0 {
            return Err(CoreError::Validation {
                field: "server.request_timeout_ms".to_string(),
                message: "0보다 커야 합니다".to_string(),
            });
        }
        if self.upload.max_file_size_bytes == 0 {
            return Err(CoreError::Validation {
                field: "upload.max_file_size_bytes".to_string(),
                message: "0보다 커야 합니다".to_string(),
            });
        }
        if self.upload.allowed_extensions.is_empty() && self.upload.allowed_mime_types.is_empty() {
            return Err(CoreError::Validation {
                field: "upload".to_string(),
                message: "허용 확장자 또는 MIME 타입이 하나 이상 필요합니다".to_string(),
            });
        }
        Ok(())
    }

    /// 요청 타임아웃을 Duration으로 반환
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.server.request_timeout_ms)
    }

    /// 성공 알림 표시 시간
    pub fn success_display(&self) -> Duration {
        Duration::from_millis(self.notification.success_display_ms)
    }

    /// 에러 알림 표시 시간
    pub fn error_display(&self) -> Duration {
        Duration::from_millis(self.notification.error_display_ms)
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_base_url() -> String {
    "http://localhost:5050".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_max_file_size_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_allowed_mime_types() -> Vec<String> {
    [
        "application/pdf",
        "image/jpeg",
        "image/jpg",
        "image/png",
        "application/msword",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_allowed_extensions() -> Vec<String> {
    ["pdf", "jpg", "jpeg", "png", "doc", "docx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_success_display_ms() -> u64 {
    3_000
}

fn default_error_display_ms() -> u64 {
    5_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_limits() {
        let config = AppConfig::default_config();
        assert_eq!(config.server.request_timeout_ms, 30_000);
        assert_eq!(config.upload.max_file_size_bytes, 10_485_760);
        assert_eq!(config.upload.allowed_extensions.len(), 6);
        assert_eq!(config.success_display(), Duration::from_secs(3));
        assert_eq!(config.error_display(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_sections_use_defaults() {
        let json = r#"{"server":{"base_url":"https://ocr.example.com"}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.server.base_url, "https://ocr.example.com");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.upload.allowed_extensions.contains(&"docx".to_string()));
        assert!(config.download.output_dir.is_none());
    }

    #[test]
    fn validate_rejects_bad_url() {
        let mut config = AppConfig::default_config();
        config.server.base_url = "not a url".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "server.base_url"));
    }

    #[test]
    fn validate_rejects_non_http_scheme() {
        let mut config = AppConfig::default_config();
        config.server.base_url = "ftp://files.example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = AppConfig::default_config();
        config.server.request_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_allow_list() {
        let mut config = AppConfig::default_config();
        config.upload.allowed_extensions.clear();
        config.upload.allowed_mime_types.clear();
        assert!(config.validate().is_err());
    }
}
