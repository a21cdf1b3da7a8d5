//! 업로드 전 파일 검증.
//!
//! 크기 상한과 MIME/확장자 허용 목록만 본다. 네트워크 접근 없음.

use smarthand_core::config::UploadConfig;
use smarthand_core::models::document::SelectedFile;

const MIB: f64 = 1024.0 * 1024.0;

/// 검증 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileValidation {
    /// 업로드 가능 여부
    pub is_valid: bool,
    /// 거부 사유 (사용자 표시용)
    pub errors: Vec<String>,
}

impl FileValidation {
    /// 첫 번째 거부 사유
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}

/// 파일 검증
///
/// 허용 MIME이면 통과, 아니면 확장자로 다시 판단한다.
/// 허용 확장자면 선언된 MIME과 무관하게 통과.
pub fn validate_file(file: &SelectedFile, rules: &UploadConfig) -> FileValidation {
    let mut errors = Vec::new();

    if file.size > rules.max_file_size_bytes {
        errors.push(format!(
            "File size exceeds {}MB limit",
            rules.max_file_size_bytes as f64 / MIB
        ));
    }

    let mime = file.mime_type.to_ascii_lowercase();
    let mime_allowed = !mime.is_empty() && rules.allowed_mime_types.iter().any(|m| *m == mime);
    if !mime_allowed {
        let extension = file.extension();
        let extension_allowed = rules
            .allowed_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(&extension));
        if !extension_allowed {
            errors.push("File type not supported".to_string());
        }
    }

    FileValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}
