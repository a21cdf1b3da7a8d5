//! 클립보드 포트.
//!
//! 구현: `smarthand-app` crate (arboard)

use crate::error::CoreError;

/// 시스템 클립보드 쓰기
pub trait ClipboardWriter: Send + Sync {
    /// 텍스트 복사
    fn write_text(&self, text: &str) -> Result<(), CoreError>;
}
