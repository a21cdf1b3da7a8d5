//! 내보내기 파일 저장 포트.
//!
//! 구현: `smarthand-workflow::saver::LocalFileSaver`

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::CoreError;

/// 다운로드한 내보내기 파일을 저장하는 인터페이스
#[async_trait]
pub trait FileSaver: Send + Sync {
    /// `filename`으로 저장하고 최종 경로를 반환
    async fn save(&self, filename: &str, content: &[u8]) -> Result<PathBuf, CoreError>;
}
