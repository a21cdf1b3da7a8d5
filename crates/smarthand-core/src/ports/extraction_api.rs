//! 추출 서비스 API 포트.
//!
//! 구현: `smarthand-network` crate (reqwest)

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::CoreError;
use crate::models::document::SelectedFile;
use crate::models::export::ExportPayload;
use crate::models::extraction::ExtractResponse;

/// 업로드 진행률 콜백 (0 ~ 100)
pub type UploadProgress = Arc<dyn Fn(u8) + Send + Sync>;

/// 원격 OCR 추출 서비스
#[async_trait]
pub trait ExtractionApi: Send + Sync {
    /// 문서 업로드 및 추출 (`POST /api/extract`, multipart 필드 `file`)
    ///
    /// 백엔드가 `success: false`를 반환해도 `Ok`다. 판단은 호출자 몫.
    async fn extract(
        &self,
        file: &SelectedFile,
        content: Vec<u8>,
        progress: Option<UploadProgress>,
    ) -> Result<ExtractResponse, CoreError>;

    /// 형식별 내보내기 파일 요청 (`GET <endpoint>?data=<json>`)
    async fn export(&self, endpoint: &str, payload: &ExportPayload) -> Result<Vec<u8>, CoreError>;

    /// 헬스 체크 (`GET /health`)
    async fn health(&self) -> Result<serde_json::Value, CoreError>;
}
