//! 추출 서비스 HTTP 클라이언트.
//!
//! `ExtractionApi` 포트 구현. 공통 base URL + 타임아웃, 요청/응답 로깅,
//! 에러 정규화([`crate::error_mapping`])를 모든 호출에 적용한다.
//! 재시도는 하지 않는다. 재시도는 항상 사용자가 직접 한다.

use async_trait::async_trait;
use smarthand_core::config::AppConfig;
use smarthand_core::error::CoreError;
use smarthand_core::models::document::SelectedFile;
use smarthand_core::models::export::ExportPayload;
use smarthand_core::models::extraction::ExtractResponse;
use smarthand_core::ports::extraction_api::{ExtractionApi, UploadProgress};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error_mapping::{map_error_response, map_transport_error};

/// 추출 엔드포인트
const EXTRACT_PATH: &str = "/api/extract";

/// 헬스 체크 엔드포인트
const HEALTH_PATH: &str = "/health";

/// 업로드 스트림 청크 크기 (진행률 보고 단위)
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// 타입을 알 수 없는 파일의 MIME
const FALLBACK_MIME: &str = "application/octet-stream";

/// 추출 서비스 REST 클라이언트: `ExtractionApi` 포트 구현
#[derive(Debug, Clone)]
pub struct HttpExtractionClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpExtractionClient {
    /// 새 클라이언트 생성
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Request(format!("HTTP 클라이언트 빌드 실패: {e}")))?;

        debug!(base_url = %base_url, timeout = ?timeout, "추출 클라이언트 초기화");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 설정에서 생성
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        Self::new(&config.server.base_url, config.request_timeout())
    }

    /// 기본 URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 엔드포인트 → 전체 URL. 절대 URL은 그대로 사용.
    fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// 요청 전송 + 로깅 + 상태 코드 확인
    async fn execute(
        &self,
        operation: &str,
        method: reqwest::Method,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, CoreError> {
        debug!(method = %method, path = %endpoint, "API 요청");

        let resp = request.send().await.map_err(|e| {
            let err = map_transport_error(operation, e);
            warn!(method = %method, path = %endpoint, error = %err, "API 응답 없음");
            err
        })?;

        let status = resp.status();
        debug!(status = status.as_u16(), path = %endpoint, "API 응답");

        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_else(|e| {
            warn!("응답 본문 읽기 실패: {e}");
            String::new()
        });
        let err = map_error_response(status, &body);
        warn!(status = status.as_u16(), path = %endpoint, error = %err, "API 에러 응답");
        Err(err)
    }

    /// 업로드 본문 생성. 청크가 소비될 때마다 진행률을 보고한다.
    fn upload_part(
        file: &SelectedFile,
        content: Vec<u8>,
        progress: Option<UploadProgress>,
    ) -> Result<reqwest::multipart::Part, CoreError> {
        let total = content.len() as u64;
        let chunks: Vec<Vec<u8>> = content
            .chunks(UPLOAD_CHUNK_SIZE)
            .map(<[u8]>::to_vec)
            .collect();

        let mut sent = 0u64;
        let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            if let Some(report) = &progress {
                report(percent(sent, total));
            }
            Ok::<_, std::io::Error>(chunk)
        }));

        let mime = if file.mime_type.is_empty() {
            FALLBACK_MIME
        } else {
            file.mime_type.as_str()
        };

        reqwest::multipart::Part::stream_with_length(reqwest::Body::wrap_stream(stream), total)
            .file_name(file.name.clone())
            .mime_str(mime)
            .map_err(|e| map_transport_error("업로드 본문 생성", e))
    }
}

/// 전송률 (0 ~ 100)
fn percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    ((sent.min(total) * 100) / total) as u8
}

#[async_trait]
impl ExtractionApi for HttpExtractionClient {
    async fn extract(
        &self,
        file: &SelectedFile,
        content: Vec<u8>,
        progress: Option<UploadProgress>,
    ) -> Result<ExtractResponse, CoreError> {
        debug!(name = %file.name, size = file.size, mime = %file.mime_type, "문서 업로드");

        let part = Self::upload_part(file, content, progress.clone())?;
        let form = reqwest::multipart::Form::new().part("file", part);
        let request = self
            .client
            .post(self.url_for(EXTRACT_PATH))
            .multipart(form);

        let resp = self
            .execute("문서 추출", reqwest::Method::POST, EXTRACT_PATH, request)
            .await?;

        let body = resp
            .bytes()
            .await
            .map_err(|e| map_transport_error("추출 응답 읽기", e))?;
        let parsed: ExtractResponse = serde_json::from_slice(&body)?;

        if let Some(report) = &progress {
            report(100);
        }
        debug!(success = parsed.success, "추출 응답 수신");
        Ok(parsed)
    }

    async fn export(&self, endpoint: &str, payload: &ExportPayload) -> Result<Vec<u8>, CoreError> {
        let data = serde_json::to_string(payload)?;
        debug!(endpoint = %endpoint, payload_len = data.len(), "내보내기 요청");

        let request = self
            .client
            .get(self.url_for(endpoint))
            .query(&[("data", data.as_str())]);

        let resp = self
            .execute("내보내기", reqwest::Method::GET, endpoint, request)
            .await?;

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| map_transport_error("내보내기 응답 읽기", e))?;

        debug!(size = bytes.len(), "내보내기 파일 수신");
        Ok(bytes.to_vec())
    }

    async fn health(&self) -> Result<serde_json::Value, CoreError> {
        let request = self.client.get(self.url_for(HEALTH_PATH));
        let result = async {
            let resp = self
                .execute("헬스 체크", reqwest::Method::GET, HEALTH_PATH, request)
                .await?;
            let body = resp
                .bytes()
                .await
                .map_err(|e| map_transport_error("헬스 체크 응답 읽기", e))?;
            // JSON이 아닌 본문도 살아있음으로 본다
            Ok::<_, CoreError>(
                serde_json::from_slice(&body).unwrap_or_else(|_| {
                    serde_json::Value::String(String::from_utf8_lossy(&body).into_owned())
                }),
            )
        }
        .await;

        result.map_err(|e| {
            warn!("헬스 체크 실패: {e}");
            CoreError::ServiceUnavailable("Service unavailable".to_string())
        })
    }
}
