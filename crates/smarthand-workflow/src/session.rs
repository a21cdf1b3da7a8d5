//! 사용자 세션.
//!
//! 상태 스냅샷, 알림, 포트(API/저장/클립보드)를 묶어 사용자 동작 단위의
//! 메서드를 제공한다. 상태 잠금은 리듀서 호출 동안만 잡고 `.await` 너머로
//! 들고 가지 않는다.

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use smarthand_core::config::{AppConfig, UploadConfig};
use smarthand_core::error::CoreError;
use smarthand_core::models::document::SelectedFile;
use smarthand_core::models::export::ExportFormat;
use smarthand_core::models::extraction::ExtractionResult;
use smarthand_core::ports::clipboard::ClipboardWriter;
use smarthand_core::ports::extraction_api::{ExtractionApi, UploadProgress};
use smarthand_core::ports::file_saver::FileSaver;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::download::{DownloadOrchestrator, SavedExport};
use crate::notification::{Notification, NotificationCenter, NotificationScope};
use crate::state::{Action, AppState};
use crate::validator::{validate_file, FileValidation};
use crate::view::{ResultView, UploadView};

/// 업로드 실패 시 백엔드 메시지가 없을 때
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to process file";

const UPLOAD_SUCCESS_MESSAGE: &str = "File processed successfully!";
const SAVE_SUCCESS_MESSAGE: &str = "Text saved successfully!";
const COPY_SUCCESS_MESSAGE: &str = "Text copied to clipboard!";

/// 문서 추출 세션
pub struct Session {
    state: Arc<RwLock<AppState>>,
    notifications: Mutex<NotificationCenter>,
    api: Arc<dyn ExtractionApi>,
    downloader: DownloadOrchestrator,
    clipboard: Option<Arc<dyn ClipboardWriter>>,
    rules: UploadConfig,
}

impl Session {
    /// 새 세션 생성
    pub fn new(
        api: Arc<dyn ExtractionApi>,
        saver: Arc<dyn FileSaver>,
        rules: UploadConfig,
        notifications: NotificationCenter,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(AppState::default())),
            notifications: Mutex::new(notifications),
            downloader: DownloadOrchestrator::new(api.clone(), saver),
            api,
            clipboard: None,
            rules,
        }
    }

    /// 설정값(업로드 규칙, 알림 표시 시간)으로 생성
    pub fn from_config(
        config: &AppConfig,
        api: Arc<dyn ExtractionApi>,
        saver: Arc<dyn FileSaver>,
    ) -> Self {
        Self::new(
            api,
            saver,
            config.upload.clone(),
            NotificationCenter::new(config.success_display(), config.error_display()),
        )
    }

    /// 클립보드 연결
    pub fn with_clipboard(mut self, clipboard: Arc<dyn ClipboardWriter>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    /// 현재 상태 스냅샷
    pub fn snapshot(&self) -> AppState {
        self.state.read().clone()
    }

    /// 표시 중인 알림
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().active()
    }

    /// 결과 패널 (결과가 있을 때)
    pub fn result_view(&self) -> Option<ResultView> {
        ResultView::from_state(&self.state.read())
    }

    /// 업로드 영역
    pub fn upload_view(&self) -> UploadView {
        UploadView::from_state(&self.state.read())
    }

    fn dispatch(&self, action: Action) -> Result<AppState, CoreError> {
        dispatch_on(&self.state, action)
    }

    fn notify_success(&self, scope: NotificationScope, message: impl Into<String>) {
        self.notifications.lock().success(scope, message);
    }

    fn notify_error(&self, scope: NotificationScope, message: impl Into<String>) {
        self.notifications.lock().error(scope, message);
    }

    /// 파일 선택
    ///
    /// 검증에 실패하면 첫 번째 사유가 인라인 에러로 남는다. 아직 보내지 않은
    /// 선택은 버리지만 표시 중인 추출 결과는 그대로 둔다.
    /// 업로드 중이면 `InvalidState`.
    pub fn select_file(&self, file: SelectedFile) -> Result<FileValidation, CoreError> {
        let validation = validate_file(&file, &self.rules);

        if validation.is_valid {
            info!(name = %file.name, size = file.size, mime = %file.mime_type, "파일 선택");
            self.dispatch(Action::SelectFile(file))?;
        } else {
            let reason = validation
                .first_error()
                .unwrap_or("File type not supported")
                .to_string();
            self.dispatch(Action::RejectFile {
                reason: reason.clone(),
            })?;
            self.notify_error(NotificationScope::Upload, reason);
        }

        Ok(validation)
    }

    /// 선택된 파일 업로드 및 추출
    pub async fn upload(&self) -> Result<Arc<ExtractionResult>, CoreError> {
        let started = match self.dispatch(Action::StartUpload) {
            Ok(state) => state,
            Err(err) => {
                self.notify_error(NotificationScope::Upload, err.to_string());
                return Err(err);
            }
        };
        let (upload_id, file) = match (started.uploading(), started.file()) {
            (Some((id, _)), Some(file)) => (id, file.clone()),
            _ => return Err(CoreError::Internal("업로드 상태 불일치".to_string())),
        };

        info!(upload_id, name = %file.name, "업로드 시작");

        let content = match file.read_bytes().await {
            Ok(content) => content,
            Err(err) => {
                warn!(upload_id, "파일 읽기 실패: {err}");
                self.fail_upload(upload_id, UPLOAD_FAILED_MESSAGE.to_string());
                return Err(err);
            }
        };

        let state = Arc::clone(&self.state);
        let progress: UploadProgress = Arc::new(move |percent| {
            // 늦게 온 진행률은 리듀서가 무시한다
            let _ = dispatch_on(&state, Action::UploadProgress { upload_id, percent });
        });

        match self.api.extract(&file, content, Some(progress)).await {
            Ok(resp) if resp.success => match resp.data {
                Some(result) => self.finish_upload(upload_id, result),
                None => {
                    let message = resp
                        .error
                        .unwrap_or_else(|| UPLOAD_FAILED_MESSAGE.to_string());
                    self.fail_upload(upload_id, message.clone());
                    Err(CoreError::Internal(message))
                }
            },
            Ok(resp) => {
                // 백엔드가 200으로 실패를 알린 경우
                let message = resp
                    .error
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| UPLOAD_FAILED_MESSAGE.to_string());
                self.fail_upload(upload_id, message.clone());
                Err(CoreError::Api {
                    status: 200,
                    message,
                })
            }
            Err(err) => {
                let message = match &err {
                    CoreError::Api { message, .. } => message.clone(),
                    _ => UPLOAD_FAILED_MESSAGE.to_string(),
                };
                warn!(upload_id, "추출 요청 실패: {err}");
                self.fail_upload(upload_id, message);
                Err(err)
            }
        }
    }

    fn finish_upload(
        &self,
        upload_id: u64,
        result: ExtractionResult,
    ) -> Result<Arc<ExtractionResult>, CoreError> {
        let state = self.dispatch(Action::UploadSucceeded { upload_id, result })?;
        match state.result() {
            Some(result) if state.uploading().is_none() => {
                info!(upload_id, chars = result.char_count(), "추출 완료");
                self.notify_success(NotificationScope::Upload, UPLOAD_SUCCESS_MESSAGE);
                Ok(Arc::clone(result))
            }
            _ => Err(CoreError::InvalidState(
                "업로드가 취소되어 결과를 버렸습니다".to_string(),
            )),
        }
    }

    fn fail_upload(&self, upload_id: u64, message: String) {
        let still_current = self.state.read().uploading().map(|(id, _)| id) == Some(upload_id);
        if !still_current {
            debug!(upload_id, "취소된 업로드의 실패 무시");
            return;
        }
        if self
            .dispatch(Action::UploadFailed {
                upload_id,
                message: message.clone(),
            })
            .is_ok()
        {
            self.notify_error(NotificationScope::Upload, message);
        }
    }

    /// 편집 시작
    pub fn begin_edit(&self) -> Result<(), CoreError> {
        self.dispatch(Action::BeginEdit).map(|_| ())
    }

    /// 편집 버퍼 교체
    pub fn update_edit_buffer(&self, text: impl Into<String>) -> Result<(), CoreError> {
        self.dispatch(Action::UpdateBuffer(text.into())).map(|_| ())
    }

    /// 편집 저장. 새 결과가 기존 결과를 대체한다.
    pub fn save_edit(&self) -> Result<Arc<ExtractionResult>, CoreError> {
        let state = self.dispatch(Action::SaveEdit { at: Utc::now() })?;
        let result = state
            .result()
            .cloned()
            .ok_or_else(|| CoreError::Internal("저장 후 결과 없음".to_string()))?;
        self.notify_success(NotificationScope::Results, SAVE_SUCCESS_MESSAGE);
        Ok(result)
    }

    /// 편집 취소
    pub fn cancel_edit(&self) -> Result<(), CoreError> {
        self.dispatch(Action::CancelEdit).map(|_| ())
    }

    /// 표시 중인 텍스트를 클립보드로 복사
    ///
    /// 실패는 알리지 않는다. 성공했을 때만 `true`.
    pub fn copy_text(&self) -> bool {
        let text = match self.state.read().displayed_text() {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => return false,
        };
        let Some(clipboard) = &self.clipboard else {
            debug!("클립보드 없음, 복사 생략");
            return false;
        };

        match clipboard.write_text(&text) {
            Ok(()) => {
                self.notify_success(NotificationScope::Results, COPY_SUCCESS_MESSAGE);
                true
            }
            Err(err) => {
                debug!("클립보드 복사 실패: {err}");
                false
            }
        }
    }

    /// 형식별 다운로드
    ///
    /// 실패해도 결과는 그대로 두고 다운로드 영역에 에러 알림만 띄운다.
    pub async fn download(&self, format: ExportFormat) -> Result<SavedExport, CoreError> {
        let state = self.dispatch(Action::StartDownload(format))?;
        let download_id = state
            .pending_download()
            .ok_or_else(|| CoreError::Internal("다운로드 ID 없음".to_string()))?;
        let result = state
            .result()
            .cloned()
            .ok_or_else(|| CoreError::Internal("다운로드할 결과 없음".to_string()))?;
        let original_filename = state.file().map(|f| f.name.clone());

        let outcome = self
            .downloader
            .download(
                format,
                &result.download_formats,
                &result,
                original_filename.as_deref(),
            )
            .await;

        self.dispatch(Action::FinishDownload { download_id })?;

        match &outcome {
            Ok(saved) => {
                debug!(path = %saved.path.display(), "다운로드 저장 경로");
                self.notify_success(
                    NotificationScope::Download,
                    format!("Downloaded as {} successfully!", format.id().to_uppercase()),
                );
            }
            Err(err) => self.notify_error(
                NotificationScope::Download,
                format!("Failed to download {}: {}", format.id(), err.user_message()),
            ),
        }
        outcome
    }

    /// 파일/결과/에러 초기화
    ///
    /// 떠 있는 알림도 닫는다. 진행 중인 다운로드는 끝날 때까지 `Pending`으로 남는다.
    pub fn clear(&self) {
        if self.dispatch(Action::Clear).is_ok() {
            self.notifications.lock().clear();
            info!("세션 초기화");
        }
    }

    /// 백엔드 헬스 체크
    pub async fn health(&self) -> Result<serde_json::Value, CoreError> {
        self.api.health().await
    }
}

fn dispatch_on(state: &RwLock<AppState>, action: Action) -> Result<AppState, CoreError> {
    let mut guard = state.write();
    let next = guard.apply(action)?;
    *guard = next.clone();
    Ok(next)
}
