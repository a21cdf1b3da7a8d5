//! 애플리케이션 상태와 리듀서.
//!
//! 업로드/편집/다운로드 상태 머신을 열거형으로 명시하고,
//! `AppState::apply`가 모든 전이를 처리한다. 허용되지 않는 전이는
//! `CoreError::InvalidState`로 거부하고, 늦게 도착한 업로드 응답은 버린다.

use chrono::{DateTime, Utc};
use smarthand_core::error::CoreError;
use smarthand_core::models::document::SelectedFile;
use smarthand_core::models::export::ExportFormat;
use smarthand_core::models::extraction::ExtractionResult;
use std::sync::Arc;
use tracing::debug;

/// 업로드 흐름 상태
#[derive(Debug, Clone, Default)]
pub enum UploadPhase {
    /// 선택된 파일 없음
    #[default]
    Idle,
    /// 유효한 파일 선택됨
    FileSelected { file: SelectedFile },
    /// 업로드/추출 진행 중
    Uploading {
        file: SelectedFile,
        upload_id: u64,
        progress: u8,
    },
    /// 추출 완료
    Succeeded {
        file: SelectedFile,
        result: Arc<ExtractionResult>,
    },
    /// 추출 실패 (재시도 가능)
    Failed { file: SelectedFile, message: String },
}

/// 결과 편집 상태
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditorState {
    #[default]
    Viewing,
    Editing {
        /// 편집 시작 시점 텍스트
        original: String,
        /// 편집 중인 텍스트
        buffer: String,
    },
}

/// 다운로드 상태
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DownloadState {
    #[default]
    Idle,
    /// 내보내기 진행 중. 초기화/파일 변경 뒤에도 해당 요청이 끝날 때까지 유지.
    Pending {
        format: ExportFormat,
        download_id: u64,
    },
}

/// 상태 전이 요청
#[derive(Debug, Clone)]
pub enum Action {
    /// 검증을 통과한 파일 선택
    SelectFile(SelectedFile),
    /// 검증 실패한 파일 선택
    RejectFile { reason: String },
    /// 업로드 시작
    StartUpload,
    /// 업로드 진행률
    UploadProgress { upload_id: u64, percent: u8 },
    /// 백엔드 추출 성공
    UploadSucceeded {
        upload_id: u64,
        result: ExtractionResult,
    },
    /// 백엔드/네트워크 실패
    UploadFailed { upload_id: u64, message: String },
    /// 편집 시작
    BeginEdit,
    /// 편집 버퍼 교체
    UpdateBuffer(String),
    /// 편집 저장
    SaveEdit { at: DateTime<Utc> },
    /// 편집 취소
    CancelEdit,
    /// 다운로드 시작
    StartDownload(ExportFormat),
    /// 다운로드 종료 (성공/실패 무관)
    FinishDownload { download_id: u64 },
    /// 파일/결과/에러 전부 초기화
    Clear,
}

/// 페이지 전체 상태 스냅샷
///
/// 불변 값으로 다루며, 변경은 [`AppState::apply`]로 새 스냅샷을 만든다.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub upload: UploadPhase,
    pub editor: EditorState,
    pub download: DownloadState,
    /// 인라인 에러 (검증 실패, 업로드 실패)
    pub error: Option<String>,
    /// 마지막으로 발급한 업로드 ID
    upload_seq: u64,
    /// 마지막으로 발급한 다운로드 ID
    download_seq: u64,
}

fn invalid(message: impl Into<String>) -> CoreError {
    CoreError::InvalidState(message.into())
}

impl AppState {
    /// 선택된 파일
    pub fn file(&self) -> Option<&SelectedFile> {
        match &self.upload {
            UploadPhase::Idle => None,
            UploadPhase::FileSelected { file }
            | UploadPhase::Uploading { file, .. }
            | UploadPhase::Succeeded { file, .. }
            | UploadPhase::Failed { file, .. } => Some(file),
        }
    }

    /// 현재 추출 결과
    pub fn result(&self) -> Option<&Arc<ExtractionResult>> {
        match &self.upload {
            UploadPhase::Succeeded { result, .. } => Some(result),
            _ => None,
        }
    }

    /// 업로드 중인 경우 (ID, 진행률)
    pub fn uploading(&self) -> Option<(u64, u8)> {
        match &self.upload {
            UploadPhase::Uploading {
                upload_id,
                progress,
                ..
            } => Some((*upload_id, *progress)),
            _ => None,
        }
    }

    /// 진행 중인 다운로드 ID
    pub fn pending_download(&self) -> Option<u64> {
        match self.download {
            DownloadState::Pending { download_id, .. } => Some(download_id),
            DownloadState::Idle => None,
        }
    }

    /// 업로드 버튼 활성화 여부
    pub fn can_upload(&self) -> bool {
        match &self.upload {
            UploadPhase::FileSelected { .. } | UploadPhase::Failed { .. } => true,
            UploadPhase::Succeeded { .. } => self.download == DownloadState::Idle,
            UploadPhase::Idle | UploadPhase::Uploading { .. } => false,
        }
    }

    /// 다운로드 버튼 활성화 여부
    pub fn can_download(&self) -> bool {
        self.result().is_some()
            && self.editor == EditorState::Viewing
            && self.download == DownloadState::Idle
    }

    /// 화면에 보이는 텍스트 (편집 중이면 버퍼)
    pub fn displayed_text(&self) -> Option<&str> {
        let result = self.result()?;
        match &self.editor {
            EditorState::Editing { buffer, .. } => Some(buffer.as_str()),
            EditorState::Viewing => Some(result.raw_text.as_str()),
        }
    }

    /// 전이 적용. `self`는 바뀌지 않고 새 스냅샷을 반환한다.
    pub fn apply(&self, action: Action) -> Result<AppState, CoreError> {
        let mut next = self.clone();

        match action {
            Action::SelectFile(file) => {
                if self.uploading().is_some() {
                    return Err(invalid("업로드 중에는 파일을 바꿀 수 없습니다"));
                }
                next.upload = UploadPhase::FileSelected { file };
                next.editor = EditorState::Viewing;
                next.error = None;
            }

            Action::RejectFile { reason } => {
                if self.uploading().is_some() {
                    return Err(invalid("업로드 중에는 파일을 바꿀 수 없습니다"));
                }
                // 표시 중인 결과는 유지
                if self.result().is_none() {
                    next.upload = UploadPhase::Idle;
                    next.editor = EditorState::Viewing;
                }
                next.error = Some(reason);
            }

            Action::StartUpload => {
                let file = match &self.upload {
                    UploadPhase::Idle => return Err(invalid("Please select a file first")),
                    UploadPhase::Uploading { .. } => return Err(invalid("이미 업로드 중입니다")),
                    UploadPhase::Succeeded { .. } if self.download != DownloadState::Idle => {
                        return Err(invalid("다운로드가 끝난 뒤 다시 추출하세요"));
                    }
                    UploadPhase::FileSelected { file }
                    | UploadPhase::Failed { file, .. }
                    | UploadPhase::Succeeded { file, .. } => file.clone(),
                };
                next.upload_seq = self.upload_seq + 1;
                next.upload = UploadPhase::Uploading {
                    file,
                    upload_id: next.upload_seq,
                    progress: 0,
                };
                next.editor = EditorState::Viewing;
                next.error = None;
            }

            Action::UploadProgress { upload_id, percent } => {
                if let UploadPhase::Uploading {
                    upload_id: current,
                    progress,
                    ..
                } = &mut next.upload
                {
                    if *current == upload_id {
                        *progress = (*progress).max(percent.min(100));
                    }
                }
            }

            Action::UploadSucceeded { upload_id, result } => match &self.upload {
                UploadPhase::Uploading {
                    file,
                    upload_id: current,
                    ..
                } if *current == upload_id => {
                    next.upload = UploadPhase::Succeeded {
                        file: file.clone(),
                        result: Arc::new(result.into_fresh()),
                    };
                    next.error = None;
                }
                _ => debug!(upload_id, "늦게 도착한 업로드 결과 폐기"),
            },

            Action::UploadFailed { upload_id, message } => match &self.upload {
                UploadPhase::Uploading {
                    file,
                    upload_id: current,
                    ..
                } if *current == upload_id => {
                    next.upload = UploadPhase::Failed {
                        file: file.clone(),
                        message: message.clone(),
                    };
                    next.error = Some(message);
                }
                _ => debug!(upload_id, "늦게 도착한 업로드 실패 폐기"),
            },

            Action::BeginEdit => {
                let result = self
                    .result()
                    .ok_or_else(|| invalid("편집할 추출 결과가 없습니다"))?;
                if self.editor != EditorState::Viewing {
                    return Err(invalid("이미 편집 중입니다"));
                }
                if self.download != DownloadState::Idle {
                    return Err(invalid("다운로드 중에는 편집할 수 없습니다"));
                }
                next.editor = EditorState::Editing {
                    original: result.raw_text.clone(),
                    buffer: result.raw_text.clone(),
                };
            }

            Action::UpdateBuffer(text) => match &mut next.editor {
                EditorState::Editing { buffer, .. } => *buffer = text,
                EditorState::Viewing => return Err(invalid("편집 중이 아닙니다")),
            },

            Action::SaveEdit { at } => {
                let buffer = match &self.editor {
                    EditorState::Editing { buffer, .. } => buffer,
                    EditorState::Viewing => return Err(invalid("편집 중이 아닙니다")),
                };
                let (file, result) = match &self.upload {
                    UploadPhase::Succeeded { file, result } => (file, result),
                    _ => return Err(invalid("편집할 추출 결과가 없습니다")),
                };
                next.upload = UploadPhase::Succeeded {
                    file: file.clone(),
                    result: Arc::new(result.with_edited_text(buffer.clone(), at)),
                };
                next.editor = EditorState::Viewing;
            }

            Action::CancelEdit => {
                next.editor = EditorState::Viewing;
            }

            Action::StartDownload(format) => {
                if self.result().is_none() {
                    return Err(invalid("다운로드할 추출 결과가 없습니다"));
                }
                if self.editor != EditorState::Viewing {
                    return Err(invalid("편집을 저장하거나 취소한 뒤 다운로드하세요"));
                }
                if let DownloadState::Pending { format: pending, .. } = self.download {
                    return Err(invalid(format!("{pending} 다운로드가 진행 중입니다")));
                }
                next.download_seq = self.download_seq + 1;
                next.download = DownloadState::Pending {
                    format,
                    download_id: next.download_seq,
                };
            }

            Action::FinishDownload { download_id } => {
                if self.pending_download() == Some(download_id) {
                    next.download = DownloadState::Idle;
                } else {
                    debug!(download_id, "이미 끝난 다운로드 종료 무시");
                }
            }

            Action::Clear => {
                next = AppState {
                    download: self.download,
                    upload_seq: self.upload_seq,
                    download_seq: self.download_seq,
                    ..AppState::default()
                };
            }
        }

        Ok(next)
    }
}
