//! 선택된 업로드 파일.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::CoreError;

/// 파일 내용의 출처
#[derive(Debug, Clone)]
enum FileSource {
    /// 디스크 경로 (업로드 시점에 읽음)
    Disk(PathBuf),
    /// 메모리 버퍼
    Memory(Arc<Vec<u8>>),
}

/// 사용자가 선택한 문서
///
/// 검증에는 메타데이터(이름, 크기, MIME)만 쓰고,
/// 내용은 업로드를 시작할 때 [`SelectedFile::read_bytes`]로 가져온다.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// 파일 이름 (경로 제외)
    pub name: String,
    /// 크기 (바이트)
    pub size: u64,
    /// 선언된 MIME 타입 (알 수 없으면 빈 문자열)
    pub mime_type: String,
    source: FileSource,
}

impl SelectedFile {
    /// 디스크 파일에서 생성. 내용은 읽지 않는다.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(CoreError::Validation {
                field: "file".to_string(),
                message: format!("일반 파일이 아닙니다: {}", path.display()),
            });
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = guess_mime_type(&name);

        Ok(Self {
            name,
            size: metadata.len(),
            mime_type,
            source: FileSource::Disk(path.to_path_buf()),
        })
    }

    /// 메모리 버퍼에서 생성. MIME은 이름으로 추정한다.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = guess_mime_type(&name);
        Self {
            size: bytes.len() as u64,
            name,
            mime_type,
            source: FileSource::Memory(Arc::new(bytes)),
        }
    }

    /// 선언된 MIME 타입 지정
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// 소문자 확장자 (점 없이). 점이 없으면 이름 전체.
    pub fn extension(&self) -> String {
        self.name
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }

    /// 파일 종류 라벨
    pub fn kind_label(&self) -> &'static str {
        match self.extension().as_str() {
            "pdf" => "PDF",
            "jpg" | "jpeg" | "png" => "Image",
            "doc" | "docx" => "Word",
            _ => "File",
        }
    }

    /// 업로드용 내용 읽기
    pub async fn read_bytes(&self) -> Result<Vec<u8>, CoreError> {
        match &self.source {
            FileSource::Disk(path) => Ok(tokio::fs::read(path).await?),
            FileSource::Memory(bytes) => Ok(bytes.as_ref().clone()),
        }
    }
}

fn guess_mime_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_guesses_mime() {
        let file = SelectedFile::from_bytes("invoice.pdf", vec![0u8; 16]);
        assert_eq!(file.size, 16);
        assert_eq!(file.mime_type, "application/pdf");
        assert_eq!(file.extension(), "pdf");
        assert_eq!(file.kind_label(), "PDF");
    }

    #[test]
    fn extension_is_lowercased_last_segment() {
        let file = SelectedFile::from_bytes("Scan.Page1.JPEG", vec![]);
        assert_eq!(file.extension(), "jpeg");
        assert_eq!(file.kind_label(), "Image");
    }

    #[test]
    fn unknown_name_has_empty_mime() {
        let file = SelectedFile::from_bytes("notes.zzz", vec![]);
        assert_eq!(file.mime_type, "");
        assert_eq!(file.kind_label(), "File");
    }

    #[tokio::test]
    async fn open_reads_metadata_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salary.docx");
        std::fs::write(&path, b"PK\x03\x04 word").unwrap();

        let file = SelectedFile::open(&path).await.unwrap();
        assert_eq!(file.name, "salary.docx");
        assert_eq!(file.size, 9);
        assert_eq!(file.kind_label(), "Word");
        assert_eq!(file.read_bytes().await.unwrap(), b"PK\x03\x04 word");
    }

    #[tokio::test]
    async fn open_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SelectedFile::open(dir.path().join("nope.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }

    #[tokio::test]
    async fn open_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = SelectedFile::open(dir.path()).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }
}
