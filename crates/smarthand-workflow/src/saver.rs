//! 로컬 디렉토리 파일 저장 (`FileSaver` 포트 구현).

use async_trait::async_trait;
use smarthand_core::error::CoreError;
use smarthand_core::ports::file_saver::FileSaver;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// 같은 이름이 있을 때 시도할 최대 접미사 번호
const MAX_DUPLICATE_SUFFIX: u32 = 999;

/// 지정 디렉토리에 내보내기 파일 저장
///
/// 같은 이름의 파일이 있으면 `name (1).ext`처럼 번호를 붙인다.
#[derive(Debug, Clone)]
pub struct LocalFileSaver {
    dir: PathBuf,
}

impl LocalFileSaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn unique_path(&self, filename: &str) -> Result<PathBuf, CoreError> {
        let candidate = self.dir.join(filename);
        if !fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }

        let (stem, ext) = match filename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (filename, None),
        };
        for n in 1..=MAX_DUPLICATE_SUFFIX {
            let name = match ext {
                Some(ext) => format!("{stem} ({n}).{ext}"),
                None => format!("{stem} ({n})"),
            };
            let candidate = self.dir.join(name);
            if !fs::try_exists(&candidate).await? {
                return Ok(candidate);
            }
        }

        Err(CoreError::Internal(format!(
            "저장할 파일 이름을 정할 수 없습니다: {filename}"
        )))
    }
}

#[async_trait]
impl FileSaver for LocalFileSaver {
    async fn save(&self, filename: &str, content: &[u8]) -> Result<PathBuf, CoreError> {
        // 경로 구성 요소는 버리고 파일 이름만 사용
        let filename = Path::new(filename)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| CoreError::Validation {
                field: "filename".to_string(),
                message: format!("잘못된 파일 이름: {filename:?}"),
            })?;

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CoreError::Internal(format!("저장 디렉토리 생성 실패: {e}")))?;

        let path = self.unique_path(&filename).await?;
        debug!(path = %path.display(), bytes = content.len(), "내보내기 파일 쓰기");
        fs::write(&path, content).await?;

        info!("파일 저장: {}", path.display());
        Ok(path)
    }
}
