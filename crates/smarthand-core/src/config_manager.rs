//! JSON 설정 파일 저장소.
//!
//! 파일이 없으면 기본값으로 만들고, 읽은 설정은 항상 `AppConfig::validate`를
//! 통과해야 한다. 저장은 임시 파일에 쓴 뒤 rename으로 교체한다.
//! 기본 경로 결정(`directories`)은 바이너리 쪽 몫이다.

use crate::config::AppConfig;
use crate::error::CoreError;
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// 설정 파일 이름
pub const CONFIG_FILE_NAME: &str = "config.json";

/// 설정 관리자
#[derive(Debug, Clone)]
pub struct ConfigManager {
    current: Arc<RwLock<AppConfig>>,
    path: PathBuf,
}

impl ConfigManager {
    /// 설정 파일을 열거나, 없으면 기본값으로 생성
    pub fn load_or_init(path: PathBuf) -> Result<Self, CoreError> {
        let config = if path.is_file() {
            read_config(&path)?
        } else {
            ensure_parent_dir(&path)?;
            let defaults = AppConfig::default_config();
            write_config(&path, &defaults)?;
            info!("기본 설정 파일 생성: {}", path.display());
            defaults
        };

        Ok(Self {
            current: Arc::new(RwLock::new(config)),
            path,
        })
    }

    /// 현재 설정 (복제본)
    pub fn current(&self) -> AppConfig {
        self.current.read().clone()
    }

    /// 설정 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 새 설정으로 교체. 검증에 실패하면 파일과 메모리 모두 그대로.
    pub fn replace(&self, config: AppConfig) -> Result<(), CoreError> {
        config.validate()?;
        write_config(&self.path, &config)?;
        *self.current.write() = config;
        debug!("설정 저장: {}", self.path.display());
        Ok(())
    }

    /// 현재 설정 일부 수정 후 저장
    pub fn modify(&self, edit: impl FnOnce(&mut AppConfig)) -> Result<AppConfig, CoreError> {
        let mut config = self.current();
        edit(&mut config);
        self.replace(config.clone())?;
        Ok(config)
    }

    /// 파일에서 다시 읽기
    pub fn reload(&self) -> Result<AppConfig, CoreError> {
        let config = read_config(&self.path)?;
        *self.current.write() = config.clone();
        info!("설정 다시 로드: {}", self.path.display());
        Ok(config)
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), CoreError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            fs::create_dir_all(dir).map_err(|e| {
                CoreError::Config(format!("설정 디렉토리 생성 실패 ({}): {e}", dir.display()))
            })?;
            debug!("설정 디렉토리 생성: {}", dir.display());
            Ok(())
        }
        _ => Ok(()),
    }
}

fn read_config(path: &Path) -> Result<AppConfig, CoreError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| CoreError::Config(format!("{} 읽기 실패: {e}", path.display())))?;
    let config: AppConfig = serde_json::from_str(&raw)
        .map_err(|e| CoreError::Config(format!("{} 파싱 실패: {e}", path.display())))?;
    config
        .validate()
        .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;
    Ok(config)
}

fn write_config(path: &Path, config: &AppConfig) -> Result<(), CoreError> {
    let body = serde_json::to_vec_pretty(config)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, body)
        .and_then(|()| fs::rename(&tmp, path))
        .map_err(|e| CoreError::Config(format!("{} 저장 실패: {e}", path.display())))
}
