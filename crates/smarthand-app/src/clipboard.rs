//! 시스템 클립보드 어댑터 (arboard).

use parking_lot::Mutex;
use smarthand_core::error::CoreError;
use smarthand_core::ports::clipboard::ClipboardWriter;
use tracing::debug;

/// arboard 기반 `ClipboardWriter`
///
/// X11에서는 인스턴스가 살아 있어야 복사한 내용이 유지되므로 세션 동안 보관한다.
pub struct SystemClipboard {
    inner: Mutex<arboard::Clipboard>,
}

impl SystemClipboard {
    /// 클립보드 연결. 헤드리스 환경에서는 실패한다.
    pub fn new() -> Result<Self, CoreError> {
        let clipboard =
            arboard::Clipboard::new().map_err(|e| CoreError::Clipboard(e.to_string()))?;
        debug!("시스템 클립보드 연결");
        Ok(Self {
            inner: Mutex::new(clipboard),
        })
    }
}

impl ClipboardWriter for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), CoreError> {
        self.inner
            .lock()
            .set_text(text.to_string())
            .map_err(|e| CoreError::Clipboard(e.to_string()))
    }
}
